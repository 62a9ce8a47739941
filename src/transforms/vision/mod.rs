//! src/transforms/vision/mod.rs
//!
//! Differentiable vision augmentations with learnable strengths.
//!
//! # Module Organization
//!
//! The vision transforms are organized into focused modules based on their primary function:
//!
//! ```text
//! transforms/vision/
//! ├── geometric.rs     → Affine ops (rotation, shear, translate, flips)
//! ├── photometric.rs   → Pixel ops (brightness, contrast, sharpness, noise, ...)
//! ├── colorspace.rs    → Branch-free RGB ↔ HSV conversion
//! ├── augmentation.rs  → Parametric wrapper layer (scale-then-delegate)
//! └── conversion.rs    → Image → tensor conversion and batch stacking
//! ```
//!
//! Operation functions are pure: they take an image batch `[N, C, H, W]`
//! and a per-sample parameter batch and return a fresh tensor, so the same
//! function can be called repeatedly without cross-call interference and
//! without leaking gradient graphs between calls.
//!
//! # Quick Start
//!
//! ```ignore
//! use diffaug::transforms::Transform;
//! use diffaug::transforms::vision::{Brightness, Rotation};
//!
//! let rotate = Rotation::default();
//! let rotated = rotate.apply((images, angles))?;
//! ```

pub mod augmentation;
pub mod colorspace;
pub mod conversion;
pub mod geometric;
pub mod photometric;

pub use augmentation::{
    Blur, Brightness, Contrast, GaussianNoise, HorizontalFlip, Invert, Rotation, Saturation,
    Sharpness, ShearX, ShearY, Solarize, TranslateX, TranslateY, VerticalFlip,
};
pub use colorspace::{hsv_to_rgb, rgb_to_hsv};
pub use conversion::{stack_images, ToTensor};
pub use geometric::{
    horizontal_flip, rotation, shear_x, shear_y, translate_x, translate_y, vertical_flip,
};
pub use photometric::{
    blur, brightness, contrast, gaussian_noise, invert, saturation, sharpness, solarize,
};

use anyhow::{ensure, Context, Result};
use tch::Tensor;

/// Validates the `[N, C, H, W]` image-batch contract and returns the sizes.
pub(crate) fn check_image_batch(imgs: &Tensor) -> Result<(i64, i64, i64, i64)> {
    let (batch, channels, height, width) = imgs
        .size4()
        .context("Image batch must be a 4D [N, C, H, W] tensor")?;
    ensure!(
        height > 0 && width > 0,
        "Image batch must have non-empty spatial dims (got {}x{})",
        height,
        width
    );
    Ok((batch, channels, height, width))
}

/// Validates one parameter entry per batch sample and returns the parameter
/// batch reshaped to `[N, 1]`. A mismatched count is a contract violation,
/// never a silent broadcast.
pub(crate) fn check_param_batch(params: &Tensor, batch: i64) -> Result<Tensor> {
    let sizes = params.size();
    let count: i64 = sizes.iter().product();
    ensure!(
        !sizes.is_empty() && sizes[0] == batch && count == batch,
        "Parameter batch must hold one value per image sample: expected {} entries, got shape {:?}",
        batch,
        sizes
    );
    Ok(params.reshape(&[batch, 1]))
}
