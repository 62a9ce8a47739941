use crate::transforms::Transform;
use anyhow::{bail, ensure, Context, Result};
use image::{DynamicImage, GenericImageView};
use tch::{Kind, Tensor};

// ============================================================================
// ToTensor
// ============================================================================

/// Converts an image to a channel-first `[3, H, W]` f32 tensor in `[0, 1]`.
///
/// Non-RGB inputs (grayscale, RGBA, CMYK, ...) are converted to RGB first,
/// since every operation in this crate assumes a 3-channel batch.
///
/// # Example
/// ```ignore
/// let tensor = ToTensor.apply(image)?;
/// let batch = stack_images(&[tensor])?; // [1, 3, H, W]
/// ```
#[derive(Debug)]
pub struct ToTensor;

impl Transform<DynamicImage, Tensor> for ToTensor {
    fn apply(&self, img: DynamicImage) -> Result<Tensor> {
        let (width, height) = img.dimensions();
        ensure!(
            width > 0 && height > 0,
            "Image dimensions must be positive (got {}x{})",
            width,
            height
        );

        let rgb = match img {
            DynamicImage::ImageRgb8(rgb) => rgb,
            other => other.to_rgb8(),
        };
        let tensor = Tensor::from_slice(rgb.as_raw())
            .reshape(&[height as i64, width as i64, 3])
            .permute(&[2, 0, 1]);

        // Normalize to [0,1] range
        tensor
            .to_kind(Kind::Float)
            .f_div_scalar(255.0)
            .context("Failed to normalize tensor values")
    }
}

// ============================================================================
// stack_images
// ============================================================================

/// Stacks `[3, H, W]` image tensors into a `[N, 3, H, W]` batch.
///
/// All tensors must share the exact same shape; an inconsistent shape is an
/// error, never an implicit pad or resize.
pub fn stack_images(images: &[Tensor]) -> Result<Tensor> {
    if images.is_empty() {
        bail!("Cannot stack an empty image list");
    }

    let reference_shape = images[0].size();
    for (i, img) in images.iter().enumerate() {
        if img.size() != reference_shape {
            bail!(
                "Shape mismatch in image {}: expected {:?}, got {:?}",
                i,
                reference_shape,
                img.size()
            );
        }
    }

    Ok(Tensor::stack(images, 0))
}
