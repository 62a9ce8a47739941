//! End-to-end tests for composing augmentations into a trainable policy.
//!
//! Tests cover:
//! - Decoding images into a stacked batch and pushing it through wrappers
//! - Gradient flow from a scalar loss back to the strength parameters
//! - Colorspace round-trip stability under a full photometric chain
//! - Contract violations surfacing as errors at the pipeline boundary

use anyhow::Result;
use diffaug::transforms::vision::{
    hsv_to_rgb, rgb_to_hsv, rotation, stack_images, Blur, Brightness, Contrast, HorizontalFlip,
    Invert, Rotation, Saturation, ToTensor,
};
use diffaug::Transform;
use image::{DynamicImage, Rgb, RgbImage};
use tch::{Device, Kind, Tensor};

fn gradient_image(width: u32, height: u32) -> DynamicImage {
    let mut img = RgbImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / width) as u8;
            let g = (y * 255 / height) as u8;
            img.put_pixel(x, y, Rgb([r, g, 128]));
        }
    }
    DynamicImage::ImageRgb8(img)
}

fn max_abs_diff(a: &Tensor, b: &Tensor) -> f64 {
    (a - b).abs().max().double_value(&[])
}

// ================================================================================================
// 1. Image ingestion into a batch
// ================================================================================================
#[test]
fn test_decoded_images_drive_the_policy() -> Result<()> {
    let a = ToTensor.apply(gradient_image(8, 8))?;
    let b = ToTensor.apply(gradient_image(8, 8))?;
    let batch = stack_images(&[a, b])?;
    assert_eq!(batch.size(), vec![2, 3, 8, 8]);

    let angles = Tensor::from_slice(&[0.2f32, -0.1]).reshape(&[2, 1]);
    let rotated = Rotation::default().apply((batch.shallow_clone(), angles))?;
    assert_eq!(rotated.size(), batch.size());
    Ok(())
}

// ================================================================================================
// 2. Gradients reach the learnable strengths
// ================================================================================================
#[test]
fn test_loss_gradient_reaches_strength_parameters() -> Result<()> {
    let batch = stack_images(&[
        ToTensor.apply(gradient_image(10, 10))?,
        ToTensor.apply(gradient_image(10, 10))?,
    ])?;

    let angle = Tensor::from_slice(&[0.3f32, -0.4])
        .reshape(&[2, 1])
        .set_requires_grad(true);
    let strength = Tensor::from_slice(&[0.1f32, 0.2])
        .reshape(&[2, 1])
        .set_requires_grad(true);

    // rotate, then shift brightness, then take a scalar "loss"
    let rotated = Rotation::new(0.8).apply((batch, angle.shallow_clone()))?;
    let adjusted = Brightness::default().apply((rotated, strength.shallow_clone()))?;
    adjusted.sum(Kind::Float).backward();

    for p in [&angle, &strength] {
        let grad = p.grad();
        assert!(grad.defined());
        let norm = grad.abs().sum(Kind::Float).double_value(&[]);
        assert!(norm.is_finite() && norm > 0.0);
    }
    Ok(())
}

// ================================================================================================
// 3. Photometric chains keep the batch well-formed
// ================================================================================================
#[test]
fn test_photometric_chain_stays_in_range() -> Result<()> {
    let batch = Tensor::rand(&[3, 3, 6, 6], (Kind::Float, Device::Cpu));
    let p = Tensor::from_slice(&[0.4f32, -0.2, 0.9]).reshape(&[3, 1]);

    let pipeline = Contrast::default().then(Blur).then(Invert);
    let out = pipeline.apply((batch, p))?;

    assert!(out.min().double_value(&[]) >= -1e-6);
    assert!(out.max().double_value(&[]) <= 1.0 + 1e-6);
    Ok(())
}

#[test]
fn test_colorspace_round_trip_after_saturation() -> Result<()> {
    let batch = Tensor::rand(&[2, 3, 5, 5], (Kind::Float, Device::Cpu));
    let p = Tensor::from_slice(&[0.3f32, -0.3]).reshape(&[2, 1]);

    let saturated = Saturation::default().apply((batch, p))?;
    let round_trip = hsv_to_rgb(&rgb_to_hsv(&saturated)?)?;
    assert!(max_abs_diff(&saturated, &round_trip) < 1e-5);
    Ok(())
}

// ================================================================================================
// 4. Flips compose with the rest of the policy
// ================================================================================================
#[test]
fn test_flip_then_flip_cancels_inside_a_chain() -> Result<()> {
    let batch = Tensor::rand(&[2, 3, 7, 9], (Kind::Float, Device::Cpu));
    let pipeline = HorizontalFlip.then(HorizontalFlip);
    let out = pipeline.apply(batch.shallow_clone())?;
    assert!(max_abs_diff(&out, &batch) < 1e-5);
    Ok(())
}

// ================================================================================================
// 5. Contract violations fail loudly
// ================================================================================================
#[test]
fn test_mismatched_parameter_count_fails_the_pipeline() -> Result<()> {
    let batch = Tensor::rand(&[2, 3, 6, 6], (Kind::Float, Device::Cpu));
    let wrong = Tensor::zeros(&[4, 1], (Kind::Float, Device::Cpu));

    let err = Rotation::default()
        .apply((batch.shallow_clone(), wrong))
        .unwrap_err();
    assert!(err.to_string().contains("one value per image sample"));

    let rank3 = Tensor::rand(&[3, 6, 6], (Kind::Float, Device::Cpu));
    assert!(rotation(&rank3, &Tensor::zeros(&[3, 1], (Kind::Float, Device::Cpu))).is_err());
    Ok(())
}
