use super::{check_image_batch, check_param_batch, hsv_to_rgb, rgb_to_hsv};
use anyhow::{ensure, Result};
use tch::Tensor;

// ============================================================================
// Brightness / contrast
// ============================================================================

/// Shifts each sample by its brightness offset and clamps to `[0, 1]`.
pub fn brightness(imgs: &Tensor, offset: &Tensor) -> Result<Tensor> {
    let (batch, _, _, _) = check_image_batch(imgs)?;
    let offset = check_param_batch(offset, batch)?.reshape(&[batch, 1, 1, 1]);
    Ok((imgs + offset).clamp(0.0, 1.0))
}

/// Scales each sample by `1 + factor` and clamps to `[0, 1]`.
pub fn contrast(imgs: &Tensor, factor: &Tensor) -> Result<Tensor> {
    let (batch, _, _, _) = check_image_batch(imgs)?;
    let factor = check_param_batch(factor, batch)?.reshape(&[batch, 1, 1, 1]);
    Ok((imgs * (factor + 1.0)).clamp(0.0, 1.0))
}

// ============================================================================
// Saturation
// ============================================================================

/// Scales the HSV saturation channel by `1 + factor`, mirroring the
/// broadcast semantics of [`contrast`], then converts back to RGB. The
/// scaled channel is clamped to `[0, 1]` so the intermediate image stays a
/// valid HSV batch for any parameter value.
pub fn saturation(imgs: &Tensor, factor: &Tensor) -> Result<Tensor> {
    let (batch, _, _, _) = check_image_batch(imgs)?;
    let factor = check_param_batch(factor, batch)?.reshape(&[batch, 1, 1]);

    let hsv = rgb_to_hsv(imgs)?;
    let hue = hsv.select(1, 0);
    let sat = (hsv.select(1, 1) * (factor + 1.0)).clamp(0.0, 1.0);
    let value = hsv.select(1, 2);

    hsv_to_rgb(&Tensor::stack(&[hue, sat, value], 1))
}

// ============================================================================
// Sharpness / blur
// ============================================================================

/// Depthwise valid-mode 3x3 box filter; output is 2 pixels smaller in each
/// spatial dim.
fn box_blur_valid(imgs: &Tensor, channels: i64) -> Tensor {
    let weight = Tensor::full(
        &[channels, 1, 3, 3],
        1.0 / 9.0,
        (imgs.kind(), imgs.device()),
    );
    imgs.conv2d(&weight, None::<Tensor>, &[1, 1], &[0, 0], &[1, 1], channels)
}

/// Sharpens each sample by its amount: `original + amount * unsharp_mask`,
/// where the unsharp mask is `original - box_blurred` over the interior
/// region the valid-mode blur covers. The 1-pixel border passes through
/// unmodified, so the mask is zero-padded back to full size before the add.
pub fn sharpness(imgs: &Tensor, amount: &Tensor) -> Result<Tensor> {
    let (batch, channels, height, width) = check_image_batch(imgs)?;
    ensure!(
        height > 2 && width > 2,
        "Sharpness needs spatial dims above 3x3 for the box blur (got {}x{})",
        height,
        width
    );
    let amount = check_param_batch(amount, batch)?.reshape(&[batch, 1, 1, 1]);

    let blurred = box_blur_valid(imgs, channels);
    let interior = imgs.narrow(2, 1, height - 2).narrow(3, 1, width - 2);
    let mask = interior - blurred;

    Ok(imgs + (mask * amount).constant_pad_nd(&[1, 1, 1, 1]))
}

/// Box-blurs the interior of each sample with the same valid-mode 3x3
/// filter as [`sharpness`], leaving the 1-pixel border identical to the
/// source. No parameter.
pub fn blur(imgs: &Tensor) -> Result<Tensor> {
    let (_, channels, height, width) = check_image_batch(imgs)?;
    ensure!(
        height > 2 && width > 2,
        "Blur needs spatial dims above 3x3 for the box filter (got {}x{})",
        height,
        width
    );

    let blurred = box_blur_valid(imgs, channels);
    let interior = imgs.narrow(2, 1, height - 2).narrow(3, 1, width - 2);

    Ok(imgs + (blurred - interior).constant_pad_nd(&[1, 1, 1, 1]))
}

// ============================================================================
// Gaussian noise
// ============================================================================

/// Adds zero-mean Gaussian noise whose per-sample standard deviation is the
/// parameter, clamped non-negative. Written as `imgs + std * eps` with
/// `eps ~ N(0, 1)` so the draw is reparameterized and the std receives a
/// gradient. The result is deliberately not clamped back into `[0, 1]`.
pub fn gaussian_noise(imgs: &Tensor, std: &Tensor) -> Result<Tensor> {
    let (batch, _, _, _) = check_image_batch(imgs)?;
    let std = check_param_batch(std, batch)?
        .reshape(&[batch, 1, 1, 1])
        .clamp_min(0.0);
    Ok(imgs + imgs.randn_like() * std)
}

// ============================================================================
// Solarize / invert
// ============================================================================

/// Inverts exactly the pixels exceeding the per-sample threshold. The
/// threshold enters only through the comparison that builds the selection
/// mask, so this operation is not differentiable w.r.t. the threshold. The
/// selection runs over fresh tensors; the caller's batch is never touched.
pub fn solarize(imgs: &Tensor, threshold: &Tensor) -> Result<Tensor> {
    let (batch, _, _, _) = check_image_batch(imgs)?;
    let threshold = check_param_batch(threshold, batch)?.reshape(&[batch, 1, 1, 1]);

    let mask = imgs.gt_tensor(&threshold);
    let inverted = invert(imgs)?;
    Ok(inverted.where_self(&mask, imgs))
}

/// `1 - imgs`. Applying it twice restores the input.
pub fn invert(imgs: &Tensor) -> Result<Tensor> {
    check_image_batch(imgs)?;
    Ok(imgs.neg() + 1.0)
}
