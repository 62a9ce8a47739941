use super::check_image_batch;
use anyhow::{ensure, Result};
use tch::Tensor;

/// Guards divisions where the chroma range or the max channel can be zero.
const EPS: f64 = 1e-8;

// ============================================================================
// rgb_to_hsv
// ============================================================================

/// Converts an RGB batch `[N, 3, H, W]` (values in `[0, 1]`) to HSV.
///
/// Hue lands in `[0, 1)` (wrapped), saturation and value in `[0, 1]`.
/// The piecewise hue formula is evaluated over the whole batch once per
/// argmax channel and combined through boolean masks, so no branch ever
/// cuts the gradient path: the non-selected formulas contribute zero
/// instead of being skipped.
///
/// At exact channel ties the argmax reduction reports the first maximal
/// channel, and the gradient of that selection is not defined at the tie;
/// this is a known non-smooth point, not something the conversion papers
/// over.
pub fn rgb_to_hsv(imgs: &Tensor) -> Result<Tensor> {
    let (_, channels, _, _) = check_image_batch(imgs)?;
    ensure!(
        channels == 3,
        "RGB to HSV conversion requires 3 channels (got {})",
        channels
    );

    let r = imgs.select(1, 0);
    let g = imgs.select(1, 1);
    let b = imgs.select(1, 2);

    let (max_rgb, argmax) = imgs.max_dim(1, false);
    let (min_rgb, _) = imgs.min_dim(1, false);
    let delta = &max_rgb - &min_rgb;
    let denom = &delta + EPS;

    // One hue formula per argmax channel, each over the full batch. The
    // red sextant can go negative, so it alone needs the modulo wrap.
    let hue_r = ((&g - &b) / &denom / 6.0).remainder(1.0);
    let hue_g = (((&b - &r) / &denom) + 2.0) / 6.0;
    let hue_b = (((&r - &g) / &denom) + 4.0) / 6.0;

    let r_mask = argmax.eq(0i64).to_kind(imgs.kind());
    let g_mask = argmax.eq(1i64).to_kind(imgs.kind());
    let b_mask = argmax.eq(2i64).to_kind(imgs.kind());
    // Achromatic pixels (delta == 0) have no defined hue; force 0.
    let chromatic = delta.ne(0.0).to_kind(imgs.kind());

    let hue = (hue_r * r_mask + hue_g * g_mask + hue_b * b_mask) * chromatic;
    let sat = (&delta / (&max_rgb + EPS)) * max_rgb.ne(0.0).to_kind(imgs.kind());
    let value = max_rgb;

    Ok(Tensor::stack(&[hue, sat, value], 1))
}

// ============================================================================
// hsv_to_rgb
// ============================================================================

/// Converts an HSV batch `[N, 3, H, W]` back to RGB.
///
/// Standard chroma / x / match-value decomposition: the hue circle is split
/// into six sextants, each assigning a permutation of `{chroma, x, 0}` to
/// the RGB channels, plus `m = value - chroma` on every channel. Sextant
/// bounds are half-open except the last, which is closed on both ends so a
/// caller-supplied hue of exactly 1.0 still lands somewhere.
pub fn hsv_to_rgb(imgs: &Tensor) -> Result<Tensor> {
    let (_, channels, _, _) = check_image_batch(imgs)?;
    ensure!(
        channels == 3,
        "HSV to RGB conversion requires 3 channels (got {})",
        channels
    );

    let h = imgs.select(1, 0);
    let s = imgs.select(1, 1);
    let v = imgs.select(1, 2);

    let chroma = &v * &s;
    let x = &chroma * (((&h * 6.0).fmod(2.0) - 1.0).abs() * -1.0 + 1.0);
    let m = &v - &chroma;

    let kind = imgs.kind();
    let m0 = h.lt(1.0 / 6.0).to_kind(kind);
    let m1 = h.ge(1.0 / 6.0).logical_and(&h.lt(2.0 / 6.0)).to_kind(kind);
    let m2 = h.ge(2.0 / 6.0).logical_and(&h.lt(3.0 / 6.0)).to_kind(kind);
    let m3 = h.ge(3.0 / 6.0).logical_and(&h.lt(4.0 / 6.0)).to_kind(kind);
    let m4 = h.ge(4.0 / 6.0).logical_and(&h.lt(5.0 / 6.0)).to_kind(kind);
    let m5 = h.ge(5.0 / 6.0).logical_and(&h.le(1.0)).to_kind(kind);

    let r = &chroma * &m0 + &x * &m1 + &x * &m4 + &chroma * &m5 + &m;
    let g = &x * &m0 + &chroma * &m1 + &chroma * &m2 + &x * &m3 + &m;
    let b = &x * &m2 + &chroma * &m3 + &chroma * &m4 + &x * &m5 + &m;

    Ok(Tensor::stack(&[r, g, b], 1))
}
