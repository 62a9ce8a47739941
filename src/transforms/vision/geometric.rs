use super::{check_image_batch, check_param_batch};
use anyhow::Result;
use tch::Tensor;

// ============================================================================
// Affine sampling
// ============================================================================

/// Resamples `imgs` through a per-sample `[N, 2, 3]` output-to-input affine
/// matrix: bilinear interpolation, zero padding, coordinates normalized to
/// `[-1, 1]`. Differentiable w.r.t. both the images and the matrix, so
/// gradients reach whatever parameters the matrix was built from.
fn affine_sample(imgs: &Tensor, theta: &Tensor) -> Tensor {
    let size = imgs.size();
    let grid = Tensor::affine_grid_generator(theta, &size[..], false);
    imgs.grid_sampler(&grid, 0, 0, false)
}

/// Stacks two `[N, 3]` rows into the `[N, 2, 3]` matrix `affine_sample`
/// expects. The rows must be built from parameter arithmetic (sin, cos,
/// products) so the matrix stays differentiable w.r.t. the parameter.
fn affine_matrix(batch: i64, row_x: Tensor, row_y: Tensor) -> Tensor {
    Tensor::cat(
        &[
            row_x.reshape(&[batch, 1, 3]),
            row_y.reshape(&[batch, 1, 3]),
        ],
        1,
    )
}

// ============================================================================
// Parametric geometric operations
// ============================================================================

/// Rotates each sample by its angle (radians, counter-clockwise for
/// positive values in image coordinates).
///
/// The off-diagonal sin terms carry an `h/w` aspect correction so the
/// rotation is visually circular on non-square images. The matrix entries
/// are pure arithmetic in `angle` (`sin`, `cos`, products), which is what
/// keeps the operation differentiable w.r.t. the angle batch.
pub fn rotation(imgs: &Tensor, angle: &Tensor) -> Result<Tensor> {
    let (batch, _, height, width) = check_image_batch(imgs)?;
    let angle = check_param_batch(angle, batch)?;
    let aspect = height as f64 / width as f64;

    let sin = angle.sin();
    let cos = angle.cos();
    let zero = angle.zeros_like();

    let row_x = Tensor::cat(&[cos.shallow_clone(), &sin * -aspect, zero.shallow_clone()], 1);
    let row_y = Tensor::cat(&[&sin * aspect, cos, zero], 1);
    Ok(affine_sample(imgs, &affine_matrix(batch, row_x, row_y)))
}

/// Shears each sample horizontally by its shear factor.
pub fn shear_x(imgs: &Tensor, factor: &Tensor) -> Result<Tensor> {
    let (batch, _, height, width) = check_image_batch(imgs)?;
    let factor = check_param_batch(factor, batch)?;
    let aspect = height as f64 / width as f64;

    let one = factor.ones_like();
    let zero = factor.zeros_like();

    let row_x = Tensor::cat(&[one.shallow_clone(), &factor * aspect, zero.shallow_clone()], 1);
    let row_y = Tensor::cat(&[zero.shallow_clone(), one, zero], 1);
    Ok(affine_sample(imgs, &affine_matrix(batch, row_x, row_y)))
}

/// Shears each sample vertically by its shear factor.
pub fn shear_y(imgs: &Tensor, factor: &Tensor) -> Result<Tensor> {
    let (batch, _, height, width) = check_image_batch(imgs)?;
    let factor = check_param_batch(factor, batch)?;
    let aspect = height as f64 / width as f64;

    let one = factor.ones_like();
    let zero = factor.zeros_like();

    let row_x = Tensor::cat(&[one.shallow_clone(), zero.shallow_clone(), zero.shallow_clone()], 1);
    let row_y = Tensor::cat(&[&factor * aspect, one, zero], 1);
    Ok(affine_sample(imgs, &affine_matrix(batch, row_x, row_y)))
}

/// Translates each sample horizontally. The offset is in normalized grid
/// units: 1.0 shifts by half the image width.
pub fn translate_x(imgs: &Tensor, offset: &Tensor) -> Result<Tensor> {
    let (batch, _, _, _) = check_image_batch(imgs)?;
    let offset = check_param_batch(offset, batch)?;

    let one = offset.ones_like();
    let zero = offset.zeros_like();

    let row_x = Tensor::cat(&[one.shallow_clone(), zero.shallow_clone(), offset], 1);
    let row_y = Tensor::cat(&[zero.shallow_clone(), one, zero], 1);
    Ok(affine_sample(imgs, &affine_matrix(batch, row_x, row_y)))
}

/// Translates each sample vertically, in the same normalized units as
/// [`translate_x`].
pub fn translate_y(imgs: &Tensor, offset: &Tensor) -> Result<Tensor> {
    let (batch, _, _, _) = check_image_batch(imgs)?;
    let offset = check_param_batch(offset, batch)?;

    let one = offset.ones_like();
    let zero = offset.zeros_like();

    let row_x = Tensor::cat(&[one.shallow_clone(), zero.shallow_clone(), zero.shallow_clone()], 1);
    let row_y = Tensor::cat(&[zero, one, offset], 1);
    Ok(affine_sample(imgs, &affine_matrix(batch, row_x, row_y)))
}

// ============================================================================
// Fixed-matrix flips
// ============================================================================

/// Mirrors each sample left-right. No parameter; the reflection matrix is
/// fixed, so the operation is differentiable w.r.t. the images only.
pub fn horizontal_flip(imgs: &Tensor) -> Result<Tensor> {
    let (batch, _, _, _) = check_image_batch(imgs)?;
    let theta = fixed_matrix(&[-1.0, 0.0, 0.0, 0.0, 1.0, 0.0], batch, imgs);
    Ok(affine_sample(imgs, &theta))
}

/// Mirrors each sample top-bottom.
pub fn vertical_flip(imgs: &Tensor) -> Result<Tensor> {
    let (batch, _, _, _) = check_image_batch(imgs)?;
    let theta = fixed_matrix(&[1.0, 0.0, 0.0, 0.0, -1.0, 0.0], batch, imgs);
    Ok(affine_sample(imgs, &theta))
}

fn fixed_matrix(entries: &[f32; 6], batch: i64, imgs: &Tensor) -> Tensor {
    Tensor::from_slice(entries)
        .to_kind(imgs.kind())
        .to_device(imgs.device())
        .reshape(&[1, 2, 3])
        .repeat(&[batch, 1, 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{Device, Kind};

    fn max_abs_diff(a: &Tensor, b: &Tensor) -> f64 {
        (a - b).abs().max().double_value(&[])
    }

    fn random_batch(n: i64, h: i64, w: i64) -> Tensor {
        Tensor::rand(&[n, 3, h, w], (Kind::Float, Device::Cpu))
    }

    #[test]
    fn test_zero_parameter_is_identity() -> Result<()> {
        let imgs = random_batch(2, 8, 8);
        let zeros = Tensor::zeros(&[2, 1], (Kind::Float, Device::Cpu));

        for out in [
            rotation(&imgs, &zeros)?,
            shear_x(&imgs, &zeros)?,
            shear_y(&imgs, &zeros)?,
            translate_x(&imgs, &zeros)?,
            translate_y(&imgs, &zeros)?,
        ] {
            assert!(max_abs_diff(&imgs, &out) < 1e-4);
        }
        Ok(())
    }

    #[test]
    fn test_double_flip_is_identity() -> Result<()> {
        let imgs = random_batch(2, 6, 10);
        let twice_h = horizontal_flip(&horizontal_flip(&imgs)?)?;
        assert!(max_abs_diff(&imgs, &twice_h) < 1e-5);
        let twice_v = vertical_flip(&vertical_flip(&imgs)?)?;
        assert!(max_abs_diff(&imgs, &twice_v) < 1e-5);
        Ok(())
    }

    #[test]
    fn test_horizontal_flip_mirrors_columns() -> Result<()> {
        // 1x1x1x2 image: [0.25, 0.75] -> [0.75, 0.25]
        let imgs = Tensor::from_slice(&[0.25f32, 0.75]).reshape(&[1, 1, 1, 2]);
        let flipped = horizontal_flip(&imgs)?;
        let expected = Tensor::from_slice(&[0.75f32, 0.25]).reshape(&[1, 1, 1, 2]);
        assert!(max_abs_diff(&flipped, &expected) < 1e-6);
        Ok(())
    }

    #[test]
    fn test_rotation_gradient_reaches_angle() -> Result<()> {
        let imgs = random_batch(2, 8, 8);
        let angle = Tensor::from_slice(&[0.4f32, -0.3])
            .reshape(&[2, 1])
            .set_requires_grad(true);

        let out = rotation(&imgs, &angle)?;
        out.sum(Kind::Float).backward();

        let grad = angle.grad();
        assert!(grad.defined());
        let grad_norm = grad.abs().sum(Kind::Float).double_value(&[]);
        assert!(grad_norm.is_finite() && grad_norm > 0.0);
        Ok(())
    }

    #[test]
    fn test_shear_and_translate_gradients() -> Result<()> {
        let imgs = random_batch(2, 8, 8);
        type Op = fn(&Tensor, &Tensor) -> Result<Tensor>;
        let ops: [Op; 4] = [shear_x, shear_y, translate_x, translate_y];

        for op in ops {
            let p = Tensor::from_slice(&[0.2f32, -0.1])
                .reshape(&[2, 1])
                .set_requires_grad(true);
            op(&imgs, &p)?.sum(Kind::Float).backward();
            let grad_norm = p.grad().abs().sum(Kind::Float).double_value(&[]);
            assert!(grad_norm.is_finite() && grad_norm > 0.0);
        }
        Ok(())
    }

    #[test]
    fn test_parameter_count_mismatch_is_rejected() {
        let imgs = random_batch(2, 4, 4);
        let too_many = Tensor::zeros(&[3, 1], (Kind::Float, Device::Cpu));
        assert!(rotation(&imgs, &too_many).is_err());
        assert!(translate_x(&imgs, &too_many).is_err());
    }

    #[test]
    fn test_rank_mismatch_is_rejected() {
        let rank3 = Tensor::rand(&[3, 4, 4], (Kind::Float, Device::Cpu));
        let p = Tensor::zeros(&[3, 1], (Kind::Float, Device::Cpu));
        assert!(rotation(&rank3, &p).is_err());
        assert!(horizontal_flip(&rank3).is_err());
    }
}
