//! Parametric wrapper layer.
//!
//! One wrapper struct per operation, each holding a single immutable scale
//! coefficient `alpha`. On invocation the wrapper multiplies the incoming
//! parameter batch by `alpha` and delegates to the corresponding pure
//! function, so a policy can learn or anneal `alpha` independently of the
//! raw control-signal scale coming out of a policy network. The wrappers
//! keep no other state between calls.
//!
//! Parametric wrappers implement `Transform<(Tensor, Tensor), Tensor>`;
//! the parameter-free ones ([`HorizontalFlip`], [`VerticalFlip`],
//! [`Invert`], [`Blur`]) implement `Transform<Tensor, Tensor>` and chain
//! directly onto them with `.then(...)`.

use super::{geometric, photometric};
use crate::transforms::Transform;
use anyhow::Result;
use tch::Tensor;

// ============================================================================
// Geometric wrappers
// ============================================================================

/// Rotation by `alpha * angle` radians.
///
/// # Example
/// ```ignore
/// let rotate = Rotation::default();
/// let rotated = rotate.apply((images, angles))?;
/// ```
#[derive(Debug, Clone)]
pub struct Rotation {
    alpha: f64,
}

impl Rotation {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Transform<(Tensor, Tensor), Tensor> for Rotation {
    fn apply(&self, (imgs, angle): (Tensor, Tensor)) -> Result<Tensor> {
        geometric::rotation(&imgs, &(angle * self.alpha))
    }
}

/// Horizontal shear by `alpha * factor`.
#[derive(Debug, Clone)]
pub struct ShearX {
    alpha: f64,
}

impl ShearX {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }
}

impl Default for ShearX {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Transform<(Tensor, Tensor), Tensor> for ShearX {
    fn apply(&self, (imgs, factor): (Tensor, Tensor)) -> Result<Tensor> {
        geometric::shear_x(&imgs, &(factor * self.alpha))
    }
}

/// Vertical shear by `alpha * factor`.
#[derive(Debug, Clone)]
pub struct ShearY {
    alpha: f64,
}

impl ShearY {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }
}

impl Default for ShearY {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Transform<(Tensor, Tensor), Tensor> for ShearY {
    fn apply(&self, (imgs, factor): (Tensor, Tensor)) -> Result<Tensor> {
        geometric::shear_y(&imgs, &(factor * self.alpha))
    }
}

/// Horizontal translation by `alpha * offset` normalized grid units.
#[derive(Debug, Clone)]
pub struct TranslateX {
    alpha: f64,
}

impl TranslateX {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }
}

impl Default for TranslateX {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Transform<(Tensor, Tensor), Tensor> for TranslateX {
    fn apply(&self, (imgs, offset): (Tensor, Tensor)) -> Result<Tensor> {
        geometric::translate_x(&imgs, &(offset * self.alpha))
    }
}

/// Vertical translation by `alpha * offset` normalized grid units.
#[derive(Debug, Clone)]
pub struct TranslateY {
    alpha: f64,
}

impl TranslateY {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }
}

impl Default for TranslateY {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Transform<(Tensor, Tensor), Tensor> for TranslateY {
    fn apply(&self, (imgs, offset): (Tensor, Tensor)) -> Result<Tensor> {
        geometric::translate_y(&imgs, &(offset * self.alpha))
    }
}

/// Fixed left-right mirror; takes no parameter.
#[derive(Debug, Clone, Default)]
pub struct HorizontalFlip;

impl Transform<Tensor, Tensor> for HorizontalFlip {
    fn apply(&self, imgs: Tensor) -> Result<Tensor> {
        geometric::horizontal_flip(&imgs)
    }
}

/// Fixed top-bottom mirror; takes no parameter.
#[derive(Debug, Clone, Default)]
pub struct VerticalFlip;

impl Transform<Tensor, Tensor> for VerticalFlip {
    fn apply(&self, imgs: Tensor) -> Result<Tensor> {
        geometric::vertical_flip(&imgs)
    }
}

// ============================================================================
// Photometric wrappers
// ============================================================================

/// Brightness shift by `alpha * offset`. Defaults to `alpha = 0.5`, halving
/// the raw control signal before it becomes a pixel offset.
#[derive(Debug, Clone)]
pub struct Brightness {
    alpha: f64,
}

impl Brightness {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Transform<(Tensor, Tensor), Tensor> for Brightness {
    fn apply(&self, (imgs, offset): (Tensor, Tensor)) -> Result<Tensor> {
        photometric::brightness(&imgs, &(offset * self.alpha))
    }
}

/// Contrast scale by `1 + alpha * factor`.
#[derive(Debug, Clone)]
pub struct Contrast {
    alpha: f64,
}

impl Contrast {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }
}

impl Default for Contrast {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Transform<(Tensor, Tensor), Tensor> for Contrast {
    fn apply(&self, (imgs, factor): (Tensor, Tensor)) -> Result<Tensor> {
        photometric::contrast(&imgs, &(factor * self.alpha))
    }
}

/// Saturation scale by `1 + alpha * factor`.
#[derive(Debug, Clone)]
pub struct Saturation {
    alpha: f64,
}

impl Saturation {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }
}

impl Default for Saturation {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Transform<(Tensor, Tensor), Tensor> for Saturation {
    fn apply(&self, (imgs, factor): (Tensor, Tensor)) -> Result<Tensor> {
        photometric::saturation(&imgs, &(factor * self.alpha))
    }
}

/// Unsharp-mask sharpening by `alpha * amount`. Defaults to `alpha = 0.5`.
#[derive(Debug, Clone)]
pub struct Sharpness {
    alpha: f64,
}

impl Sharpness {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }
}

impl Default for Sharpness {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Transform<(Tensor, Tensor), Tensor> for Sharpness {
    fn apply(&self, (imgs, amount): (Tensor, Tensor)) -> Result<Tensor> {
        photometric::sharpness(&imgs, &(amount * self.alpha))
    }
}

/// Additive Gaussian noise with standard deviation `alpha * std`.
#[derive(Debug, Clone)]
pub struct GaussianNoise {
    alpha: f64,
}

impl GaussianNoise {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }
}

impl Default for GaussianNoise {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Transform<(Tensor, Tensor), Tensor> for GaussianNoise {
    fn apply(&self, (imgs, std): (Tensor, Tensor)) -> Result<Tensor> {
        photometric::gaussian_noise(&imgs, &(std * self.alpha))
    }
}

/// Solarization above the threshold `alpha * threshold`. The threshold only
/// builds the selection mask, so no gradient reaches it.
#[derive(Debug, Clone)]
pub struct Solarize {
    alpha: f64,
}

impl Solarize {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }
}

impl Default for Solarize {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Transform<(Tensor, Tensor), Tensor> for Solarize {
    fn apply(&self, (imgs, threshold): (Tensor, Tensor)) -> Result<Tensor> {
        photometric::solarize(&imgs, &(threshold * self.alpha))
    }
}

/// Pixel inversion; takes no parameter.
#[derive(Debug, Clone, Default)]
pub struct Invert;

impl Transform<Tensor, Tensor> for Invert {
    fn apply(&self, imgs: Tensor) -> Result<Tensor> {
        photometric::invert(&imgs)
    }
}

/// Interior box blur; takes no parameter.
#[derive(Debug, Clone, Default)]
pub struct Blur;

impl Transform<Tensor, Tensor> for Blur {
    fn apply(&self, imgs: Tensor) -> Result<Tensor> {
        photometric::blur(&imgs)
    }
}
