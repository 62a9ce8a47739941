//! Differentiable image augmentation for learnable policies.
//!
//! Every operation in this crate is a pure function of an image batch
//! (`[N, C, H, W]`, values in `[0, 1]`) and a per-sample parameter batch,
//! expressed entirely in tensor arithmetic that libtorch's autograd can see.
//! Gradients therefore flow from a downstream loss back into the
//! augmentation *strength* parameters, which is what makes these usable
//! inside a policy that tunes its own augmentation magnitudes.
//!
//! The [`transforms::vision`] module holds the operation library; the
//! wrapper structs in [`transforms::vision::augmentation`] scale an incoming
//! parameter by a fixed coefficient before dispatch and implement
//! [`Transform`], so they compose into pipelines with `.then(...)`.

pub mod transforms;

pub use transforms::Transform;
