//! Camera models
//!
//! A [`Camera`] carries the validated intrinsics, pose and resolution of one
//! physical or virtual camera. [`PinholeCamera`] and [`EquirectangularCamera`]
//! are the two projections a stitching canvas can use; both implement
//! [`Projection`].

mod equirectangular;
mod pinhole;
pub mod projection;
pub mod types;

pub use equirectangular::{EquirectangularCamera, wrap_degrees};
pub use pinhole::PinholeCamera;
pub use projection::{FieldOfView, FocalConvention, Projection, apply_homography};
pub use types::{Camera, CameraParams};

/// Largest even integer not above `value` (0 for negative input).
pub(crate) fn even_floor(value: f64) -> usize {
    let v = value.max(0.0).floor() as usize;
    v - v % 2
}
