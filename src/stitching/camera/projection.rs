//! The capability shared by every canvas projection

use nalgebra::{Matrix3, Vector3};

use crate::stitching::camera::PinholeCamera;
use crate::stitching::image::RemapTable;

/// Smallest homogeneous coordinate used when dehomogenizing; points at or
/// behind a camera's image plane are pushed far outside its image.
pub(crate) const MIN_HOMOGENEOUS: f64 = 1e-8;

/// Sign convention for `K` when deriving homographies.
///
/// With [`FocalConvention::Negated`] the first two diagonal entries of `K`
/// are negated, which flips the parity between the projective and the pixel
/// frame; a positive yaw then turns a camera towards the left of the canvas.
/// Homography derivation and map inversion must use the same convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocalConvention {
    #[default]
    Negated,
    Positive,
}

impl FocalConvention {
    pub(crate) fn sign_matrix(self) -> Matrix3<f64> {
        match self {
            FocalConvention::Negated => Matrix3::from_diagonal(&Vector3::new(-1.0, -1.0, 1.0)),
            FocalConvention::Positive => Matrix3::identity(),
        }
    }
}

/// Horizontal and vertical field of view in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldOfView {
    pub horizontal: f64,
    pub vertical: f64,
}

/// A camera that can serve as a stitching canvas
pub trait Projection: Send + Sync {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    fn field_of_view(&self) -> FieldOfView;

    /// Source coordinates in `source` for every pixel of this camera.
    fn maps_from(&self, source: &PinholeCamera, convention: FocalConvention) -> RemapTable;
}

/// Applies a homography to a pixel, clamping the homogeneous coordinate to
/// [`MIN_HOMOGENEOUS`].
pub fn apply_homography(h: &Matrix3<f64>, x: f64, y: f64) -> (f64, f64) {
    let p = h * Vector3::new(x, y, 1.0);
    let w = p.z.max(MIN_HOMOGENEOUS);
    (p.x / w, p.y / w)
}
