use crate::stitching::camera::pinhole::PinholeCamera;
use crate::stitching::camera::projection::{FieldOfView, FocalConvention, Projection};
use crate::stitching::camera::types::check_resolution;
use crate::stitching::common::error::{Result, StitchError};
use crate::stitching::image::RemapTable;

/// Wraps an angle in degrees into `[-180, 180)`.
pub fn wrap_degrees(angle: f64) -> f64 {
    (angle + 180.0).rem_euclid(360.0) - 180.0
}

/// Cylindrical-angle canvas: pixel centers are evenly spaced in yaw and pitch.
///
/// Column 0 is the largest yaw (the left of the view under the default focal
/// convention) and row 0 the largest pitch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquirectangularCamera {
    width: usize,
    height: usize,
    hfov: f64,
    vfov: f64,
    yaw: f64,
    pitch: f64,
}

impl EquirectangularCamera {
    pub fn new(width: usize, height: usize, hfov: f64, vfov: f64, yaw: f64, pitch: f64) -> Result<Self> {
        check_resolution(width, height)?;
        if !(hfov.is_finite() && hfov > 0.0 && hfov <= 360.0) {
            return Err(StitchError::InvalidCamera(format!(
                "horizontal field of view must be in (0, 360], got {}",
                hfov
            )));
        }
        if !(vfov.is_finite() && vfov > 0.0 && vfov <= 180.0) {
            return Err(StitchError::InvalidCamera(format!(
                "vertical field of view must be in (0, 180], got {}",
                vfov
            )));
        }
        if !(yaw.is_finite() && pitch.is_finite()) {
            return Err(StitchError::InvalidCamera("center yaw and pitch must be finite".into()));
        }

        Ok(Self {
            width,
            height,
            hfov,
            vfov,
            yaw,
            pitch,
        })
    }

    pub fn hfov(&self) -> f64 {
        self.hfov
    }

    pub fn vfov(&self) -> f64 {
        self.vfov
    }

    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    pub fn cx(&self) -> f64 {
        (self.width as f64 - 1.0) / 2.0
    }

    pub fn cy(&self) -> f64 {
        (self.height as f64 - 1.0) / 2.0
    }

    /// Yaw and pitch in degrees seen by pixel `(x, y)`.
    pub fn angles_at(&self, x: f64, y: f64) -> (f64, f64) {
        let yaw = self.yaw - (x - self.cx()) * self.hfov / self.width as f64;
        let pitch = self.pitch - (y - self.cy()) * self.vfov / self.height as f64;
        (yaw, pitch)
    }
}

impl Projection for EquirectangularCamera {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn field_of_view(&self) -> FieldOfView {
        FieldOfView {
            horizontal: self.hfov,
            vertical: self.vfov,
        }
    }

    /// Angular offsets from the source's pose scaled by the source's pixel
    /// density. The source rotation and focal length are not used; the
    /// convention does not apply.
    fn maps_from(&self, source: &PinholeCamera, _convention: FocalConvention) -> RemapTable {
        let x_scale = source.width() as f64 / source.hfov();
        let y_scale = source.height() as f64 / source.vfov();

        RemapTable::from_fn(self.width, self.height, |x, y| {
            let (yaw, pitch) = self.angles_at(x as f64, y as f64);
            let d_yaw = wrap_degrees(yaw - source.yaw());
            let d_pitch = pitch - source.pitch();
            (
                source.cx() - d_yaw * x_scale,
                source.cy() - d_pitch * y_scale,
            )
        })
    }
}
