//! Camera parameter records and the validated camera value type

use nalgebra::{Matrix3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::stitching::common::error::{Result, StitchError};

/// Plain camera record as produced by calibration parsers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraParams {
    /// Image width in pixels
    pub width: usize,
    /// Image height in pixels
    pub height: usize,
    /// Focal length along x in pixels
    pub fx: f64,
    /// Focal length along y in pixels
    pub fy: f64,
    /// Principal point x in pixels
    pub cx: f64,
    /// Principal point y in pixels
    pub cy: f64,
    /// Rotation about the optical axis in degrees
    #[serde(default)]
    pub roll: f64,
    /// Rotation about the x axis in degrees
    #[serde(default)]
    pub pitch: f64,
    /// Rotation about the y axis in degrees
    #[serde(default)]
    pub yaw: f64,
}

/// Intrinsics, pose and resolution of one camera.
///
/// Built only through [`Camera::new`], which rejects odd or zero resolutions
/// and non-positive focal lengths. Uses the pinhole frame convention: x right,
/// y down, z forward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    params: CameraParams,
}

impl Camera {
    pub fn new(params: CameraParams) -> Result<Self> {
        check_resolution(params.width, params.height)?;

        if !(params.fx.is_finite() && params.fy.is_finite() && params.fx > 0.0 && params.fy > 0.0)
        {
            return Err(StitchError::InvalidCamera(format!(
                "focal lengths must be positive, got fx={}, fy={}",
                params.fx, params.fy
            )));
        }

        let finite = [params.cx, params.cy, params.roll, params.pitch, params.yaw]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(StitchError::InvalidCamera(
                "principal point and angles must be finite".into(),
            ));
        }

        Ok(Self { params })
    }

    pub fn params(&self) -> &CameraParams {
        &self.params
    }

    pub fn width(&self) -> usize {
        self.params.width
    }

    pub fn height(&self) -> usize {
        self.params.height
    }

    pub fn fx(&self) -> f64 {
        self.params.fx
    }

    pub fn fy(&self) -> f64 {
        self.params.fy
    }

    pub fn cx(&self) -> f64 {
        self.params.cx
    }

    pub fn cy(&self) -> f64 {
        self.params.cy
    }

    pub fn roll(&self) -> f64 {
        self.params.roll
    }

    pub fn pitch(&self) -> f64 {
        self.params.pitch
    }

    pub fn yaw(&self) -> f64 {
        self.params.yaw
    }

    /// Intrinsic matrix `K`.
    pub fn intrinsics(&self) -> Matrix3<f64> {
        let p = &self.params;
        Matrix3::new(p.fx, 0.0, p.cx, 0.0, p.fy, p.cy, 0.0, 0.0, 1.0)
    }

    /// Closed-form inverse of `K`.
    pub fn intrinsics_inverse(&self) -> Matrix3<f64> {
        let p = &self.params;
        Matrix3::new(
            1.0 / p.fx,
            0.0,
            -p.cx / p.fx,
            0.0,
            1.0 / p.fy,
            -p.cy / p.fy,
            0.0,
            0.0,
            1.0,
        )
    }

    /// Camera-to-world rotation `R = Ry(yaw) * Rx(pitch) * Rz(roll)`.
    pub fn rotation(&self) -> Matrix3<f64> {
        let p = &self.params;
        let yaw = Rotation3::from_axis_angle(&Vector3::y_axis(), p.yaw.to_radians());
        let pitch = Rotation3::from_axis_angle(&Vector3::x_axis(), p.pitch.to_radians());
        let roll = Rotation3::from_axis_angle(&Vector3::z_axis(), p.roll.to_radians());
        (yaw * pitch * roll).into_inner()
    }
}

pub(crate) fn check_resolution(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
        return Err(StitchError::InvalidCamera(format!(
            "resolution must be positive and even, got {}x{}",
            width, height
        )));
    }
    Ok(())
}
