use tracing::{info, instrument};

use crate::stitching::camera::{EquirectangularCamera, PinholeCamera, even_floor};
use crate::stitching::common::error::{Result, StitchError};

/// Angular interval in degrees
#[derive(Debug, Clone, Copy)]
struct Span {
    min: f64,
    max: f64,
}

impl Span {
    fn around(center: f64, fov: f64) -> Self {
        Self {
            min: center - fov / 2.0,
            max: center + fov / 2.0,
        }
    }

    fn union(self, other: Span) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    fn extent(&self) -> f64 {
        self.max - self.min
    }

    fn center(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// Equirectangular canvas covering the union of all camera views.
///
/// Resolution follows the mean pixel density of the cameras. A yaw span of a
/// full turn or more becomes a 360 degree canvas centered at yaw 0; the pitch
/// span is capped at 180 degrees.
#[instrument(skip(cameras), fields(count = cameras.len()))]
pub fn panorama_canvas(cameras: &[PinholeCamera]) -> Result<EquirectangularCamera> {
    let (first, rest) = cameras.split_first().ok_or(StitchError::EmptyCameraList)?;

    let spans = |cam: &PinholeCamera| {
        (
            Span::around(cam.yaw(), cam.hfov()),
            Span::around(cam.pitch(), cam.vfov()),
        )
    };
    let (yaw_span, pitch_span) = rest.iter().fold(spans(first), |(yaw, pitch), cam| {
        let (cam_yaw, cam_pitch) = spans(cam);
        (yaw.union(cam_yaw), pitch.union(cam_pitch))
    });

    let (hfov, center_yaw) = if yaw_span.extent() >= 360.0 {
        (360.0, 0.0)
    } else {
        (yaw_span.extent(), yaw_span.center())
    };
    let vfov = pitch_span.extent().min(180.0);
    let center_pitch = pitch_span.center();

    let n = cameras.len() as f64;
    let x_density = cameras.iter().map(|c| c.width() as f64 / c.hfov()).sum::<f64>() / n;
    let y_density = cameras.iter().map(|c| c.height() as f64 / c.vfov()).sum::<f64>() / n;

    let width = even_floor(hfov * x_density);
    let height = even_floor(vfov * y_density);
    if width == 0 || height == 0 {
        return Err(StitchError::DegenerateCanvas { width, height });
    }

    let canvas = EquirectangularCamera::new(width, height, hfov, vfov, center_yaw, center_pitch)?;
    info!(width, height, hfov, vfov, yaw = center_yaw, pitch = center_pitch, "Built panorama canvas");
    Ok(canvas)
}
