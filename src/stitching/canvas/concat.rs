use tracing::{debug, info, instrument};

use crate::stitching::camera::{FocalConvention, PinholeCamera, apply_homography};
use crate::stitching::common::error::{Result, StitchError};

/// Overflow below this many pixels is treated as none.
const MARGIN_SNAP: f64 = 1e-6;

/// Direction cameras are laid out in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Crop margins in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margins {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

fn snap(overflow: f64) -> f64 {
    if overflow <= MARGIN_SNAP { 0.0 } else { overflow }
}

/// Folds `cameras` into one raw camera along `axis`.
fn concat_all(cameras: &[PinholeCamera], axis: Axis) -> Result<PinholeCamera> {
    let (first, rest) = cameras.split_first().ok_or(StitchError::EmptyCameraList)?;
    rest.iter().try_fold(*first, |acc, cam| match axis {
        Axis::Horizontal => PinholeCamera::hconcat(&acc, cam),
        Axis::Vertical => PinholeCamera::vconcat(&acc, cam),
    })
}

/// Margins `raw` must be cropped by to enclose every camera's projected
/// corners, symmetric along `axis`.
pub fn concat_margins(
    raw: &PinholeCamera,
    cameras: &[PinholeCamera],
    axis: Axis,
    convention: FocalConvention,
) -> Margins {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    for cam in cameras {
        let h = cam.homography_to(raw, convention);
        for (x, y) in cam.corners() {
            let (px, py) = apply_homography(&h, x, y);
            x_min = x_min.min(px);
            x_max = x_max.max(px);
            y_min = y_min.min(py);
            y_max = y_max.max(py);
        }
    }

    let mut margins = Margins {
        left: snap(-x_min),
        top: snap(-y_min),
        right: snap(x_max - raw.width() as f64),
        bottom: snap(y_max - raw.height() as f64),
    };

    match axis {
        Axis::Horizontal => {
            let m = margins.left.max(margins.right);
            margins.left = m;
            margins.right = m;
        }
        Axis::Vertical => {
            let m = margins.top.max(margins.bottom);
            margins.top = m;
            margins.bottom = m;
        }
    }
    margins
}

/// Pinhole canvas for cameras laid out along `axis`.
///
/// The cameras are concatenated into one raw camera which is then cropped so
/// that every camera's projected image fits; a single camera yields itself.
#[instrument(skip(cameras), fields(count = cameras.len()))]
pub fn concat_canvas(
    cameras: &[PinholeCamera],
    axis: Axis,
    convention: FocalConvention,
) -> Result<PinholeCamera> {
    let raw = concat_all(cameras, axis)?;
    debug!(width = raw.width(), height = raw.height(), "Concatenated raw camera");

    let m = concat_margins(&raw, cameras, axis, convention);
    debug!(left = m.left, top = m.top, right = m.right, bottom = m.bottom, "Canvas margins");

    let canvas = raw.crop(m.left, m.top, m.right, m.bottom)?;
    info!(
        width = canvas.width(),
        height = canvas.height(),
        hfov = canvas.hfov(),
        vfov = canvas.vfov(),
        "Built concatenated canvas"
    );
    Ok(canvas)
}

pub fn horizontal_canvas(cameras: &[PinholeCamera], convention: FocalConvention) -> Result<PinholeCamera> {
    concat_canvas(cameras, Axis::Horizontal, convention)
}

pub fn vertical_canvas(cameras: &[PinholeCamera], convention: FocalConvention) -> Result<PinholeCamera> {
    concat_canvas(cameras, Axis::Vertical, convention)
}
