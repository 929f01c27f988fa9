use crate::stitching::exposure::ExposureCompensator;
use crate::stitching::image::FloatImage;
use crate::stitching::tiles::Tile;

/// Leaves images untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCompensator;

impl ExposureCompensator for NoOpCompensator {
    fn compensate(&self, _tiles: &[Tile], images: Vec<FloatImage>) -> Vec<FloatImage> {
        images
    }

    fn name(&self) -> &'static str {
        "none"
    }
}
