use crate::stitching::exposure::{AdditiveCompensator, NoOpCompensator};
use crate::stitching::image::FloatImage;
use crate::stitching::tiles::Tile;

/// Adjusts warped tile images so that overlapping regions agree.
///
/// `images[i]` is the warped image of `tiles[i]`; the returned vector keeps
/// that order and length.
pub trait ExposureCompensator: Send + Sync {
    fn compensate(&self, tiles: &[Tile], images: Vec<FloatImage>) -> Vec<FloatImage>;

    fn name(&self) -> &'static str;
}

/// Built-in compensator selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompensationMode {
    #[default]
    None,
    Additive,
}

impl CompensationMode {
    pub fn build(self) -> Box<dyn ExposureCompensator> {
        match self {
            CompensationMode::None => Box::new(NoOpCompensator),
            CompensationMode::Additive => Box::new(AdditiveCompensator),
        }
    }
}
