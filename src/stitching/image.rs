//! Pixel buffers and resampling
//!
//! Input frames arrive as [`ImageData`] in one of the supported sample types;
//! every warp, compensation and blend step works on [`FloatImage`].

mod remap;
pub mod types;

pub use remap::{RemapTable, remap_bilinear};
pub use types::{FloatImage, ImageData, PixelData, PixelType, Sample};
