//! Per-camera warp tiles
//!
//! A [`Tile`] is the part of the canvas one camera contributes to, together
//! with the remap table that pulls the camera's pixels into it and the
//! feathering weights used when blending overlapping tiles.

mod distance;
mod rect;
mod tile;

pub use distance::{Boundary, distance_transform};
pub use rect::{Rect, bounding_rect};
pub use tile::{MAP_TOLERANCE, Tile, build_tiles, normalize_weights};
