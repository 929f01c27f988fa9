//! Virtual canvas construction
//!
//! A canvas is the camera the stitched output is rendered through. Rigs of
//! pinhole cameras laid out along one axis get a concatenated pinhole canvas
//! cropped to the area every projected image fits in; arbitrary orientations
//! get an equirectangular canvas spanning the union of all views.

mod concat;
mod panorama;

pub use concat::{Axis, Margins, concat_canvas, concat_margins, horizontal_canvas, vertical_canvas};
pub use panorama::panorama_canvas;
