//! TIFF output of stitched frames

mod standard_tiff_writer;
mod types;
mod writer;

pub use standard_tiff_writer::StandardTiffWriter;
pub use types::{TiffCompression, TiffOutputConfig, TiffOutputConfigBuilder};
pub use writer::TiffWriter;
