use thiserror::Error;

use crate::stitching::image::PixelType;

#[derive(Error, Debug)]
pub enum StitchError {
    #[error("At least one camera required")]
    EmptyCameraList,

    #[error("Invalid camera: {0}")]
    InvalidCamera(String),

    #[error("Invalid crop: {0}")]
    InvalidCrop(String),

    #[error("Cannot concatenate cameras: {axis} resolution differs ({left} vs {right})")]
    ConcatMismatch {
        axis: &'static str,
        left: usize,
        right: usize,
    },

    #[error("Degenerate virtual canvas: width={width}, height={height}")]
    DegenerateCanvas { width: usize, height: usize },

    #[error("Expected {expected} images, got {actual}")]
    ImageCountMismatch { expected: usize, actual: usize },

    #[error("All images must share one pixel type: expected {expected:?}, got {actual:?}")]
    PixelTypeMismatch {
        expected: PixelType,
        actual: PixelType,
    },

    #[error("All images must share one channel count: expected {expected}, got {actual}")]
    ChannelCountMismatch { expected: usize, actual: usize },

    #[error(
        "Image {index} is {actual_width}x{actual_height}, camera expects {expected_width}x{expected_height}"
    )]
    DimensionMismatch {
        index: usize,
        expected_width: usize,
        expected_height: usize,
        actual_width: usize,
        actual_height: usize,
    },

    #[error("Invalid image buffer: {0}")]
    InvalidImageBuffer(String),

    #[error("Exposure compensator returned invalid output: {0}")]
    InvalidCompensation(String),

    #[error("Invalid calibration data: {0}")]
    Calibration(String),

    #[error("Unknown camera id: {0}")]
    UnknownCamera(String),

    #[error("Failed to parse calibration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to encode TIFF image: {0}")]
    EncodeError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StitchError>;
