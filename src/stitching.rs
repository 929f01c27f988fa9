//! Multi-camera image stitching
//!
//! Cameras with known intrinsics and orientation are rendered onto a shared
//! virtual canvas: a concatenated pinhole camera for rigs laid out along one
//! axis, or an equirectangular view for arbitrary orientations. Setup
//! computes the canvas, one warp tile per camera and feathering weights;
//! each [`Stitcher::stitch`] call then warps, exposure-compensates and
//! blends one frame per camera.

pub mod calibration;
pub mod camera;
pub mod canvas;
pub mod common;
pub mod compositor;
pub mod exposure;
pub mod image;
pub mod output;
pub mod tiles;

pub use common::{Result, StitchError};

pub use camera::{
    Camera,
    CameraParams,
    EquirectangularCamera,
    FieldOfView,
    FocalConvention,
    PinholeCamera,
    Projection,
};

pub use canvas::{
    Axis,
    horizontal_canvas,
    panorama_canvas,
    vertical_canvas,
};

pub use tiles::{Rect, Tile};

pub use exposure::{
    AdditiveCompensator,
    CompensationMode,
    ExposureCompensator,
    NoOpCompensator,
};

pub use image::{FloatImage, ImageData, PixelData, PixelType};

pub use compositor::{
    PipelineTimings,
    Stitcher,
    StitcherConfig,
    StitcherConfigBuilder,
};

pub use calibration::{CalibrationData, CalibrationInfo};

pub use output::{
    StandardTiffWriter,
    TiffCompression,
    TiffOutputConfig,
    TiffWriter,
};
