//! The stitching pipeline: validate, warp, compensate, blend

mod stitcher;
mod timing;
mod types;


pub use stitcher::Stitcher;
pub use timing::{PipelineTimings, StepTiming, Timer};
pub use types::{DEFAULT_WEIGHT_EPSILON, StitcherConfig, StitcherConfigBuilder};
