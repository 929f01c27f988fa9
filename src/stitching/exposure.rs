//! Exposure compensation between overlapping tiles

mod additive;
mod compensator;
mod noop;

pub use additive::AdditiveCompensator;
pub use compensator::{CompensationMode, ExposureCompensator};
pub use noop::NoOpCompensator;
