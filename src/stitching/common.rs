//! Common utilities module
//!
//! This module contains shared utilities used across the stitching pipeline.

pub mod error;

pub use error::{Result, StitchError};
