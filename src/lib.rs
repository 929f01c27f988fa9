pub mod logger;
pub mod stitching;
