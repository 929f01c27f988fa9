//! Rig calibration files
//!
//! Calibration JSON carries a `calibration_info` block and one entry per
//! camera id, each field wrapped as `{"value": <number>}`:
//!
//! ```json
//! {
//!   "calibration_info": {"setup_date": "2025-07-29 15:21:23.854239", "json_version": 2},
//!   "cameras": {
//!     "t1": {"width": {"value": 640}, "focal_length_x": {"value": 1487.09}, "yaw": {"value": 10.9}}
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::stitching::camera::{CameraParams, PinholeCamera};
use crate::stitching::common::error::{Result, StitchError};

/// Calibration metadata, kept as recorded
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CalibrationInfo {
    pub setup_date: String,
    pub json_version: i64,
    pub calibrated_by: String,
    pub camera_calibration_version: i64,
    pub imu_calibration_version: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalibrationData {
    #[serde(default)]
    pub calibration_info: CalibrationInfo,
    #[serde(default)]
    cameras: BTreeMap<String, Map<String, Value>>,
}

impl CalibrationData {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let data: Self = serde_json::from_str(json)?;
        debug!(cameras = data.cameras.len(), "Parsed calibration");
        Ok(data)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading calibration from {}", path.display());
        let json = std::fs::read_to_string(path)
            .map_err(|e| StitchError::Calibration(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Camera ids in sorted order.
    pub fn camera_ids(&self) -> impl Iterator<Item = &str> {
        self.cameras.keys().map(String::as_str)
    }

    /// Raw parameters of camera `id`; absent fields read as 0.
    pub fn camera_params(&self, id: &str) -> Result<CameraParams> {
        let entry = self
            .cameras
            .get(id)
            .ok_or_else(|| StitchError::UnknownCamera(id.to_string()))?;
        let value = |key: &str| entry.get(key).and_then(|v| v.get("value")).and_then(Value::as_f64).unwrap_or(0.0);

        Ok(CameraParams {
            width: pixel_count(id, "width", value("width"))?,
            height: pixel_count(id, "height", value("height"))?,
            fx: value("focal_length_x"),
            fy: value("focal_length_y"),
            cx: value("center_x"),
            cy: value("center_y"),
            roll: value("roll"),
            pitch: value("pitch"),
            yaw: value("yaw"),
        })
    }

    pub fn camera(&self, id: &str) -> Result<PinholeCamera> {
        PinholeCamera::new(self.camera_params(id)?)
    }
}

fn pixel_count(id: &str, key: &str, value: f64) -> Result<usize> {
    if value < 0.0 || value.fract() != 0.0 {
        return Err(StitchError::Calibration(format!(
            "camera {}: {} must be a non-negative integer, got {}",
            id, key, value
        )));
    }
    Ok(value as usize)
}
