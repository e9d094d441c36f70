//! Validation of the resource attributes handed over by the host.

use std::time::Duration;

use serde_json::{Map, Value};

use crate::error::{GameError, Result};

pub const CAMERA_NAME: &str = "camera_name";
pub const DETECTOR_NAME: &str = "detector_name";
pub const DETECTION_TIMEOUT_SECS: &str = "detection_timeout_secs";

/// Raw attribute map as found in the host's resource configuration.
pub type Attributes = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub camera_name: String,
    pub detector_name: String,
    /// Upper bound for a single detector call. `None` waits forever.
    pub detection_timeout: Option<Duration>,
}

impl GameConfig {
    pub fn from_attributes(attributes: &Attributes) -> Result<Self> {
        let camera_name = required_name(attributes, CAMERA_NAME)?;
        let detector_name = required_name(attributes, DETECTOR_NAME)?;
        let detection_timeout = optional_timeout(attributes)?;

        Ok(Self {
            camera_name,
            detector_name,
            detection_timeout,
        })
    }

    /// Names the host must resolve before the controller is constructed.
    pub fn required_dependencies(&self) -> Vec<String> {
        vec![self.camera_name.clone(), self.detector_name.clone()]
    }
}

/// Validates `attributes` and returns the required dependency names.
pub fn validate(attributes: &Attributes) -> Result<Vec<String>> {
    GameConfig::from_attributes(attributes).map(|config| config.required_dependencies())
}

fn required_name(attributes: &Attributes, key: &str) -> Result<String> {
    let value = attributes
        .get(key)
        .ok_or_else(|| GameError::config(format!("missing required {key} attribute")))?;
    let name = value
        .as_str()
        .ok_or_else(|| GameError::config(format!("{key} must be a string")))?;

    if name.is_empty() {
        return Err(GameError::config(format!("{key} cannot be empty")));
    }

    Ok(name.to_owned())
}

fn optional_timeout(attributes: &Attributes) -> Result<Option<Duration>> {
    let Some(value) = attributes.get(DETECTION_TIMEOUT_SECS) else {
        return Ok(None);
    };

    let invalid =
        || GameError::config(format!("{DETECTION_TIMEOUT_SECS} must be a positive number"));

    match value.as_f64() {
        Some(secs) if secs > 0.0 => Duration::try_from_secs_f64(secs)
            .map(Some)
            .map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}
