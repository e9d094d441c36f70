//! The object detection capability the game polls every tick.
//!
//! Implementations live outside this crate (a vision service, a model runner,
//! a test double). The core only passes the camera name through.

use std::{collections::HashMap, sync::Arc};

use futures_util::future::BoxFuture;
use game_api_types::Detection;

use crate::error::{DetectionError, GameError, Result};

pub trait Detector: Send + Sync {
    fn detections_from_camera<'a>(
        &'a self,
        camera_name: &'a str,
    ) -> BoxFuture<'a, std::result::Result<Vec<Detection>, DetectionError>>;
}

/// Detector capabilities resolved by the host, keyed by resource name.
#[derive(Clone, Default)]
pub struct Dependencies {
    detectors: HashMap<String, Arc<dyn Detector>>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_detector(mut self, name: impl Into<String>, detector: Arc<dyn Detector>) -> Self {
        self.insert_detector(name, detector);
        self
    }

    pub fn insert_detector(&mut self, name: impl Into<String>, detector: Arc<dyn Detector>) {
        self.detectors.insert(name.into(), detector);
    }

    pub fn detector(&self, name: &str) -> Result<Arc<dyn Detector>> {
        self.detectors
            .get(name)
            .cloned()
            .ok_or_else(|| GameError::Dependency {
                name: name.to_owned(),
                available: self.names(),
            })
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.detectors.keys().cloned().collect();
        names.sort();
        names
    }
}
