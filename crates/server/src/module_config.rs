//! The module's config file: the game's resource attributes plus the
//! detector endpoints that stand in for the host's resolved dependencies.

use std::{collections::BTreeMap, path::Path, sync::Arc};

use eyre::WrapErr;
use serde::Deserialize;
use spot_game_core::{Attributes, Dependencies};

use crate::http_detector::HttpDetector;

#[derive(Debug, Deserialize)]
pub struct ModuleConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub attributes: Attributes,
    #[serde(default)]
    pub detectors: BTreeMap<String, DetectorEndpoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectorEndpoint {
    pub url: String,
}

fn default_name() -> String {
    "game-logic".to_owned()
}

impl ModuleConfig {
    pub async fn load(path: &Path) -> eyre::Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .wrap_err_with(|| format!("failed to read config {}", path.display()))?;

        Self::parse(&raw).wrap_err_with(|| format!("failed to parse config {}", path.display()))
    }

    pub fn parse(raw: &str) -> eyre::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// One HTTP detector per configured endpoint, all sharing `client`.
    pub fn dependencies(&self, client: &reqwest::Client) -> Dependencies {
        self.detectors
            .iter()
            .fold(Dependencies::new(), |dependencies, (name, endpoint)| {
                dependencies.with_detector(
                    name.clone(),
                    Arc::new(HttpDetector::new(client.clone(), endpoint.url.clone())),
                )
            })
    }
}
