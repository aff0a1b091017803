use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    encoder::ArtifactFormat,
    error::{ProjectionError, Result},
    projector::{Aggregation, ProjectionPlane, Projector, Resolution},
};

/// Run configuration. Angles are fixed to `Angle::ALL` and not configurable.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grid_resolution: Resolution,
    /// `None` uses one worker per logical CPU
    pub n_workers: Option<usize>,
    pub aggregation: Aggregation,
    pub plane: ProjectionPlane,
    pub format: ArtifactFormat,
}

impl Config {
    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ProjectionError::Config(format!("cannot read {:?}: {}", path, e)))?;
        let config: Config = serde_json::from_str(&text)
            .map_err(|e| ProjectionError::Config(format!("cannot parse {:?}: {}", path, e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_workers == Some(0) {
            return Err(ProjectionError::Config(
                "n_workers must be at least 1".to_string(),
            ));
        }
        self.grid_resolution.validate()
    }

    pub fn settings(&self) -> ProjectionSettings {
        ProjectionSettings {
            projector: Projector::new(self.plane, self.grid_resolution, self.aggregation),
            format: self.format,
        }
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            n_workers: self.n_workers.unwrap_or_else(num_cpus::get),
        }
    }
}

/// What a job needs to turn one cloud into artifacts.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProjectionSettings {
    pub projector: Projector,
    pub format: ArtifactFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    pub n_workers: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            n_workers: num_cpus::get(),
        }
    }
}
