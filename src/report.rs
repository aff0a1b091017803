use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    angle::Angle,
    error::{ProjectionError, Result},
};

/// Pipeline step a failure happened in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Load,
    Normalize,
    Project,
    Encode,
    Write,
    Panic,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Normalize => "normalize",
            Stage::Project => "project",
            Stage::Encode => "encode",
            Stage::Write => "write",
            Stage::Panic => "panic",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub stage: Stage,
    /// `None` when the failure affects every angle of the file
    pub angle: Option<Angle>,
    pub kind: String,
    pub message: String,
}

impl Failure {
    pub fn new(stage: Stage, angle: Option<Angle>, error: &ProjectionError) -> Self {
        Self {
            stage,
            angle,
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }

    pub fn panic(message: String) -> Self {
        Self {
            stage: Stage::Panic,
            angle: None,
            kind: "Panic".to_string(),
            message,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.angle {
            Some(angle) => write!(f, "[{} @ {}°] {}: {}", self.stage, angle, self.kind, self.message),
            None => write!(f, "[{}] {}: {}", self.stage, self.kind, self.message),
        }
    }
}

/// One artifact written for one angle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub angle: Angle,
    pub path: PathBuf,
}

/// Outcome of one projection job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobReport {
    pub input: PathBuf,
    pub points: usize,
    pub artifacts: Vec<Artifact>,
    pub failures: Vec<Failure>,
}

impl JobReport {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            points: 0,
            artifacts: vec![],
            failures: vec![],
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn succeeded_angles(&self) -> Vec<Angle> {
        self.artifacts.iter().map(|a| a.angle).collect()
    }

    pub fn failed_angles(&self) -> Vec<Angle> {
        self.failures.iter().filter_map(|f| f.angle).collect()
    }
}

/// Per-file outcomes of a batch, in input order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    version: String,
    pub jobs: Vec<JobReport>,
}

impl BatchReport {
    pub fn new(jobs: Vec<JobReport>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            jobs,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn total(&self) -> usize {
        self.jobs.len()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &JobReport> {
        self.jobs.iter().filter(|j| j.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &JobReport> {
        self.jobs.iter().filter(|j| !j.is_success())
    }

    pub fn is_success(&self) -> bool {
        self.jobs.iter().all(JobReport::is_success)
    }

    pub fn artifact_count(&self) -> usize {
        self.jobs.iter().map(|j| j.artifacts.len()).sum()
    }

    pub fn log_summary(&self) {
        for job in self.failed() {
            let angles = job
                .succeeded_angles()
                .iter()
                .map(Angle::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            log::error!(
                "Failed: {:?} (written angles: [{}])",
                job.input,
                angles
            );
            for failure in &job.failures {
                log::error!("  {}", failure);
            }
        }
        log::info!(
            "Completed: {}/{} files processed successfully ({} artifacts)",
            self.succeeded().count(),
            self.total(),
            self.artifact_count()
        );
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ProjectionError::Encode(e.to_string()))?;
        std::fs::write(path, json).map_err(|source| ProjectionError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
