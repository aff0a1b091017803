use std::fs;
use std::path::{Path, PathBuf};

use crate::{
    angle::Angle,
    config::ProjectionSettings,
    encoder::{ArtifactFormat, Encoder},
    error::ProjectionError,
    loader::PointCloudLoader,
    normalizer::normalize,
    point_cloud::PointCloud,
    report::{Artifact, Failure, JobReport, Stage},
    rotator::rotate,
};

/// Projects one input file at every angle into `output_dir`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectionJob {
    input: PathBuf,
    output_dir: PathBuf,
}

impl ProjectionJob {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `<output_dir>/<input stem>_<degrees>.<ext>`
    pub fn artifact_path(&self, angle: Angle, format: ArtifactFormat) -> PathBuf {
        let stem = self
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "projection".to_string());
        self.output_dir
            .join(format!("{}_{}.{}", stem, angle.degrees(), format.extension()))
    }

    /// Runs load, normalize and then rotate/project/write per angle.
    ///
    /// Never fails as a whole: every problem is recorded in the returned
    /// report. A failing angle does not stop the remaining angles, and
    /// artifacts written before a failure are kept.
    pub fn run(&self, loader: &dyn PointCloudLoader, settings: &ProjectionSettings) -> JobReport {
        let mut report = JobReport::new(&self.input);

        let pc = match loader.load(&self.input) {
            Ok(pc) => pc,
            Err(e) => {
                report.failures.push(Failure::new(Stage::Load, None, &e));
                return report;
            }
        };
        report.points = pc.len();

        // the normalized cloud is shared by every angle below
        let normalized = match normalize(&pc) {
            Ok((_, normalized)) => normalized,
            Err(e) => {
                report.failures.push(Failure::new(Stage::Normalize, None, &e));
                return report;
            }
        };
        drop(pc);

        if let Err(source) = fs::create_dir_all(&self.output_dir) {
            let e = ProjectionError::Write {
                path: self.output_dir.clone(),
                source,
            };
            report.failures.push(Failure::new(Stage::Write, None, &e));
            return report;
        }

        for angle in Angle::ALL {
            match self.project_angle(&normalized, angle, settings) {
                Ok(path) => {
                    log::debug!("wrote {:?}", path);
                    report.artifacts.push(Artifact { angle, path });
                }
                Err((stage, e)) => {
                    report.failures.push(Failure::new(stage, Some(angle), &e));
                }
            }
        }

        report
    }

    fn project_angle(
        &self,
        normalized: &PointCloud,
        angle: Angle,
        settings: &ProjectionSettings,
    ) -> Result<PathBuf, (Stage, ProjectionError)> {
        let rotated = rotate(normalized, angle);
        let grid = settings
            .projector
            .project(&rotated)
            .map_err(|e| (Stage::Project, e))?;
        let bytes = Encoder::new(&grid)
            .encode(settings.format)
            .map_err(|e| (Stage::Encode, e))?;

        let path = self.artifact_path(angle, settings.format);
        fs::write(&path, bytes).map_err(|source| {
            (
                Stage::Write,
                ProjectionError::Write {
                    path: path.clone(),
                    source,
                },
            )
        })?;
        Ok(path)
    }
}
