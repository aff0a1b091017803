use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use glob::{glob_with, MatchOptions, Pattern};

use crate::{
    angle::Angle,
    encoder::ArtifactFormat,
    error::{ProjectionError, Result},
    job::ProjectionJob,
};

pub const EXTENSIONS: [&str; 2] = ["las", "laz"];

pub fn is_point_cloud_file(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Builds one job per LAS/LAZ file under `input`.
///
/// Directories are searched recursively and mirrored below `output_root`, so
/// `input/oak/t1.las` is projected into `output_root/oak/`. A single file is
/// projected straight into `output_root`.
pub fn discover(input: &Path, output_root: &Path) -> Result<Vec<ProjectionJob>> {
    if !input.exists() {
        return Err(ProjectionError::Discovery(format!(
            "input path does not exist: {:?}",
            input
        )));
    }

    if input.is_file() {
        if !is_point_cloud_file(input) {
            return Err(ProjectionError::Discovery(format!(
                "input file is not a .las/.laz file: {:?}",
                input
            )));
        }
        return Ok(vec![ProjectionJob::new(input, output_root)]);
    }

    if !input.is_dir() {
        return Err(ProjectionError::Discovery(format!(
            "input path is not a directory: {:?}",
            input
        )));
    }

    let files = find_files(input)?;
    if files.is_empty() {
        return Err(ProjectionError::Discovery(format!(
            "no LAS/LAZ files found in {:?}",
            input
        )));
    }

    let jobs = files
        .into_iter()
        .map(|file| {
            let rel_dir = file
                .parent()
                .and_then(|parent| parent.strip_prefix(input).ok())
                .unwrap_or_else(|| Path::new(""));
            let output_dir = output_root.join(rel_dir);
            ProjectionJob::new(file, output_dir)
        })
        .collect::<Vec<_>>();

    check_unique_outputs(&jobs)?;
    Ok(jobs)
}

fn find_files(root: &Path) -> Result<Vec<PathBuf>> {
    let root_str = root.to_str().ok_or_else(|| {
        ProjectionError::Discovery(format!("input path is not valid UTF-8: {:?}", root))
    })?;
    let options = MatchOptions {
        case_sensitive: false,
        ..Default::default()
    };

    let mut files = vec![];
    for ext in EXTENSIONS {
        let pattern = format!("{}/**/*.{}", Pattern::escape(root_str), ext);
        let entries = glob_with(&pattern, options)
            .map_err(|e| ProjectionError::Discovery(format!("bad pattern {}: {}", pattern, e)))?;
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => log::warn!("skipping unreadable entry: {}", e),
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Two inputs sharing a stem in the same directory (e.g. `t1.las` and
/// `t1.laz`) would overwrite each other's artifacts.
fn check_unique_outputs(jobs: &[ProjectionJob]) -> Result<()> {
    let mut seen: HashMap<PathBuf, &Path> = HashMap::new();
    for job in jobs {
        let key = job.artifact_path(Angle::Deg0, ArtifactFormat::default());
        if let Some(other) = seen.insert(key, job.input()) {
            return Err(ProjectionError::Discovery(format!(
                "{:?} and {:?} would write the same artifacts",
                other,
                job.input()
            )));
        }
    }
    Ok(())
}
