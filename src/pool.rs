use std::panic::{self, AssertUnwindSafe};

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::{
    config::{PoolConfig, ProjectionSettings},
    error::{ProjectionError, Result},
    job::ProjectionJob,
    loader::PointCloudLoader,
    report::{BatchReport, Failure, JobReport},
};

/// Fixed-size set of workers running projection jobs independently.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    n_workers: usize,
}

impl WorkerPool {
    pub fn new(config: PoolConfig) -> Result<Self> {
        if config.n_workers == 0 {
            return Err(ProjectionError::Config(
                "worker count must be at least 1".to_string(),
            ));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.n_workers)
            .thread_name(|i| format!("projection-worker-{}", i))
            .build()
            .map_err(|e| ProjectionError::Config(e.to_string()))?;
        Ok(Self {
            pool,
            n_workers: config.n_workers,
        })
    }

    pub fn n_workers(&self) -> usize {
        self.n_workers
    }

    /// Runs every job to completion and reports them in input order.
    ///
    /// Jobs execute in no particular order. A job that fails, or panics, only
    /// affects its own entry in the report.
    pub fn run(
        &self,
        jobs: &[ProjectionJob],
        loader: &dyn PointCloudLoader,
        settings: &ProjectionSettings,
    ) -> BatchReport {
        log::info!(
            "Found {} files to process using {} workers...",
            jobs.len(),
            self.n_workers
        );
        let reports = self.pool.install(|| {
            jobs.par_iter()
                .map(|job| run_isolated(job, loader, settings))
                .collect::<Vec<_>>()
        });
        BatchReport::new(reports)
    }
}

fn run_isolated(
    job: &ProjectionJob,
    loader: &dyn PointCloudLoader,
    settings: &ProjectionSettings,
) -> JobReport {
    let report = panic::catch_unwind(AssertUnwindSafe(|| job.run(loader, settings)))
        .unwrap_or_else(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "job panicked".to_string());
            let mut report = JobReport::new(job.input());
            report.failures.push(Failure::panic(message));
            report
        });

    if report.is_success() {
        log::info!("Processed: {:?}", job.input());
    } else {
        for failure in &report.failures {
            log::error!("Error processing {:?}: {}", job.input(), failure);
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::{Path, PathBuf};

    use itertools::Itertools;

    use super::*;
    use crate::{
        loader::InMemoryLoader, point::Point, point_cloud::PointCloud, report::Stage,
    };

    fn tree(seed: usize) -> Vec<Point> {
        (0..300)
            .map(|i| {
                let t = i as f64 / 300.;
                let a = (i * (seed + 3)) as f64 * 0.37;
                Point::new(
                    10. * seed as f64 + 1.5 * t * a.cos(),
                    -4. + 1.5 * t * a.sin(),
                    20. + seed as f64 - 6. * t,
                )
            })
            .collect()
    }

    fn fixture(n: usize, out: &Path) -> (InMemoryLoader, Vec<ProjectionJob>) {
        let mut loader = InMemoryLoader::new();
        let jobs = (0..n)
            .map(|i| {
                let input = format!("plot/tree_{:02}.las", i);
                loader.insert(input.clone(), tree(i));
                ProjectionJob::new(input, out.join("plot"))
            })
            .collect();
        (loader, jobs)
    }

    fn written(dir: &Path) -> Vec<(PathBuf, Vec<u8>)> {
        fs::read_dir(dir.join("plot"))
            .unwrap()
            .map(|e| e.unwrap().path())
            .sorted()
            .map(|p| {
                let bytes = fs::read(&p).unwrap();
                (p.strip_prefix(dir).unwrap().to_path_buf(), bytes)
            })
            .collect()
    }

    #[test]
    fn worker_count_does_not_change_output() {
        let serial_dir = tempfile::tempdir().unwrap();
        let parallel_dir = tempfile::tempdir().unwrap();
        let settings = ProjectionSettings::default();

        let (loader, jobs) = fixture(6, serial_dir.path());
        let serial = WorkerPool::new(PoolConfig { n_workers: 1 })
            .unwrap()
            .run(&jobs, &loader, &settings);

        let (loader, jobs) = fixture(6, parallel_dir.path());
        let parallel = WorkerPool::new(PoolConfig { n_workers: 4 })
            .unwrap()
            .run(&jobs, &loader, &settings);

        assert!(serial.is_success());
        assert!(parallel.is_success());
        let a = written(serial_dir.path());
        let b = written(parallel_dir.path());
        assert_eq!(a.len(), 24);
        assert_eq!(a, b);
    }

    #[test]
    fn failures_stay_with_their_file() {
        let dir = tempfile::tempdir().unwrap();
        let (loader, mut jobs) = fixture(2, dir.path());
        jobs.insert(1, ProjectionJob::new("plot/corrupt.las", dir.path().join("plot")));

        let report = WorkerPool::new(PoolConfig { n_workers: 3 })
            .unwrap()
            .run(&jobs, &loader, &ProjectionSettings::default());

        assert_eq!(report.total(), 3);
        assert_eq!(report.succeeded().count(), 2);
        assert_eq!(report.artifact_count(), 8);
        let failed = report.failed().collect::<Vec<_>>();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].input, Path::new("plot/corrupt.las"));
        assert_eq!(failed[0].failures[0].kind, "DecodeError");
        // report follows input order, not completion order
        assert_eq!(report.jobs[1].input, Path::new("plot/corrupt.las"));
    }

    struct PanickingLoader(InMemoryLoader);

    impl PointCloudLoader for PanickingLoader {
        fn load(&self, path: &Path) -> crate::error::Result<PointCloud> {
            if path.ends_with("bad.las") {
                panic!("decoder blew up");
            }
            self.0.load(path)
        }
    }

    #[test]
    fn panicking_job_does_not_stop_the_pool() {
        let dir = tempfile::tempdir().unwrap();
        let (loader, mut jobs) = fixture(3, dir.path());
        jobs.push(ProjectionJob::new("plot/bad.las", dir.path().join("plot")));

        let report = WorkerPool::new(PoolConfig { n_workers: 2 })
            .unwrap()
            .run(&jobs, &PanickingLoader(loader), &ProjectionSettings::default());

        assert_eq!(report.succeeded().count(), 3);
        let failure = &report.jobs[3].failures[0];
        assert_eq!(failure.stage, Stage::Panic);
        assert_eq!(failure.message, "decoder blew up");
    }

    #[test]
    fn zero_workers_is_rejected() {
        assert!(WorkerPool::new(PoolConfig { n_workers: 0 }).is_err());
        assert_eq!(
            WorkerPool::new(PoolConfig { n_workers: 2 }).unwrap().n_workers(),
            2
        );
    }
}
