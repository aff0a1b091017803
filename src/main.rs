use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use chrono::Local;
use clap::Parser;
use env_logger::{Builder, Env};

use tree_projection::prelude::*;

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// directory searched recursively for .las/.laz files, or a single file
    input: PathBuf,

    /// folder the projections are written to, mirroring the input tree
    output: PathBuf,

    /// number of parallel workers (default: number of logical CPUs)
    n_workers: Option<usize>,

    /// grid cell edge length in point cloud units
    #[clap(long, conflicts_with = "cells")]
    cell_size: Option<f64>,

    /// fixed number of grid cells per side
    #[clap(long)]
    cells: Option<usize>,

    /// per-cell aggregation
    #[clap(long, value_enum)]
    aggregation: Option<Aggregation>,

    /// projection plane
    #[clap(long, value_enum)]
    plane: Option<ProjectionPlane>,

    /// artifact format
    #[clap(long, value_enum)]
    format: Option<ArtifactFormat>,

    /// JSON configuration file, command line flags take precedence
    #[clap(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_path(path)?,
            None => Config::default(),
        };
        if let Some(n) = self.n_workers {
            config.n_workers = Some(n);
        }
        if let Some(s) = self.cell_size {
            config.grid_resolution = Resolution::CellSize(s);
        }
        if let Some(n) = self.cells {
            config.grid_resolution = Resolution::Cells(n);
        }
        if let Some(aggregation) = self.aggregation {
            config.aggregation = aggregation;
        }
        if let Some(plane) = self.plane {
            config.plane = plane;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        config.validate()?;
        Ok(config)
    }
}

fn handler(args: Args) -> anyhow::Result<BatchReport> {
    let config = args.config()?;

    log::info!("input: {:?}", args.input);
    log::info!("output folder: {:?}", args.output);
    log::info!("config: {:?}", config);

    let start = std::time::Instant::now();
    let jobs = discover(&args.input, &args.output)?;
    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create output folder {:?}", args.output))?;

    let pool = WorkerPool::new(config.pool_config())?;
    let report = pool.run(&jobs, &LasLoader::new(), &config.settings());
    report.log_summary();

    let report_path = args.output.join("report.json");
    match report.write_json(&report_path) {
        Ok(_) => log::info!("write report: {:?}", report_path),
        Err(e) => log::warn!("{}", e),
    }
    log::info!("Elapsed: {:?}", start.elapsed());

    Ok(report)
}

fn main() -> ExitCode {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    let args = Args::parse();

    match handler(args) {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}
