use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, ProjectionError>;

/// Errors raised by the projection pipeline.
///
/// Everything except `Config` and `Discovery` is scoped to a single file (or a
/// single angle of a file) and ends up in the batch report instead of aborting
/// the run.
#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("point cloud {path:?} has no points")]
    EmptyInput { path: PathBuf },

    #[error("projected extent is degenerate ({width} x {height})")]
    DegenerateExtent { width: f64, height: f64 },

    #[error("failed to encode raster: {0}")]
    Encode(String),

    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Discovery(String),
}

impl ProjectionError {
    /// Name used for this error in batch reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "DecodeError",
            Self::EmptyInput { .. } => "EmptyInputError",
            Self::DegenerateExtent { .. } => "DegenerateExtentError",
            Self::Encode(_) => "EncodeError",
            Self::Write { .. } => "WriteError",
            Self::Config(_) => "ConfigError",
            Self::Discovery(_) => "DiscoveryError",
        }
    }

    pub fn decode<E>(path: impl Into<PathBuf>, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Decode {
            path: path.into(),
            source: source.into(),
        }
    }
}
