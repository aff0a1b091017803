use std::collections::HashMap;
use std::path::{Path, PathBuf};

use nalgebra::Point3;

use crate::{
    error::{ProjectionError, Result},
    point::{Point, PointAttributes},
    point_cloud::PointCloud,
};

/// Source of decoded point clouds, keyed by file path.
pub trait PointCloudLoader: Sync {
    fn load(&self, path: &Path) -> Result<PointCloud>;
}

/// Reads `.las` and `.laz` files through the `las` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LasLoader;

impl LasLoader {
    pub fn new() -> Self {
        Self
    }
}

impl PointCloudLoader for LasLoader {
    fn load(&self, path: &Path) -> Result<PointCloud> {
        let decode_error = |e: las::Error| ProjectionError::decode(path, e.to_string());
        let mut reader = las::Reader::from_path(path).map_err(decode_error)?;

        let points = reader
            .points()
            .map(|las_point| {
                let las_point = las_point.map_err(decode_error)?;
                Ok(Point {
                    position: Point3::new(las_point.x, las_point.y, las_point.z),
                    attributes: PointAttributes {
                        intensity: Some(las_point.intensity),
                        return_number: Some(las_point.return_number),
                        classification: Some(u8::from(las_point.classification)),
                        gps_time: las_point.gps_time,
                        color: las_point.color.map(Into::into),
                    },
                })
            })
            .collect::<Result<Vec<_>>>()?;

        log::debug!("decoded {} points from {:?}", points.len(), path);
        Ok(PointCloud::new(path, points))
    }
}

/// Serves pre-built point sets. Paths that were never inserted fail to decode.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoader {
    clouds: HashMap<PathBuf, Vec<Point>>,
}

impl InMemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, points: Vec<Point>) {
        self.clouds.insert(path.into(), points);
    }

    pub fn with(mut self, path: impl Into<PathBuf>, points: Vec<Point>) -> Self {
        self.insert(path, points);
        self
    }
}

impl PointCloudLoader for InMemoryLoader {
    fn load(&self, path: &Path) -> Result<PointCloud> {
        self.clouds
            .get(path)
            .map(|points| PointCloud::new(path, points.clone()))
            .ok_or_else(|| ProjectionError::decode(path, "no such point cloud"))
    }
}
