use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ProjectionError, Result},
    point_cloud::PointCloud,
};

/// Reference frame of a cloud, anchored on its highest point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizationFrame {
    /// index of the highest point in the source cloud
    pub apex_index: usize,
    /// position of the highest point before normalization
    pub apex: Point3<f64>,
    /// translation added to every point
    pub translation: Vector3<f64>,
}

impl NormalizationFrame {
    pub fn of(pc: &PointCloud) -> Result<Self> {
        let apex_index = pc
            .highest_point_index()
            .ok_or_else(|| ProjectionError::EmptyInput {
                path: pc.path().to_path_buf(),
            })?;
        let apex = pc.points()[apex_index].position;
        Ok(Self {
            apex_index,
            apex,
            translation: -apex.coords,
        })
    }

    pub fn apply(&self, position: &Point3<f64>) -> Point3<f64> {
        position + self.translation
    }
}

/// Moves the cloud so its highest point sits at the origin.
///
/// Relative offsets between points are preserved, so heights become
/// non-positive and measure the distance below the apex.
pub fn normalize(pc: &PointCloud) -> Result<(NormalizationFrame, PointCloud)> {
    let frame = NormalizationFrame::of(pc)?;
    let normalized = pc.map_points(|p| p.moved_to(frame.apply(&p.position)));
    Ok((frame, normalized))
}
