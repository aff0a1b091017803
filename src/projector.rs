use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::{
    bounding_box::BoundingBox,
    error::{ProjectionError, Result},
    point_cloud::PointCloud,
    raster::RasterGrid,
};

/// Upper bound on cells per grid side. A 4096 x 4096 grid of `f64` is 128 MiB.
pub const MAX_CELLS_PER_SIDE: usize = 4_096;

/// Plane the rotated cloud is flattened onto.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectionPlane {
    /// keep (x, z); side view looking along +y
    #[default]
    Vertical,
    /// keep (x, y); top-down view
    Horizontal,
}

impl ProjectionPlane {
    /// (horizontal, vertical) image coordinates of a position.
    pub fn retain(&self, p: &Point3<f64>) -> (f64, f64) {
        match self {
            ProjectionPlane::Vertical => (p.x, p.z),
            ProjectionPlane::Horizontal => (p.x, p.y),
        }
    }
}

/// How the grid cell size is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resolution {
    /// cells of a fixed edge length, in point-cloud units
    CellSize(f64),
    /// fixed number of cells per side, cell size follows the cloud extent
    Cells(usize),
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::CellSize(0.05)
    }
}

impl Resolution {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Resolution::CellSize(s) if !(s.is_finite() && s > 0.) => Err(ProjectionError::Config(
                format!("cell size must be a positive number, got {}", s),
            )),
            Resolution::Cells(n) if n == 0 || n > MAX_CELLS_PER_SIDE => {
                Err(ProjectionError::Config(format!(
                    "cells per side must be within 1..={}, got {}",
                    MAX_CELLS_PER_SIDE, n
                )))
            }
            _ => Ok(()),
        }
    }

    /// (cells per side, cell edge length) for a square window of edge `side`.
    ///
    /// A cell size that would need more than `MAX_CELLS_PER_SIDE` cells is
    /// widened so the window fits in exactly that many.
    pub fn layout(&self, side: f64) -> Result<(usize, f64)> {
        self.validate()?;
        let layout = match *self {
            Resolution::CellSize(s) => {
                let n = (side / s).floor();
                if n < MAX_CELLS_PER_SIDE as f64 {
                    (n as usize + 1, s)
                } else {
                    log::warn!(
                        "cell size {} needs more than {} cells for an extent of {}, using {}",
                        s,
                        MAX_CELLS_PER_SIDE,
                        side,
                        side / MAX_CELLS_PER_SIDE as f64
                    );
                    (MAX_CELLS_PER_SIDE, side / MAX_CELLS_PER_SIDE as f64)
                }
            }
            Resolution::Cells(n) => (n, side / n as f64),
        };
        Ok(layout)
    }
}

/// Per-cell aggregation policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Aggregation {
    /// number of points in the cell
    #[default]
    Count,
    /// height of the cell's highest point above the lowest point of the cloud
    MaxHeight,
    /// points per unit area
    Density,
}

impl Aggregation {
    /// Folds one point of height `height` (>= 0) into the running cell value.
    fn accumulate(&self, cell: f64, height: f64) -> f64 {
        match self {
            Aggregation::Count | Aggregation::Density => cell + 1.,
            Aggregation::MaxHeight => cell.max(height),
        }
    }

    fn finish(&self, cell: f64, cell_area: f64) -> f64 {
        match self {
            Aggregation::Density => cell / cell_area,
            Aggregation::Count | Aggregation::MaxHeight => cell,
        }
    }
}

/// Flattens a point cloud onto a plane and bins it into a square raster.
///
/// The window is a square whose edge is the cloud's largest 3D span, anchored
/// at the minimum of the two retained axes. Every view therefore has a 1:1
/// aspect ratio, and a cloud that is flat along one retained axis still gets
/// a usable grid.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Projector {
    pub plane: ProjectionPlane,
    pub resolution: Resolution,
    pub aggregation: Aggregation,
}

impl Projector {
    pub fn new(plane: ProjectionPlane, resolution: Resolution, aggregation: Aggregation) -> Self {
        Self {
            plane,
            resolution,
            aggregation,
        }
    }

    pub fn project(&self, pc: &PointCloud) -> Result<RasterGrid> {
        let bounds: BoundingBox = pc.iter().collect();
        let (width, height) = if bounds.is_valid() {
            self.plane.retain(&Point3::from(bounds.size()))
        } else {
            (0., 0.)
        };

        let side = bounds.max_size();
        if !bounds.is_valid() || !side.is_finite() || side <= 0. {
            return Err(ProjectionError::DegenerateExtent { width, height });
        }

        let (n, cell_size) = self.resolution.layout(side)?;
        let (lo_u, lo_v) = self.plane.retain(&bounds.min);
        let floor = bounds.min.z;

        let mut grid = RasterGrid::new(n, n, cell_size, [lo_u, lo_v]);
        for p in pc {
            let (u, v) = self.plane.retain(&p.position);
            if let Some(cell) = grid.cell_of(u, v) {
                grid[cell] = self.aggregation.accumulate(grid[cell], p.position.z - floor);
            }
        }

        let area = grid.cell_area();
        grid.data
            .iter_mut()
            .for_each(|v| *v = self.aggregation.finish(*v, area));
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

    use super::*;
    use crate::{angle::Angle, point::Point, rotator::rotate};

    fn cloud(points: &[(f64, f64, f64)]) -> PointCloud {
        PointCloud::new(
            "tree.las",
            points.iter().map(|&(x, y, z)| Point::new(x, y, z)).collect(),
        )
    }

    fn tree(n: usize) -> PointCloud {
        // a crude cone: radius grows with depth below the apex
        let points = (0..n)
            .map(|i| {
                let t = i as f64 / n as f64;
                let depth = 12. * t;
                let r = 0.3 * depth;
                let a = i as f64 * 2.399_963;
                (r * a.cos(), r * a.sin(), -depth)
            })
            .collect::<Vec<_>>();
        cloud(&points)
    }

    #[test]
    fn count_preserves_points() {
        let pc = tree(5_000);
        for plane in [ProjectionPlane::Vertical, ProjectionPlane::Horizontal] {
            let projector = Projector::new(plane, Resolution::CellSize(0.1), Aggregation::Count);
            let grid = projector.project(&pc).unwrap();
            assert_eq!(grid.sum(), 5_000.);
        }
    }

    #[test]
    fn fixed_cell_count() {
        let projector = Projector::new(
            ProjectionPlane::Vertical,
            Resolution::Cells(64),
            Aggregation::Count,
        );
        let grid = projector.project(&tree(1_000)).unwrap();
        assert_eq!((grid.rows, grid.cols), (64, 64));
        assert_eq!(grid.sum(), 1_000.);
    }

    #[test]
    fn stacked_points_fill_one_cell() {
        let pc = cloud(&[(0., 0., 0.), (0., 0., -1.), (0., 0., -2.5), (0., 0., -9.)]);
        let projector = Projector::new(
            ProjectionPlane::Horizontal,
            Resolution::CellSize(1.),
            Aggregation::Count,
        );
        let grid = projector.project(&pc).unwrap();

        assert_eq!((grid.rows, grid.cols), (10, 10));
        assert_eq!(grid[(0, 0)], 4.);
        assert_eq!(grid.occupied(), 1);
        assert!(grid.data.iter().skip(1).all(|v| *v == 0.));
    }

    #[test]
    fn binning_ignores_point_order() {
        let pc = tree(2_000);
        let mut shuffled = pc.points().to_vec();
        shuffled.shuffle(&mut StdRng::seed_from_u64(7));
        let shuffled = PointCloud::new(pc.path(), shuffled);

        for aggregation in [Aggregation::Count, Aggregation::MaxHeight, Aggregation::Density] {
            let projector =
                Projector::new(ProjectionPlane::Vertical, Resolution::CellSize(0.25), aggregation);
            assert_eq!(
                projector.project(&pc).unwrap(),
                projector.project(&shuffled).unwrap()
            );
        }
    }

    #[test]
    fn max_height_and_density() {
        // the first two points share a 1 m cell
        let pc = cloud(&[(0., 0., 0.), (0.5, 0., -0.5), (4., 0., -4.)]);

        let max = Projector::new(
            ProjectionPlane::Horizontal,
            Resolution::CellSize(1.),
            Aggregation::MaxHeight,
        )
        .project(&pc)
        .unwrap();
        assert_eq!(max[(0, 0)], 4.);
        assert_eq!(max[(0, 4)], 0.);

        let density = Projector::new(
            ProjectionPlane::Horizontal,
            Resolution::CellSize(0.5),
            Aggregation::Density,
        )
        .project(&pc)
        .unwrap();
        assert_eq!(density[(0, 0)], 4.);
        assert_eq!(density[(0, 1)], 4.);
        assert_eq!(density[(0, 8)], 4.);
        assert_eq!(density.sum(), 12.);
    }

    #[test]
    fn coincident_points_are_degenerate() {
        let projector = Projector::default();
        let err = projector
            .project(&cloud(&[(1., 1., 1.), (1., 1., 1.)]))
            .unwrap_err();
        assert_eq!(err.kind(), "DegenerateExtentError");

        let err = projector.project(&cloud(&[])).unwrap_err();
        assert!(matches!(err, ProjectionError::DegenerateExtent { .. }));
    }

    #[test]
    fn rejects_unusable_resolution() {
        for resolution in [
            Resolution::CellSize(0.),
            Resolution::CellSize(f64::NAN),
            Resolution::Cells(0),
            Resolution::Cells(MAX_CELLS_PER_SIDE + 1),
        ] {
            assert_eq!(resolution.validate().unwrap_err().kind(), "ConfigError");
            assert!(resolution.layout(1.).is_err());
        }
        assert_eq!(Resolution::CellSize(0.5).layout(2.).unwrap(), (5, 0.5));
        assert_eq!(Resolution::Cells(4).layout(2.).unwrap(), (4, 0.5));
    }

    #[test]
    fn fine_cell_size_is_capped() {
        let (n, cell_size) = Resolution::default().layout(700.).unwrap();
        assert_eq!(n, MAX_CELLS_PER_SIDE);
        assert_eq!(cell_size, 700. / MAX_CELLS_PER_SIDE as f64);
        assert_eq!(
            Resolution::CellSize(1e-9).layout(100.).unwrap().0,
            MAX_CELLS_PER_SIDE
        );
    }

    #[test]
    fn distant_outlier_projects_at_every_angle() {
        let pc = cloud(&[(0., 0., 0.), (1_000., 0., -10.)]);
        let projector = Projector::default();
        for angle in Angle::ALL {
            let grid = projector.project(&rotate(&pc, angle)).unwrap();
            assert!(grid.rows <= MAX_CELLS_PER_SIDE && grid.cols <= MAX_CELLS_PER_SIDE);
            assert_eq!(grid.sum(), 2., "{}", angle);
        }
    }
}
