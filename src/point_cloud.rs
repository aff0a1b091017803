use std::path::{Path, PathBuf};

use crate::point::Point;

/// Points loaded from one file, tagged with the file they came from.
#[derive(Clone, Debug, PartialEq)]
pub struct PointCloud {
    path: PathBuf,
    points: Vec<Point>,
}

impl PointCloud {
    pub fn new(path: impl Into<PathBuf>, points: Vec<Point>) -> Self {
        Self {
            path: path.into(),
            points,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Point> {
        self.points.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// A new cloud with the same source path and each point replaced by `f(point)`.
    pub fn map_points<F>(&self, f: F) -> Self
    where
        F: Fn(&Point) -> Point,
    {
        Self {
            path: self.path.clone(),
            points: self.points.iter().map(f).collect(),
        }
    }

    /// Index of the point with maximum z. The first one wins on ties.
    pub fn highest_point_index(&self) -> Option<usize> {
        self.points
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (idx, p)| match best {
                Some((_, z)) if z >= p.position.z => best,
                _ => Some((idx, p.position.z)),
            })
            .map(|(idx, _)| idx)
    }
}

impl<'a> IntoIterator for &'a PointCloud {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
