use std::iter::FromIterator;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::point::Point;

/// Axis-aligned bounds of a point set. An empty set yields inverted bounds
/// (min = +MAX, max = -MAX), which `is_valid` reports.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> BoundingBox {
        BoundingBox { min, max }
    }

    pub fn empty() -> BoundingBox {
        BoundingBox {
            min: Point3::new(f64::MAX, f64::MAX, f64::MAX),
            max: Point3::new(f64::MIN, f64::MIN, f64::MIN),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Largest span over the three axes.
    pub fn max_size(&self) -> f64 {
        let size = self.size();
        size.x.max(size.y).max(size.z)
    }

    pub fn extend(&mut self, p: &Point3<f64>) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }
}

impl<'a> FromIterator<&'a Point> for BoundingBox {
    fn from_iter<I: IntoIterator<Item = &'a Point>>(iter: I) -> Self {
        let mut b = Self::empty();
        for p in iter {
            b.extend(&p.position);
        }
        b
    }
}
