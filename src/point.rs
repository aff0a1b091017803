use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::prelude::Color;

/// Per-point scalar attributes carried through the pipeline unchanged.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct PointAttributes {
    pub intensity: Option<u16>,
    pub return_number: Option<u8>,
    pub classification: Option<u8>,
    pub gps_time: Option<f64>,
    pub color: Option<Color>,
}

/// Point struct that holds the position and optional attributes
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Point {
    pub position: Point3<f64>,
    pub attributes: PointAttributes,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: Point3::new(x, y, z),
            attributes: PointAttributes::default(),
        }
    }

    /// Same attributes at another position.
    pub fn moved_to(&self, position: Point3<f64>) -> Self {
        Self {
            position,
            attributes: self.attributes,
        }
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn z(&self) -> f64 {
        self.position.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moved_to_keeps_attributes() {
        let mut p = Point::new(1., 2., 3.);
        p.attributes.intensity = Some(42);
        p.attributes.color = Some(Color::new(1, 2, 3));

        let q = p.moved_to(Point3::new(0., 0., 0.));
        assert_eq!(q.attributes, p.attributes);
        assert_eq!((q.x(), q.y(), q.z()), (0., 0., 0.));
        assert_eq!(p.z(), 3.);
    }
}
