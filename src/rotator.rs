use nalgebra::{Rotation3, Vector3};

use crate::{angle::Angle, point_cloud::PointCloud};

/// Rotates the cloud counter-clockwise about the z axis. Heights are unchanged.
pub fn rotate(pc: &PointCloud, angle: Angle) -> PointCloud {
    match angle {
        Angle::Deg0 => pc.clone(),
        _ => rotate_radians(pc, angle.radians()),
    }
}

pub fn rotate_radians(pc: &PointCloud, radians: f64) -> PointCloud {
    let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), radians);
    pc.map_points(|p| {
        let mut position = rotation * p.position;
        // z is untouched by a rotation about z; keep it bit-exact
        position.z = p.position.z;
        p.moved_to(position)
    })
}
