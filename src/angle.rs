use std::fmt;

use serde::{Deserialize, Serialize};

/// Viewing angle about the vertical axis. Serialized as whole degrees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum Angle {
    Deg0,
    Deg45,
    Deg90,
    Deg135,
}

impl Angle {
    /// Every angle, in processing order.
    pub const ALL: [Angle; 4] = [Angle::Deg0, Angle::Deg45, Angle::Deg90, Angle::Deg135];

    pub fn degrees(&self) -> u32 {
        match self {
            Angle::Deg0 => 0,
            Angle::Deg45 => 45,
            Angle::Deg90 => 90,
            Angle::Deg135 => 135,
        }
    }

    pub fn radians(&self) -> f64 {
        (self.degrees() as f64).to_radians()
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.degrees())
    }
}

impl From<Angle> for u32 {
    fn from(angle: Angle) -> Self {
        angle.degrees()
    }
}

impl TryFrom<u32> for Angle {
    type Error = String;

    fn try_from(degrees: u32) -> Result<Self, Self::Error> {
        Angle::ALL
            .into_iter()
            .find(|a| a.degrees() == degrees)
            .ok_or_else(|| format!("unsupported angle {}", degrees))
    }
}
