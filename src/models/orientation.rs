//! Sweep orientations.

use serde::{Deserialize, Serialize};

/// One of the four right-angle rotations tried by the orientation sweep.
///
/// The image is rotated clockwise by the given angle before being handed to
/// the recognizer, so a cap photographed 90 degrees counter-clockwise reads
/// upright at [`Orientation::Deg90`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Orientation {
    /// Unrotated
    Deg0,
    /// Rotated 90 degrees clockwise
    Deg90,
    /// Rotated 180 degrees
    Deg180,
    /// Rotated 270 degrees clockwise
    Deg270,
}

impl Orientation {
    /// Sweep order. Earlier entries win ties.
    pub const ALL: [Orientation; 4] = [
        Orientation::Deg0,
        Orientation::Deg90,
        Orientation::Deg180,
        Orientation::Deg270,
    ];

    /// Rotation angle in degrees
    pub fn degrees(self) -> u16 {
        match self {
            Orientation::Deg0 => 0,
            Orientation::Deg90 => 90,
            Orientation::Deg180 => 180,
            Orientation::Deg270 => 270,
        }
    }

    /// Position in the sweep (0-3)
    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Raw recognizer output for one orientation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrientationResult {
    /// Rotation applied before recognition
    pub orientation: Orientation,
    /// Tokens in the order the recognizer reported them
    pub tokens: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_order() {
        let degrees: Vec<u16> = Orientation::ALL.iter().map(|o| o.degrees()).collect();
        assert_eq!(degrees, vec![0, 90, 180, 270]);
        for (i, o) in Orientation::ALL.iter().enumerate() {
            assert_eq!(o.index(), i);
        }
    }
}
