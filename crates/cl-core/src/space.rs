use serde::{Deserialize, Serialize};

/// A point in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Vec2 {
    /// Create a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Vec2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A circular trigger volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    /// Centre of the volume.
    pub center: Vec2,
    /// Radius; points at exactly this distance are inside.
    pub radius: f64,
}

impl Volume {
    /// Create a volume around `center`.
    pub const fn new(center: Vec2, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Whether `point` lies inside the volume.
    pub fn contains(&self, point: Vec2) -> bool {
        self.center.distance(point) <= self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_contains_boundary() {
        let v = Volume::new(Vec2::new(0.0, 0.0), 5.0);
        assert!(v.contains(Vec2::new(3.0, 4.0)));
        assert!(v.contains(Vec2::new(0.0, 0.0)));
        assert!(!v.contains(Vec2::new(5.0, 0.1)));
    }
}
