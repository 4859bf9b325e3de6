//! Planar coordinate type.
//!
//! The city is a disk of radius `city_radius_km` centred on the origin.
//! Coordinates are kilometres on a flat plane; travel distance is the
//! straight-line (Euclidean) distance.

/// A position in the city plane, in kilometres.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in kilometres.
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Distance from the city centre.
    #[inline]
    pub fn norm(self) -> f64 {
        self.distance(Point::ORIGIN)
    }

    /// `true` if the point lies inside (or on) the disk of `radius` km.
    #[inline]
    pub fn within_radius(self, radius: f64) -> bool {
        self.norm() <= radius
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}
