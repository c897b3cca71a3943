//! Geometric types for canvas and image coordinates

/// A point in either canvas-local screen pixels or document image pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Offset from `other` to `self`
    pub fn delta_from(self, other: Point) -> (f32, f32) {
        (self.x - other.x, self.y - other.y)
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Point) -> f32 {
        let (dx, dy) = self.delta_from(other);
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Size of the host drawing surface in screen pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CanvasBounds {
    pub width: u32,
    pub height: u32,
}

impl CanvasBounds {
    /// Create canvas bounds from a width and height
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether the surface has no drawable area
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a canvas-local point lies on the surface
    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0.0
            && point.y >= 0.0
            && point.x < self.width as f32
            && point.y < self.height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_excludes_far_edges() {
        let bounds = CanvasBounds::new(100, 50);
        assert!(bounds.contains(Point::new(0.0, 0.0)));
        assert!(bounds.contains(Point::new(99.5, 49.5)));
        assert!(!bounds.contains(Point::new(100.0, 10.0)));
        assert!(!bounds.contains(Point::new(10.0, 50.0)));
        assert!(!bounds.contains(Point::new(-0.1, 10.0)));
    }

    #[test]
    fn test_empty_bounds_contain_nothing() {
        let bounds = CanvasBounds::new(0, 10);
        assert!(bounds.is_empty());
        assert!(!bounds.contains(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_distance() {
        assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
    }
}
