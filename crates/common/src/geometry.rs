use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Creates a new axis-aligned bounding box from min/max corners.
pub fn bbox(min: Vec2, max: Vec2) -> BoundingBox {
    BoundingBox::new(min, max)
}

/// An unrotated, rectangular bounding box (AABB) whose edges are parallel to
/// the coordinate axes.
///
/// Used for viewport intersection tests and spatial partitioning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    min: Vec2,
    max: Vec2,
}

impl BoundingBox {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        BoundingBox { min, max }
    }

    /// Builds a box of the given size centered on a point.
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        BoundingBox {
            min: center - half,
            max: center + half,
        }
    }

    pub fn min(&self) -> Vec2 {
        self.min
    }

    pub fn max(&self) -> Vec2 {
        self.max
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Whether `other` lies entirely within this box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.min.x >= self.min.x
            && other.min.y >= self.min.y
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
    }

    /// AABB intersection test. Touching edges count as intersecting.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        // Reject when one box is fully to the left of or above the other
        if self.max.x < other.min.x || other.max.x < self.min.x {
            return false;
        }
        if self.max.y < other.min.y || other.max.y < self.min.y {
            return false;
        }
        true
    }

    /// The smallest box containing both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grows the box outward by `margin` on all sides.
    pub fn expanded(&self, margin: f32) -> BoundingBox {
        let m = Vec2::splat(margin);
        BoundingBox {
            min: self.min - m,
            max: self.max + m,
        }
    }
}

/// The fixed on-canvas footprint of one signature card.
///
/// Every element shares the same footprint, which keeps layout and culling
/// free of per-element measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub width: f32,
    pub height: f32,
}

impl Footprint {
    pub fn new(width: f32, height: f32) -> Self {
        Footprint { width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// The world-space box of an element centered at `center`.
    pub fn bounds_at(&self, center: Vec2) -> BoundingBox {
        BoundingBox::from_center_size(center, self.size())
    }
}

impl Default for Footprint {
    fn default() -> Self {
        Footprint {
            width: 160.0,
            height: 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;

    #[test]
    fn test_bounds_intersection() {
        let a = bbox(vec2(0.0, 0.0), vec2(100.0, 100.0));

        // Overlapping
        let b = bbox(vec2(50.0, 50.0), vec2(150.0, 150.0));
        assert!(a.intersects(&b));

        // Non-overlapping on x-axis
        let c = bbox(vec2(200.0, 0.0), vec2(300.0, 100.0));
        assert!(!a.intersects(&c));

        // Non-overlapping on y-axis
        let d = bbox(vec2(0.0, 200.0), vec2(100.0, 300.0));
        assert!(!a.intersects(&d));

        // Touching edges intersect
        let e = bbox(vec2(100.0, 0.0), vec2(200.0, 100.0));
        assert!(a.intersects(&e));
    }

    #[test]
    fn test_contains_point() {
        let b = bbox(vec2(10.0, 10.0), vec2(30.0, 40.0));

        assert!(b.contains_point(vec2(15.0, 15.0)));
        assert!(b.contains_point(vec2(10.0, 10.0))); // On edge
        assert!(b.contains_point(vec2(30.0, 40.0))); // Bottom right

        assert!(!b.contains_point(vec2(5.0, 15.0)));
        assert!(!b.contains_point(vec2(15.0, 45.0)));
    }

    #[test]
    fn test_contains_box() {
        let outer = bbox(vec2(0.0, 0.0), vec2(100.0, 100.0));
        assert!(outer.contains(&bbox(vec2(10.0, 10.0), vec2(50.0, 50.0))));
        assert!(outer.contains(&outer)); // A box contains itself
        assert!(!outer.contains(&bbox(vec2(50.0, 50.0), vec2(150.0, 80.0))));
    }

    #[test]
    fn test_union_and_center() {
        let a = bbox(vec2(0.0, 0.0), vec2(10.0, 10.0));
        let b = bbox(vec2(20.0, -5.0), vec2(30.0, 5.0));

        let u = a.union(&b);
        assert_eq!(u.min(), vec2(0.0, -5.0));
        assert_eq!(u.max(), vec2(30.0, 10.0));
        assert_eq!(u.width(), 30.0);
        assert_eq!(u.height(), 15.0);
        assert_eq!(u.center(), vec2(15.0, 2.5));
    }

    #[test]
    fn test_from_center_size_roundtrip() {
        let fp = Footprint::new(80.0, 40.0);
        let b = fp.bounds_at(vec2(100.0, 100.0));

        assert_eq!(b.min(), vec2(60.0, 80.0));
        assert_eq!(b.max(), vec2(140.0, 120.0));
        assert_eq!(b.center(), vec2(100.0, 100.0));
    }

    #[test]
    fn test_expanded() {
        let b = bbox(vec2(0.0, 0.0), vec2(10.0, 10.0)).expanded(5.0);
        assert_eq!(b.min(), vec2(-5.0, -5.0));
        assert_eq!(b.max(), vec2(15.0, 15.0));
    }
}
