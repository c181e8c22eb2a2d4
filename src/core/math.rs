// Math utilities and helper functions

use glam::Vec2;

/// Axis-aligned bounding box in world space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Create a box from its two corners
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Create a box centered on `center` extending `half_extents` on each side
    pub fn from_center_half_extents(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Check if two boxes touch or overlap
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Check if a point lies inside the box (edges included)
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Overlapping region of two boxes, if any
    pub fn intersection(&self, other: &Aabb) -> Option<Aabb> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        if min.x <= max.x && min.y <= max.y {
            Some(Aabb { min, max })
        } else {
            None
        }
    }

    /// Closest point inside the box to `point`
    pub fn clamp_point(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min, self.max)
    }
}

/// Geometric mean of two non-negative coefficients (used to mix friction)
pub fn geometric_mean(a: f32, b: f32) -> f32 {
    (a * b).max(0.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_from_center() {
        let aabb = Aabb::from_center_half_extents(Vec2::new(10.0, 5.0), Vec2::new(2.0, 1.0));
        assert_eq!(aabb.min, Vec2::new(8.0, 4.0));
        assert_eq!(aabb.max, Vec2::new(12.0, 6.0));
        assert_eq!(aabb.center(), Vec2::new(10.0, 5.0));
        assert_eq!(aabb.size(), Vec2::new(4.0, 2.0));
    }

    #[test]
    fn test_aabb_overlap_and_intersection() {
        let a = Aabb::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = Aabb::new(Vec2::new(5.0, 8.0), Vec2::new(20.0, 20.0));
        let c = Aabb::new(Vec2::new(30.0, 30.0), Vec2::new(40.0, 40.0));

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));

        let region = a.intersection(&b).unwrap();
        assert_eq!(region.min, Vec2::new(5.0, 8.0));
        assert_eq!(region.max, Vec2::new(10.0, 10.0));
        assert!(a.intersection(&c).is_none());
    }

    #[test]
    fn test_clamp_point() {
        let aabb = Aabb::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        assert_eq!(aabb.clamp_point(Vec2::new(-5.0, 5.0)), Vec2::new(0.0, 5.0));
        assert_eq!(aabb.clamp_point(Vec2::new(3.0, 4.0)), Vec2::new(3.0, 4.0));
        assert!(aabb.contains_point(Vec2::new(10.0, 0.0)));
    }

    #[test]
    fn test_geometric_mean() {
        assert_eq!(geometric_mean(0.25, 1.0), 0.5);
        assert_eq!(geometric_mean(0.0, 0.8), 0.0);
    }
}
