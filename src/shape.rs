//! Query shapes and tri-state classification.
//!
//! A [`Shape`] classifies a box as [`Out`](Intersection::Out),
//! [`Intersect`](Intersection::Intersect) or [`In`](Intersection::In).
//! `In` lets a query accept a whole subtree without testing it further.

use crate::bounding::{half, Aabb, Float, TVec3};

/// Result of classifying a box against a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intersection {
    /// No overlap.
    Out,
    /// Partial overlap.
    Intersect,
    /// The box is completely inside the shape.
    In,
}

impl Intersection {
    #[inline]
    pub fn is_out(self) -> bool {
        self == Intersection::Out
    }
}

/// Anything a [`tree`](crate::tree::AabbTree) can be queried with.
pub trait Shape<F: Float> {
    fn classify(&self, aabb: &Aabb<F>) -> Intersection;
}

impl<F: Float, S: Shape<F> + ?Sized> Shape<F> for &S {
    fn classify(&self, aabb: &Aabb<F>) -> Intersection {
        (**self).classify(aabb)
    }
}

/// Line segment from `origin` to `origin + direction * length`.
///
/// `direction` does not need to be normalized, the segment is simply scaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray<F: Float> {
    pub origin: TVec3<F>,
    pub direction: TVec3<F>,
    pub length: F,
}

impl<F: Float> Ray<F> {
    pub fn new(origin: TVec3<F>, direction: TVec3<F>, length: F) -> Self {
        Ray {
            origin,
            direction,
            length,
        }
    }

    pub fn end(&self) -> TVec3<F> {
        self.origin + self.direction * self.length
    }
}

impl<F: Float> Shape<F> for Ray<F> {
    /// Separating axis test between the segment and the box.
    ///
    /// A segment has no volume, so a box is never `In`.
    fn classify(&self, aabb: &Aabb<F>) -> Intersection {
        let segdir = self.direction * (self.length * half());
        let diff = (self.origin + segdir) - aabb.center();
        let h = aabb.half_extent();

        let abs_segdir = segdir.abs();
        let abs_diff = diff.abs();
        if abs_diff.x > h.x + abs_segdir.x
            || abs_diff.y > h.y + abs_segdir.y
            || abs_diff.z > h.z + abs_segdir.z
        {
            return Intersection::Out;
        }

        let cross = segdir.cross(diff).abs();
        if cross.x > h.y * abs_segdir.z + h.z * abs_segdir.y
            || cross.y > h.z * abs_segdir.x + h.x * abs_segdir.z
            || cross.z > h.x * abs_segdir.y + h.y * abs_segdir.x
        {
            return Intersection::Out;
        }

        Intersection::Intersect
    }
}

/// A point classifies a box as `In` only when the box collapsed onto it.
impl<F: Float> Shape<F> for TVec3<F> {
    fn classify(&self, aabb: &Aabb<F>) -> Intersection {
        if !aabb.contains(*self) {
            Intersection::Out
        } else if aabb.min == *self && aabb.max == *self {
            Intersection::In
        } else {
            Intersection::Intersect
        }
    }
}

/// A box used as a query region.
impl<F: Float> Shape<F> for Aabb<F> {
    fn classify(&self, aabb: &Aabb<F>) -> Intersection {
        if !self.overlaps(aabb) {
            Intersection::Out
        } else if self.contains_aabb(aabb) {
            Intersection::In
        } else {
            Intersection::Intersect
        }
    }
}

/// Matches every box. Useful to list everything with the query machinery,
/// for example when culling is switched off.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Everything;

impl<F: Float> Shape<F> for Everything {
    fn classify(&self, _: &Aabb<F>) -> Intersection {
        Intersection::In
    }
}

/// Adapts a custom classification closure into a [`Shape`].
///
/// ```rust
/// use boxtree::prelude::*;
///
/// let mut tree: AabbTree<u32> = AabbTree::new();
/// tree.add(1, Aabb::from_sphere(TVec3::splat(1.0), 1.0));
/// tree.add(2, Aabb::from_sphere(TVec3::splat(-5.0), 1.0));
///
/// let positive = ShapeFn(|aabb: &Aabb<f32>| {
///     if aabb.max.x < 0.0 {
///         Intersection::Out
///     } else {
///         Intersection::Intersect
///     }
/// });
/// assert_eq!(tree.query(&positive), vec![1]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ShapeFn<C>(pub C);

impl<F, C> Shape<F> for ShapeFn<C>
where
    F: Float,
    C: Fn(&Aabb<F>) -> Intersection,
{
    fn classify(&self, aabb: &Aabb<F>) -> Intersection {
        (self.0)(aabb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb<f32> {
        Aabb::from_corners(TVec3::splat(-1.0), TVec3::splat(1.0))
    }

    #[test]
    fn test_ray() {
        let aabb = unit_box();
        let origin = TVec3::new(0.0, 0.0, 4.0);
        let down = TVec3::new(0.0, 0.0, -1.0);

        assert_eq!(aabb.intersect(&Ray::new(origin, down, 4.0)), Intersection::Intersect);
        assert_eq!(aabb.intersect(&Ray::new(origin, -down, 4.0)), Intersection::Out);
        // Too short to reach the box.
        assert_eq!(aabb.intersect(&Ray::new(origin, down, 1.0)), Intersection::Out);
        // Starts inside.
        assert_eq!(
            aabb.intersect(&Ray::new(TVec3::zero(), down, 0.5)),
            Intersection::Intersect
        );
    }

    #[test]
    fn test_ray_diagonal_miss() {
        // Passes the corner without touching it; only the cross product axes separate it.
        let aabb = unit_box();
        let ray = Ray::new(TVec3::new(-3.0, 0.0, 0.0), TVec3::new(1.0, 1.0, 0.0), 6.0);
        assert_eq!(aabb.intersect(&ray), Intersection::Out);

        let ray = Ray::new(TVec3::new(-2.0, -2.0, 0.0), TVec3::new(1.0, 1.0, 0.0), 6.0);
        assert_eq!(aabb.intersect(&ray), Intersection::Intersect);
    }

    #[test]
    fn test_ray_degenerate_box() {
        let point = Aabb::from_sphere(TVec3::new(5.0f32, 0.0, 0.0), 0.0);
        let along = Ray::new(TVec3::zero(), TVec3::new(1.0, 0.0, 0.0), 10.0);
        let beside = Ray::new(TVec3::new(0.0, 1.0, 0.0), TVec3::new(1.0, 0.0, 0.0), 10.0);

        assert_eq!(point.intersect(&along), Intersection::Intersect);
        assert_eq!(point.intersect(&beside), Intersection::Out);
    }

    #[test]
    fn test_point() {
        let aabb = unit_box();
        assert_eq!(aabb.intersect(&TVec3::zero()), Intersection::Intersect);
        assert_eq!(aabb.intersect(&TVec3::splat(1.0)), Intersection::Intersect);
        assert_eq!(aabb.intersect(&TVec3::splat(100.0)), Intersection::Out);

        let point = Aabb::from_sphere(TVec3::splat(2.0f32), 0.0);
        assert_eq!(point.intersect(&TVec3::splat(2.0)), Intersection::In);
        assert_eq!(point.intersect(&TVec3::splat(2.5)), Intersection::Out);
    }

    #[test]
    fn test_aabb_query() {
        let region = Aabb::from_corners(TVec3::splat(-10.0f32), TVec3::splat(10.0));
        assert_eq!(unit_box().intersect(&region), Intersection::In);

        let straddling = Aabb::from_sphere(TVec3::new(10.0f32, 0.0, 0.0), 1.0);
        assert_eq!(straddling.intersect(&region), Intersection::Intersect);

        let outside = Aabb::from_sphere(TVec3::new(12.0f32, 0.0, 0.0), 1.0);
        assert_eq!(outside.intersect(&region), Intersection::Out);
    }

    #[test]
    fn test_everything() {
        let far = Aabb::from_sphere(TVec3::splat(1.0e6f32), 1.0);
        assert_eq!(far.intersect(&Everything), Intersection::In);
    }
}
