//! [Bevy](https://docs.rs/bevy/) game engine integrations.
//!
//! Adds the [Bevy](https://docs.rs/bevy/) game engine as a dependency.
//!
//! ### Shapes:
//! - [`RayCast3d`], [`BoundingSphere`] and [`Aabb3d`] can [query](AabbTree::query) an `f32` tree.
//! - [ray](RayCast3d) [cast](AabbTree::ray_cast) for the closest box along a ray.
//!
//! ```no_run
//! let ray = RayCast3d::new(Vec3A::new(-5.0, 0.0, 0.0), Dir3A::X, 100.0);
//! assert_eq!(
//!   tree.ray_cast(&ray),
//!   HitResult {
//!     object: Some("origin"),
//!     distance: 4.0
//!   }
//! );
//! ```

use bevy::math::{
    bounding::{Aabb3d, BoundingSphere, BoundingVolume, IntersectsVolume, RayCast3d},
    Vec3, Vec3A,
};

use crate::{
    bounding::{Aabb, TVec3},
    shape::{Intersection, Shape},
    tree::AabbTree,
};

impl<T: Clone, const IDEAL: usize> AabbTree<T, f32, IDEAL> {
    /// Intersects the stored boxes with the [`RayCast3d`].
    ///
    /// Returns a [`HitResult`] with the object whose box is hit first
    /// and the distance to that box, if any.
    pub fn ray_cast(&self, ray: &RayCast3d) -> HitResult<T> {
        let mut hit = HitResult::default();
        self.query_entries(ray, |entry| {
            let Some(distance) = ray.aabb_intersection_at(&entry.aabb.into()) else {
                return;
            };
            if hit.object.is_none() || distance < hit.distance {
                hit.object = Some(entry.object.clone());
                hit.distance = distance;
            }
        });
        hit
    }
}

/// Intersection result.
///
/// Contains `Some(object)` in case of intersection,
/// [None] otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult<T> {
    pub object: Option<T>,
    pub distance: f32,
}

impl<T> Default for HitResult<T> {
    fn default() -> Self {
        HitResult {
            object: None,
            distance: 0.0,
        }
    }
}

impl Shape<f32> for RayCast3d {
    fn classify(&self, aabb: &Aabb<f32>) -> Intersection {
        match self.aabb_intersection_at(&(*aabb).into()) {
            Some(_) => Intersection::Intersect,
            None => Intersection::Out,
        }
    }
}

impl Shape<f32> for BoundingSphere {
    fn classify(&self, aabb: &Aabb<f32>) -> Intersection {
        let bounds: Aabb3d = (*aabb).into();
        if !self.intersects(&bounds) {
            return Intersection::Out;
        }

        // Inside if even the farthest corner is.
        let farthest = (bounds.min - self.center)
            .abs()
            .max((bounds.max - self.center).abs());
        if farthest.length_squared() <= self.radius() * self.radius() {
            Intersection::In
        } else {
            Intersection::Intersect
        }
    }
}

impl Shape<f32> for Aabb3d {
    fn classify(&self, aabb: &Aabb<f32>) -> Intersection {
        let bounds: Aabb3d = (*aabb).into();
        if !self.intersects(&bounds) {
            Intersection::Out
        } else if self.contains(&bounds) {
            Intersection::In
        } else {
            Intersection::Intersect
        }
    }
}

impl From<Aabb<f32>> for Aabb3d {
    fn from(value: Aabb<f32>) -> Self {
        Aabb3d {
            min: value.min.into(),
            max: value.max.into(),
        }
    }
}

impl From<Aabb3d> for Aabb<f32> {
    fn from(value: Aabb3d) -> Self {
        Aabb::from_corners(value.min.into(), value.max.into())
    }
}

impl From<TVec3<f32>> for Vec3A {
    fn from(value: TVec3<f32>) -> Self {
        Vec3A::new(value.x, value.y, value.z)
    }
}

impl From<TVec3<f32>> for Vec3 {
    fn from(value: TVec3<f32>) -> Self {
        Vec3::new(value.x, value.y, value.z)
    }
}

impl From<Vec3A> for TVec3<f32> {
    fn from(value: Vec3A) -> Self {
        TVec3::new(value.x, value.y, value.z)
    }
}

impl From<Vec3> for TVec3<f32> {
    fn from(value: Vec3) -> Self {
        TVec3::new(value.x, value.y, value.z)
    }
}
