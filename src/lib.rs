//! Axis aligned bounding box [`tree`](tree::AabbTree) for broad-phase queries.
//!
//! Stores `(payload, box)` pairs and answers "what overlaps this shape"
//! faster than a linear scan. The tree is a filter: results still need an
//! exact test by the caller.
//!
//! ## Available methods:
//!
//! - ### Filling
//!
//!   - [`Adding`](tree::AabbTree::add)
//!   - [`Rebuilding`](tree::AabbTree::optimize)
//!   - [`Removing`](tree::AabbTree::remove) and [`hinted removing`](tree::AabbTree::remove_within)
//!
//! - ### Querying
//!
//!   - [`Ray`](shape::Ray) segments
//!   - [`View frustums`](frustum::Frustum)
//!   - Points ([`TVec3`](bounding::TVec3)) and boxes ([`Aabb`])
//!   - Custom closures ([`ShapeFn`](shape::ShapeFn))
//!
//! Every shape classifies a box as `Out`, `Intersect` or `In`.
//! A subtree whose bounds are `In` is accepted without testing its contents.
//!
//! To enable bevy integrations:
//!
//! ```toml
//! [dependencies]
//! boxtree = { version = "0.1.0", features = ["bevy"] }
//! ```
//!
//! ## Optimizations:
//!
//! - Tree structure is represented by a flat [`Pool`](`pool::Pool`) of nodes indexed by [`NodeId`].
//! - Few memory allocations. [`smallvec`] and [`heapless`] structures are used.
//! - No smart pointers ([`Rc`](`std::rc::Rc`), [`RefCell`](std::cell::RefCell) e.t.c)
//!
//! Adding is O(1) and never rebalances. Call [`optimize`](tree::AabbTree::optimize)
//! once after a batch of additions: queries stay correct without it, just slower.
//!
//! ## Example
//!
//! ```rust
//! use boxtree::prelude::*;
//!
//! let mut tree: AabbTree<u32> = AabbTree::new();
//!
//! tree.add(0, Aabb::from_sphere(TVec3::new(0.0, 0.0, 0.0), 1.0));
//! tree.add(1, Aabb::from_sphere(TVec3::new(10.0, 0.0, 0.0), 1.0));
//! tree.add(2, Aabb::from_sphere(TVec3::new(0.0, 10.0, 0.0), 1.0));
//! tree.add(3, Aabb::from_sphere(TVec3::new(0.0, 0.0, 10.0), 1.0));
//! tree.optimize();
//!
//! // Searching along a segment
//! let ray = Ray::new(TVec3::zero(), TVec3::new(1.0, 0.0, 0.0), 12.0);
//! let mut hits = tree.query(&ray);
//! hits.sort();
//! assert_eq!(hits, vec![0, 1]);
//!
//! // Searching by position
//! assert_eq!(tree.query(&TVec3::new(0.0, 10.5, 0.0)), vec![2]);
//! assert!(tree.query(&TVec3::splat(100.0)).is_empty());
//!
//! assert_eq!(tree.remove(&3), 1);
//! assert_eq!(tree.len(), 3);
//! ```
//!
//! ## Check yourself list:
//!
//! - tests
//!
//!   ```sh
//!   cargo test --all-targets --all-features --release
//!   ```
//!
//! - benchmark
//!
//!   ```sh
//!   cargo bench
//!   ```

pub mod adapter;
#[cfg(feature = "bevy")]
pub mod bevy_integration;
pub mod bounding;
pub mod frustum;
pub mod node;
pub mod pool;
pub mod prelude;
pub mod road;
pub mod shape;
pub mod tree;

use bounding::{Aabb, Float};
use std::{
    error::Error,
    fmt::{self},
    ops::Deref,
    rc::Rc,
    sync::Arc,
};

/// Implement to let a [`tree`](tree::AabbTree) take the box from the object itself.
///
/// ```rust
/// use boxtree::prelude::*;
///
/// #[derive(Clone, PartialEq)]
/// struct Rock {
///     center: TVec3<f32>,
/// }
///
/// impl Volume for Rock {
///     type F = f32;
///     fn volume(&self) -> Aabb<f32> {
///         Aabb::from_sphere(self.center, 0.5)
///     }
/// }
///
/// let mut tree: AabbTree<Rock> = AabbTree::new();
/// tree.insert(Rock { center: TVec3::splat(3.0) });
/// assert_eq!(tree.query(&TVec3::splat(3.0)).len(), 1);
/// ```
pub trait Volume {
    type F: Float;

    fn volume(&self) -> Aabb<Self::F>;
}

impl<T: Volume> Volume for &T {
    type F = T::F;

    fn volume(&self) -> Aabb<Self::F> {
        (**self).volume()
    }
}

impl<T: Volume> Volume for Box<T> {
    type F = T::F;

    fn volume(&self) -> Aabb<Self::F> {
        self.deref().volume()
    }
}

impl<T: Volume> Volume for Rc<T> {
    type F = T::F;

    fn volume(&self) -> Aabb<Self::F> {
        self.deref().volume()
    }
}

impl<T: Volume> Volume for Arc<T> {
    type F = T::F;

    fn volume(&self) -> Aabb<Self::F> {
        self.deref().volume()
    }
}

/// Index [`tree.nodes`](pool::Pool) with it.
///
#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(pub u32);

impl From<NodeId> for usize {
    fn from(value: NodeId) -> Self {
        value.0 as usize
    }
}

impl From<usize> for NodeId {
    fn from(value: usize) -> Self {
        NodeId(value as u32)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId {}", self.0)
    }
}

/// Enum of all possible errors of the checked constructors.
///
/// Tree operations themselves never fail.
#[derive(Debug, PartialEq)]
pub enum TreeError {
    /// [`Aabb`] coordinates are NaN or infinite.
    NotFinite(String),

    /// [`Aabb`] minimum exceeds its maximum.
    Inverted(String),

    /// A [`Plane`](frustum::Plane) has no usable normal.
    DegeneratePlane(String),
}

impl Error for TreeError {}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::NotFinite(info) => write!(f, "AABB coordinates should be finite. {info}"),
            TreeError::Inverted(info) => {
                write!(f, "AABB minimum should not exceed its maximum. {info}")
            }
            TreeError::DegeneratePlane(info) => write!(f, "Plane normal is degenerate. {info}"),
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use bounding::TVec3;
    use frustum::Frustum;
    use rand::Rng;
    use shape::{Everything, Ray};
    use tree::AabbTree;

    const RANGE: f32 = 4096.0;

    fn sphere(x: f32, y: f32, z: f32, r: f32) -> Aabb<f32> {
        Aabb::from_sphere(TVec3::new(x, y, z), r)
    }

    fn random_point() -> TVec3<f32> {
        let mut rnd = rand::thread_rng();
        TVec3::new(
            rnd.gen_range(0.0..RANGE),
            rnd.gen_range(0.0..RANGE),
            rnd.gen_range(0.0..RANGE),
        )
    }

    fn random_boxes(count: usize) -> Vec<(usize, Aabb<f32>)> {
        let mut rnd = rand::thread_rng();
        (0..count)
            .map(|i| (i, Aabb::from_sphere(random_point(), rnd.gen_range(0.5..40.0))))
            .collect()
    }

    fn sorted<T: Ord + Clone>(mut v: Vec<T>) -> Vec<T> {
        v.sort();
        v
    }

    fn contents<F: Float, const IDEAL: usize>(tree: &AabbTree<usize, F, IDEAL>) -> Vec<usize> {
        sorted(tree.contained_objects().into_iter().copied().collect())
    }

    #[test]
    fn test_scenario_ray() {
        let mut tree: AabbTree<&str> = AabbTree::new();
        tree.add("origin", sphere(0.0, 0.0, 0.0, 1.0));
        tree.add("x", sphere(10.0, 0.0, 0.0, 1.0));
        tree.add("y", sphere(0.0, 10.0, 0.0, 1.0));
        tree.add("z", sphere(0.0, 0.0, 10.0, 1.0));
        tree.optimize();

        let ray = Ray::new(TVec3::zero(), TVec3::new(1.0, 0.0, 0.0), 12.0);
        assert_eq!(sorted(tree.query(&ray)), vec!["origin", "x"]);
    }

    #[test]
    fn test_scenario_point() {
        let mut tree: AabbTree<u8> = AabbTree::new();
        tree.add(7, Aabb::from_corners(TVec3::splat(-1.0), TVec3::splat(1.0)));

        assert_eq!(tree.query(&TVec3::zero()), vec![7]);
        assert!(tree.query(&TVec3::splat(100.0)).is_empty());

        tree.optimize();
        assert_eq!(tree.query(&TVec3::zero()), vec![7]);
        assert!(tree.query(&TVec3::splat(100.0)).is_empty());
    }

    #[test]
    fn test_contents_without_optimize() {
        let boxes = random_boxes(500);
        let mut tree: AabbTree<usize> = AabbTree::new();
        for (i, aabb) in boxes.iter() {
            tree.add(*i, *aabb);
        }
        // Duplicates are stored as many times as they are added.
        tree.add(3, boxes[3].1);

        let mut expected: Vec<usize> = (0..500).collect();
        expected.push(3);
        assert_eq!(contents(&tree), sorted(expected));
    }

    #[test]
    fn test_optimize_is_content_idempotent() {
        let mut tree: AabbTree<usize, f32, 4> = random_boxes(1000).into_iter().collect();
        let before = contents(&tree);

        tree.optimize();
        assert_eq!(contents(&tree), before);

        tree.optimize();
        assert_eq!(contents(&tree), before);
    }

    #[test]
    fn test_query_completeness() {
        let boxes = random_boxes(2000);
        let mut tree: AabbTree<usize> = boxes.iter().copied().collect();

        let mut rnd = rand::thread_rng();
        let shapes: Vec<Aabb<f32>> = (0..50)
            .map(|_| Aabb::from_sphere(random_point(), rnd.gen_range(10.0..500.0)))
            .collect();
        let rays: Vec<Ray<f32>> = (0..50)
            .map(|_| {
                let direction = random_point() - random_point();
                Ray::new(random_point(), direction, 1.0)
            })
            .collect();

        for optimized in [false, true] {
            if optimized {
                tree.optimize();
            }

            for shape in shapes.iter() {
                let expected: Vec<usize> = boxes
                    .iter()
                    .filter(|(_, aabb)| aabb.overlaps(shape))
                    .map(|(i, _)| *i)
                    .collect();
                assert_eq!(sorted(tree.query(shape)), expected);
            }

            for ray in rays.iter() {
                let expected: Vec<usize> = boxes
                    .iter()
                    .filter(|(_, aabb)| !aabb.intersect(ray).is_out())
                    .map(|(i, _)| *i)
                    .collect();
                assert_eq!(sorted(tree.query(ray)), expected);
            }
        }
    }

    #[test]
    fn test_frustum_query_completeness() {
        let boxes = random_boxes(1000);
        let mut tree: AabbTree<usize, f32, 8> = boxes.iter().copied().collect();
        tree.optimize();

        // An axis aligned box expressed as six planes.
        let frustum = Frustum::from([
            [-1.0, 0.0, 0.0, 3000.0],
            [1.0, 0.0, 0.0, -1000.0],
            [0.0, -1.0, 0.0, 2500.0],
            [0.0, 1.0, 0.0, -500.0],
            [0.0, 0.0, -1.0, 4000.0],
            [0.0, 0.0, 1.0, 0.0],
        ]);
        let region = Aabb::from_corners(
            TVec3::new(1000.0, 500.0, 0.0),
            TVec3::new(3000.0, 2500.0, 4000.0),
        );

        let expected: Vec<usize> = boxes
            .iter()
            .filter(|(_, aabb)| aabb.overlaps(&region))
            .map(|(i, _)| *i)
            .collect();
        assert_eq!(sorted(tree.query(&frustum)), expected);
    }

    #[test]
    fn test_remove() {
        let mut tree: AabbTree<usize, f32, 2> = AabbTree::new();
        for i in 0..100 {
            tree.add(i % 50, sphere(i as f32, 0.0, 0.0, 0.5));
        }
        tree.optimize();

        assert_eq!(tree.remove(&7), 2);
        assert_eq!(tree.remove(&7), 0);

        let expected: Vec<usize> = sorted((0..100).map(|i| i % 50).filter(|&i| i != 7).collect());
        assert_eq!(contents(&tree), expected);

        // Nothing is rebalanced.
        let nodes = tree.node_count();
        assert_eq!(tree.remove(&8), 2);
        assert_eq!(tree.node_count(), nodes);
        assert!(!tree.query(&Everything).contains(&8));
    }

    #[test]
    fn test_remove_within() {
        let boxes = random_boxes(300);
        let mut tree: AabbTree<usize> = boxes.iter().copied().collect();
        tree.optimize();

        for (i, aabb) in boxes.iter().step_by(3) {
            assert_eq!(tree.remove_within(i, aabb), 1);
        }

        let expected: Vec<usize> = (0..300).filter(|i| i % 3 != 0).collect();
        assert_eq!(contents(&tree), expected);
    }

    #[test]
    fn test_coincident_boxes() {
        let mut tree: AabbTree<usize> = AabbTree::new();
        for i in 0..1000 {
            tree.add(i, sphere(5.0, 5.0, 5.0, 1.0));
        }
        tree.optimize();

        assert_eq!(contents(&tree), (0..1000).collect::<Vec<_>>());
        assert_eq!(tree.query(&TVec3::splat(5.0)).len(), 1000);
        assert!(tree.query(&TVec3::splat(7.0)).is_empty());
    }

    #[test]
    fn test_coincident_degenerate_boxes() {
        let mut tree: AabbTree<usize, f64> = AabbTree::new();
        for i in 0..64 {
            tree.add(i, Aabb::from_sphere(TVec3::zero(), 0.0));
        }
        tree.optimize();

        assert_eq!(tree.len(), 64);
        assert_eq!(tree.query(&TVec3::zero()).len(), 64);
    }

    #[test]
    fn test_balance() {
        const COUNT: usize = 8192;
        const IDEAL: usize = 4;

        let mut tree: AabbTree<usize, f32, IDEAL> = AabbTree::new();
        for i in 0..COUNT {
            tree.add(i, Aabb::from_sphere(random_point(), 0.0));
        }
        tree.optimize();

        // Perfectly balanced would be log2(8192 / 4) + 1 = 12 levels.
        let depth = tree.depth();
        assert!(depth >= 12, "depth {depth}");
        assert!(depth <= 40, "depth {depth}");
        assert_eq!(tree.len(), COUNT);
    }

    #[test]
    fn test_empty_and_clear() {
        let mut tree: AabbTree<u32> = AabbTree::new();
        assert!(tree.is_empty());
        assert!(tree.query(&Everything).is_empty());

        tree.optimize();
        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.depth(), 1);

        tree.add(1, sphere(0.0, 0.0, 0.0, 1.0));
        tree.add(2, sphere(5.0, 0.0, 0.0, 1.0));
        tree.optimize();
        assert!(!tree.is_empty());
        assert_eq!(tree.depth(), 2);

        tree.remove(&1);
        tree.remove(&2);
        assert!(tree.is_empty());

        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 1);
        assert!(tree.bbox().is_none());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut tree: AabbTree<u32> = AabbTree::new();
        tree.add(1, sphere(0.0, 0.0, 0.0, 1.0));
        let copy = tree.clone();

        tree.add(2, sphere(1.0, 0.0, 0.0, 1.0));
        assert_eq!(copy.len(), 1);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_error_display() {
        let err = Aabb::new(TVec3::splat(1.0f32), TVec3::zero()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "AABB minimum should not exceed its maximum. min: 1,1,1, max: 0,0,0"
        );
    }
}
