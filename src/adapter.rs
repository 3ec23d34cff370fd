//! Sequence-like front end of an [`AabbTree`] for renderable objects.
//!
//! Fill it with [`push_back`](DrawableTree::push_back), call
//! [`optimize`](DrawableTree::optimize) once, then cull with a
//! [`Frustum`](crate::frustum::Frustum):
//!
//! ```rust
//! use boxtree::prelude::*;
//!
//! struct Mesh {
//!     transform: Transform<f32>,
//! }
//!
//! impl Drawable<f32> for Mesh {
//!     fn object_center(&self) -> TVec3<f32> {
//!         TVec3::zero()
//!     }
//!
//!     fn radius(&self) -> f32 {
//!         1.0
//!     }
//!
//!     fn transform(&self) -> Transform<f32> {
//!         self.transform
//!     }
//! }
//!
//! let meshes: Vec<Mesh> = (0..100)
//!     .map(|i| Mesh {
//!         transform: Transform::from_translation(TVec3::new(i as f32 * 3.0, 0.0, 0.0)),
//!     })
//!     .collect();
//!
//! let mut scene: DrawableTree<Mesh> = DrawableTree::new();
//! for mesh in meshes.iter() {
//!     scene.push_back(mesh);
//! }
//! scene.optimize();
//! assert_eq!(scene.size(), 100);
//!
//! let visible = scene.query(&Aabb::from_corners(TVec3::splat(-1.0), TVec3::splat(10.0)));
//! assert_eq!(visible.len(), 4);
//! ```

use crate::{
    bounding::{Aabb, Float, TVec3},
    shape::Shape,
    tree::AabbTree,
};

/// Split threshold of the drawable tree.
pub const OBJECTS_PER_NODE: usize = 64;

/// Column-major 4x4 affine matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform<F: Float> {
    pub matrix: [F; 16],
}

impl<F: Float> Default for Transform<F> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<F: Float> Transform<F> {
    pub fn identity() -> Self {
        let mut matrix = [F::zero(); 16];
        for i in 0..4 {
            matrix[i * 5] = F::one();
        }
        Transform { matrix }
    }

    pub fn from_translation(translation: TVec3<F>) -> Self {
        let mut transform = Self::identity();
        transform.matrix[12] = translation.x;
        transform.matrix[13] = translation.y;
        transform.matrix[14] = translation.z;
        transform
    }

    pub fn from_matrix(matrix: [F; 16]) -> Self {
        Transform { matrix }
    }

    pub fn transform_point(&self, p: TVec3<F>) -> TVec3<F> {
        let m = &self.matrix;
        TVec3::new(
            m[0] * p.x + m[4] * p.y + m[8] * p.z + m[12],
            m[1] * p.x + m[5] * p.y + m[9] * p.z + m[13],
            m[2] * p.x + m[6] * p.y + m[10] * p.z + m[14],
        )
    }
}

/// Object with a bounding sphere in its own space and a placement in the world.
pub trait Drawable<F: Float> {
    fn object_center(&self) -> TVec3<F>;

    fn radius(&self) -> F;

    fn transform(&self) -> Transform<F>;

    /// Box around the world-space bounding sphere.
    fn world_aabb(&self) -> Aabb<F> {
        let center = self.transform().transform_point(self.object_center());
        Aabb::from_sphere(center, self.radius())
    }
}

/// [`AabbTree`] of borrowed drawables with a cached [`size`](DrawableTree::size).
pub struct DrawableTree<'a, D, F: Float = f32> {
    tree: AabbTree<&'a D, F, OBJECTS_PER_NODE>,
    count: usize,
}

impl<D, F: Float> Default for DrawableTree<'_, D, F> {
    fn default() -> Self {
        DrawableTree {
            tree: AabbTree::new(),
            count: 0,
        }
    }
}

impl<D, F: Float> Clone for DrawableTree<'_, D, F> {
    fn clone(&self) -> Self {
        DrawableTree {
            tree: self.tree.clone(),
            count: self.count,
        }
    }
}

impl<D: std::fmt::Debug, F: Float> std::fmt::Debug for DrawableTree<'_, D, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawableTree")
            .field("tree", &self.tree)
            .field("count", &self.count)
            .finish()
    }
}

impl<'a, D, F> DrawableTree<'a, D, F>
where
    D: Drawable<F>,
    F: Float,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the drawable at its current world position.
    /// Moving it afterwards is not tracked.
    pub fn push_back(&mut self, drawable: &'a D) {
        self.tree.add(drawable, drawable.world_aabb());
    }

    /// Object count as of the last [`optimize`](DrawableTree::optimize).
    pub fn size(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
        self.count = 0;
    }

    /// Rebuilds the tree and refreshes [`size`](DrawableTree::size).
    pub fn optimize(&mut self) {
        self.tree.optimize();
        self.count = self.tree.len();

        log::debug!(
            "Drawable tree rebuilt: {} drawables, {} nodes",
            self.count,
            self.tree.node_count()
        );
    }

    pub fn query<S>(&self, shape: &S) -> Vec<&'a D>
    where
        S: Shape<F> + ?Sized,
    {
        self.tree.query(shape)
    }

    pub fn extend_query<S>(&self, shape: &S, output: &mut Vec<&'a D>)
    where
        S: Shape<F> + ?Sized,
    {
        self.tree.extend_query(shape, output);
    }

    pub fn tree(&self) -> &AabbTree<&'a D, F, OBJECTS_PER_NODE> {
        &self.tree
    }
}

impl<'a, D, F> Extend<&'a D> for DrawableTree<'a, D, F>
where
    D: Drawable<F>,
    F: Float,
{
    fn extend<I: IntoIterator<Item = &'a D>>(&mut self, iter: I) {
        for drawable in iter {
            self.push_back(drawable);
        }
    }
}
