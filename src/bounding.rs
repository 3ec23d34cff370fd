//! Bounding primitives.
//!
//! [`TVec3`], [`BVec3`], [`Aabb`]

use std::{
    fmt::{Debug, Display},
    ops::{Add, AddAssign, Index, Mul, Neg, Sub, SubAssign},
};

use num::{traits::NumAssign, Float as NumFloat};

use crate::{
    shape::{Intersection, Shape},
    TreeError,
};

/// Scalar type of every coordinate in the tree.
///
/// Implemented for `f32` and `f64`.
pub trait Float: NumFloat + NumAssign + Default + Display + Debug {}
impl Float for f32 {}
impl Float for f64 {}

#[inline]
pub(crate) fn half<F: Float>() -> F {
    F::one() / (F::one() + F::one())
}

/// Coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

/// Tree Vec3
///
/// Inner type should be any [`Float`]: `f32` or `f64`.
#[derive(Default, Debug, PartialEq, Clone, Copy)]
pub struct TVec3<F: Float> {
    pub x: F,
    pub y: F,
    pub z: F,
}

impl<F: Float> Add for TVec3<F> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        TVec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl<F: Float> Sub for TVec3<F> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        TVec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl<F: Float> Mul<F> for TVec3<F> {
    type Output = Self;

    fn mul(self, scale: F) -> Self {
        TVec3 {
            x: self.x * scale,
            y: self.y * scale,
            z: self.z * scale,
        }
    }
}

impl<F: Float> Neg for TVec3<F> {
    type Output = Self;

    fn neg(self) -> Self {
        TVec3 {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl<F: Float> AddAssign for TVec3<F> {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl<F: Float> SubAssign for TVec3<F> {
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
    }
}

impl<F: Float> Index<Axis> for TVec3<F> {
    type Output = F;

    fn index(&self, axis: Axis) -> &F {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

impl<F: Float> Display for TVec3<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

impl<F: Float> From<[F; 3]> for TVec3<F> {
    fn from([x, y, z]: [F; 3]) -> Self {
        TVec3 { x, y, z }
    }
}

impl<F: Float> TVec3<F> {
    pub fn new(x: F, y: F, z: F) -> Self {
        TVec3 { x, y, z }
    }

    pub fn splat(value: F) -> Self {
        TVec3 {
            x: value,
            y: value,
            z: value,
        }
    }

    pub fn zero() -> Self {
        Self::splat(F::zero())
    }

    pub fn dot(&self, other: Self) -> F {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: Self) -> Self {
        TVec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn abs(&self) -> Self {
        TVec3 {
            x: self.x.abs(),
            y: self.y.abs(),
            z: self.z.abs(),
        }
    }

    /// Componentwise minimum.
    pub fn min(&self, other: Self) -> Self {
        TVec3 {
            x: self.x.min(other.x),
            y: self.y.min(other.y),
            z: self.z.min(other.z),
        }
    }

    /// Componentwise maximum.
    pub fn max(&self, other: Self) -> Self {
        TVec3 {
            x: self.x.max(other.x),
            y: self.y.max(other.y),
            z: self.z.max(other.z),
        }
    }

    pub fn length_squared(&self) -> F {
        self.dot(*self)
    }

    pub fn length(&self) -> F {
        self.length_squared().sqrt()
    }

    /// Unit vector with the same direction, `None` for a zero or non-finite vector.
    pub fn normalized(&self) -> Option<Self> {
        let length = self.length();
        if length > F::zero() && length.is_finite() {
            Some(*self * (F::one() / length))
        } else {
            None
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Axis with the largest component. Ties prefer X, then Y.
    pub fn largest_axis(&self) -> Axis {
        if self.x >= self.y && self.x >= self.z {
            Axis::X
        } else if self.y >= self.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    pub fn lt(&self, other: Self) -> BVec3 {
        BVec3::new(self.x < other.x, self.y < other.y, self.z < other.z)
    }

    pub fn gt(&self, other: Self) -> BVec3 {
        BVec3::new(self.x > other.x, self.y > other.y, self.z > other.z)
    }

    pub fn le(&self, other: Self) -> BVec3 {
        BVec3::new(self.x <= other.x, self.y <= other.y, self.z <= other.z)
    }

    pub fn ge(&self, other: Self) -> BVec3 {
        BVec3::new(self.x >= other.x, self.y >= other.y, self.z >= other.z)
    }
}

/// Boolean Vec3 mask.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub struct BVec3 {
    x: bool,
    y: bool,
    z: bool,
}

impl BVec3 {
    fn new(x: bool, y: bool, z: bool) -> Self {
        BVec3 { x, y, z }
    }

    pub fn all(&self) -> bool {
        self.x && self.y && self.z
    }

    pub fn any(&self) -> bool {
        self.x || self.y || self.z
    }

    pub fn none(&self) -> bool {
        !self.x && !self.y && !self.z
    }
}

/// Axis Aligned Bounding Box
///
/// A well formed box has `min <= max` in every dimension.
/// Boxes are closed: points on a face are inside.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Aabb<F: Float> {
    pub min: TVec3<F>,
    pub max: TVec3<F>,
}

impl<F: Float> Display for Aabb<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Aabb(min: {}, max: {})", self.min, self.max)
    }
}

impl<F: Float> Aabb<F> {
    /// Creates a new [`Aabb`] object without any checks
    pub fn new_unchecked(min: TVec3<F>, max: TVec3<F>) -> Self {
        Aabb { min, max }
    }

    /// Creates a new [`Aabb`] object
    ///
    /// Checks that all coordinates are finite
    /// and that `min` does not exceed `max`.
    pub fn new(min: TVec3<F>, max: TVec3<F>) -> Result<Self, TreeError> {
        if !min.is_finite() || !max.is_finite() {
            Err(TreeError::NotFinite(format!("min: {min}, max: {max}")))
        } else if min.gt(max).any() {
            Err(TreeError::Inverted(format!("min: {min}, max: {max}")))
        } else {
            Ok(Self::new_unchecked(min, max))
        }
    }

    /// Box spanned by two arbitrary opposite corners.
    pub fn from_corners(c1: TVec3<F>, c2: TVec3<F>) -> Self {
        Aabb {
            min: c1.min(c2),
            max: c1.max(c2),
        }
    }

    /// Smallest box enclosing a sphere.
    pub fn from_sphere(center: TVec3<F>, radius: F) -> Self {
        let r = TVec3::splat(radius.abs());
        Aabb {
            min: center - r,
            max: center + r,
        }
    }

    /// Smallest box enclosing every point, `None` when there are none.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = TVec3<F>>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Aabb::new_unchecked(first, first), |aabb, p| {
            Aabb::new_unchecked(aabb.min.min(p), aabb.max.max(p))
        }))
    }

    /// Grows this box to also enclose `other`.
    ///
    /// There is no empty box: an accumulator that has not seen a box yet
    /// should be an `Option<Aabb>` assigned outright on the first box,
    /// otherwise the result is biased towards whatever it started as.
    pub fn combine_with(&mut self, other: &Aabb<F>) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn combined(mut self, other: &Aabb<F>) -> Self {
        self.combine_with(other);
        self
    }

    pub fn center(&self) -> TVec3<F> {
        (self.min + self.max) * half()
    }

    /// Size of the box, `max - min`.
    pub fn extent(&self) -> TVec3<F> {
        self.max - self.min
    }

    pub fn half_extent(&self) -> TVec3<F> {
        self.extent() * half()
    }

    /// Radius of the sphere through all eight corners.
    pub fn radius(&self) -> F {
        self.half_extent().length()
    }

    /// True if at least one dimension has zero size.
    pub fn is_degenerate(&self) -> bool {
        let extent = self.extent();
        extent.x <= F::zero() || extent.y <= F::zero() || extent.z <= F::zero()
    }

    /// Checks if the aabb contains a [`position`](TVec3).
    pub fn contains(&self, position: TVec3<F>) -> bool {
        self.min.le(position).all() && position.le(self.max).all()
    }

    /// Checks if `other` lies completely inside this box.
    pub fn contains_aabb(&self, other: &Aabb<F>) -> bool {
        self.min.le(other.min).all() && other.max.le(self.max).all()
    }

    /// Checks if this volume overlaps with another [`Aabb`].
    ///
    /// Touching faces count as overlap.
    pub fn overlaps(&self, other: &Aabb<F>) -> bool {
        self.min.le(other.max).all() && other.min.le(self.max).all()
    }

    /// Classifies this box against a query shape.
    pub fn intersect<S>(&self, shape: &S) -> Intersection
    where
        S: Shape<F> + ?Sized,
    {
        shape.classify(self)
    }
}
