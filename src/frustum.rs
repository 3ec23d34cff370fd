//! View frustum as six clipping planes.

use crate::{
    bounding::{Aabb, Float, TVec3},
    shape::{Intersection, Shape},
    TreeError,
};

/// Plane `normal · p + d = 0`. Points with a positive distance are in front.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Plane<F: Float> {
    pub normal: TVec3<F>,
    pub d: F,
}

impl<F: Float> Plane<F> {
    pub fn new(a: F, b: F, c: F, d: F) -> Self {
        Plane {
            normal: TVec3::new(a, b, c),
            d,
        }
    }

    /// Signed distance, scaled by the normal's length if it is not a unit vector.
    pub fn distance(&self, point: TVec3<F>) -> F {
        self.normal.dot(point) + self.d
    }

    /// Rescales the plane to a unit normal.
    pub fn normalized(&self) -> Result<Self, TreeError> {
        let length = self.normal.length();
        if length > F::zero() && length.is_finite() {
            let inv = F::one() / length;
            Ok(Plane {
                normal: self.normal * inv,
                d: self.d * inv,
            })
        } else {
            Err(TreeError::DegeneratePlane(format!(
                "normal: {}, d: {}",
                self.normal, self.d
            )))
        }
    }
}

impl<F: Float> From<[F; 4]> for Plane<F> {
    fn from([a, b, c, d]: [F; 4]) -> Self {
        Plane::new(a, b, c, d)
    }
}

/// View volume bounded by six inward facing planes.
///
/// Planes come in the order right, left, bottom, top, far, near when
/// [extracted](Frustum::from_matrices), but any order classifies the same.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Frustum<F: Float> {
    pub planes: [Plane<F>; 6],
}

impl<F: Float> From<[[F; 4]; 6]> for Frustum<F> {
    fn from(planes: [[F; 4]; 6]) -> Self {
        Frustum {
            planes: planes.map(Plane::from),
        }
    }
}

impl<F: Float> Frustum<F> {
    pub fn from_planes(planes: [Plane<F>; 6]) -> Self {
        Frustum { planes }
    }

    /// Extracts the planes from column-major projection and modelview matrices.
    ///
    /// Fails when the combined matrix yields a plane without a normal.
    pub fn from_matrices(projection: &[F; 16], view: &[F; 16]) -> Result<Self, TreeError> {
        let mut clip = [F::zero(); 16];
        for (i, value) in clip.iter_mut().enumerate() {
            let (row, col) = (i / 4, i % 4);
            *value = (0..4).fold(F::zero(), |sum, k| {
                sum + view[row * 4 + k] * projection[k * 4 + col]
            });
        }

        let column = |c: usize| [clip[c], clip[4 + c], clip[8 + c], clip[12 + c]];
        let combine = |a: [F; 4], b: [F; 4], sign: F| {
            Plane::new(
                a[0] + sign * b[0],
                a[1] + sign * b[1],
                a[2] + sign * b[2],
                a[3] + sign * b[3],
            )
        };

        let (w, x, y, z) = (column(3), column(0), column(1), column(2));
        let minus = -F::one();
        let plus = F::one();

        Ok(Frustum {
            planes: [
                combine(w, x, minus).normalized()?,
                combine(w, x, plus).normalized()?,
                combine(w, y, plus).normalized()?,
                combine(w, y, minus).normalized()?,
                combine(w, z, minus).normalized()?,
                combine(w, z, plus).normalized()?,
            ],
        })
    }
}

impl<F: Float> Shape<F> for Frustum<F> {
    /// `Out` as soon as the box is completely behind one plane,
    /// `In` if it is completely in front of all of them.
    fn classify(&self, aabb: &Aabb<F>) -> Intersection {
        let center = aabb.center();
        let h = aabb.half_extent();
        let mut result = Intersection::In;

        for plane in &self.planes {
            let n = plane.normal.abs();
            let reach = n.x * h.x + n.y * h.y + n.z * h.z;
            let distance = plane.distance(center);

            if distance + reach < F::zero() {
                return Intersection::Out;
            }
            if distance - reach < F::zero() {
                result = Intersection::Intersect;
            }
        }

        result
    }
}
