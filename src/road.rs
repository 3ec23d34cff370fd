//! Road surface collision.
//!
//! A [`RoadStrip`] keeps its [`patches`](RoadPatch) in an [`AabbTree`] so a
//! wheel contact ray only runs the exact quad test against a few candidates.

use crate::{
    bounding::{Aabb, Float, TVec3},
    shape::Ray,
    tree::AabbTree,
};

/// Exact hit of a ray on a road patch.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RoadHit<F: Float> {
    pub point: TVec3<F>,
    /// Unit surface normal, facing the ray origin.
    pub normal: TVec3<F>,
    /// Distance from the ray origin to `point`.
    pub distance: F,
}

/// Flat quad of road surface.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RoadPatch<F: Float> {
    /// Front left, front right, back right, back left.
    pub corners: [TVec3<F>; 4],
}

impl<F: Float> RoadPatch<F> {
    pub fn new(corners: [TVec3<F>; 4]) -> Self {
        RoadPatch { corners }
    }

    pub fn aabb(&self) -> Aabb<F> {
        let [fl, fr, br, bl] = self.corners;
        Aabb::from_corners(fl, fr).combined(&Aabb::from_corners(br, bl))
    }

    /// Casts a ray of unit `direction` against the quad.
    ///
    /// Only hits no further than `seglen` from `origin` count.
    pub fn collide(
        &self,
        origin: TVec3<F>,
        direction: TVec3<F>,
        seglen: F,
    ) -> Option<RoadHit<F>> {
        let [fl, fr, br, bl] = self.corners;
        let (t, normal) = triangle(origin, direction, [fl, fr, br])
            .or_else(|| triangle(origin, direction, [fl, br, bl]))?;

        if t > seglen {
            return None;
        }

        let normal = if normal.dot(direction) > F::zero() {
            -normal
        } else {
            normal
        };

        Some(RoadHit {
            point: origin + direction * t,
            normal,
            distance: t,
        })
    }
}

/// Moller-Trumbore ray triangle test. Returns the ray parameter and the unit
/// normal of the triangle. Hits behind the origin are discarded.
fn triangle<F: Float>(
    origin: TVec3<F>,
    direction: TVec3<F>,
    [v0, v1, v2]: [TVec3<F>; 3],
) -> Option<(F, TVec3<F>)> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let p = direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() <= F::epsilon() {
        return None;
    }
    let inv_det = F::one() / det;

    let s = origin - v0;
    let u = s.dot(p) * inv_det;
    if u < F::zero() || u > F::one() {
        return None;
    }

    let q = s.cross(edge1);
    let v = direction.dot(q) * inv_det;
    if v < F::zero() || u + v > F::one() {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    if t < F::zero() {
        return None;
    }

    Some((t, edge1.cross(edge2).normalized()?))
}

/// Sequence of road patches with a broad-phase over their boxes.
#[derive(Debug, Clone)]
pub struct RoadStrip<F: Float = f32> {
    patches: Vec<RoadPatch<F>>,
    partition: AabbTree<usize, F>,
}

impl<F: Float> Default for RoadStrip<F> {
    fn default() -> Self {
        RoadStrip {
            patches: Vec::new(),
            partition: AabbTree::new(),
        }
    }
}

impl<F: Float> RoadStrip<F> {
    /// Takes the patches and builds the partition once.
    pub fn new(patches: Vec<RoadPatch<F>>) -> Self {
        let mut strip = RoadStrip {
            patches,
            partition: AabbTree::new(),
        };
        strip.generate_partition();
        strip
    }

    fn generate_partition(&mut self) {
        self.partition.clear();
        for (i, patch) in self.patches.iter().enumerate() {
            self.partition.add(i, patch.aabb());
        }
        self.partition.optimize();

        log::debug!(
            "Road strip partitioned: {} patches, {} nodes",
            self.patches.len(),
            self.partition.node_count()
        );
    }

    pub fn patches(&self) -> &[RoadPatch<F>] {
        &self.patches
    }

    /// Flips the driving direction. Patch indices change, so the partition is rebuilt.
    pub fn reverse(&mut self) {
        self.patches.reverse();
        for patch in self.patches.iter_mut() {
            let [fl, fr, br, bl] = patch.corners;
            patch.corners = [br, bl, fl, fr];
        }
        self.generate_partition();
    }

    /// Indices of the patches whose box the segment crosses.
    /// A superset of the patches [`collide`](RoadStrip::collide) can hit.
    pub fn candidates(&self, origin: TVec3<F>, direction: TVec3<F>, seglen: F) -> Vec<usize> {
        match direction.normalized() {
            Some(direction) => self.partition.query(&Ray::new(origin, direction, seglen)),
            None => Vec::new(),
        }
    }

    /// Finds the closest patch hit by the segment.
    ///
    /// `hint` is the patch hit last time: if it is hit again it is returned
    /// right away, without looking for anything closer.
    pub fn collide(
        &self,
        origin: TVec3<F>,
        direction: TVec3<F>,
        seglen: F,
        hint: Option<usize>,
    ) -> Option<(usize, RoadHit<F>)> {
        let direction = direction.normalized()?;

        if let Some(id) = hint {
            if let Some(hit) = self
                .patches
                .get(id)
                .and_then(|patch| patch.collide(origin, direction, seglen))
            {
                return Some((id, hit));
            }
        }

        let mut closest: Option<(usize, RoadHit<F>)> = None;
        let ray = Ray::new(origin, direction, seglen);
        self.partition.query_for_each(&ray, |&id| {
            if let Some(hit) = self.patches[id].collide(origin, direction, seglen) {
                if closest.map_or(true, |(_, best)| hit.distance < best.distance) {
                    closest = Some((id, hit));
                }
            }
        });
        closest
    }
}
