//! Crate's core types reimports.

pub use crate::{
    adapter::{Drawable, DrawableTree, Transform, OBJECTS_PER_NODE},
    bounding::{Aabb, Axis, Float, TVec3},
    frustum::{Frustum, Plane},
    node::{Entry, NodeType},
    road::{RoadHit, RoadPatch, RoadStrip},
    shape::{Everything, Intersection, Ray, Shape, ShapeFn},
    tree::AabbTree,
    NodeId, TreeError, Volume,
};

#[cfg(feature = "bevy")]
pub use crate::bevy_integration::HitResult;
