use core::fmt;

use smallvec::SmallVec;

use crate::{
    bounding::{Aabb, Float},
    shape::{Intersection, Shape},
    NodeId,
};

/// Payload stored together with its box.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<T, F: Float> {
    pub object: T,
    pub aabb: Aabb<F>,
}

impl<T, F: Float> Entry<T, F> {
    pub fn new(object: T, aabb: Aabb<F>) -> Self {
        Entry { object, aabb }
    }
}

pub(crate) type Objects<T, F> = SmallVec<[Entry<T, F>; 2]>;

#[derive(Clone)]
pub struct Node<T, F: Float> {
    pub(crate) objects: Objects<T, F>,
    pub(crate) bbox: Option<Aabb<F>>,
    pub ntype: NodeType,
}

impl<T, F: Float> Default for Node<T, F> {
    fn default() -> Self {
        Node {
            objects: SmallVec::new(),
            bbox: None,
            ntype: NodeType::Leaf,
        }
    }
}

impl<T: fmt::Debug, F: Float> fmt::Debug for Node<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("objects", &self.objects)
            .field("bbox", &self.bbox)
            .field("ntype", &self.ntype)
            .finish()
    }
}

impl<T, F: Float> Node<T, F> {
    /// Appends an object to this node. Never descends into children.
    pub(crate) fn add(&mut self, object: T, aabb: Aabb<F>) {
        self.push(Entry::new(object, aabb));
    }

    pub(crate) fn push(&mut self, entry: Entry<T, F>) {
        // The first box is taken as is.
        self.bbox = Some(match self.bbox {
            Some(bbox) => bbox.combined(&entry.aabb),
            None => entry.aabb,
        });
        self.objects.push(entry);
    }

    /// Hands the object list over, leaving this node without objects.
    /// The bounding box is left untouched.
    pub(crate) fn take_objects(&mut self) -> Objects<T, F> {
        std::mem::take(&mut self.objects)
    }

    /// Removes every entry equal to `object` by swapping with the last one.
    /// Order is not preserved. Returns the number of removed entries.
    pub(crate) fn remove(&mut self, object: &T) -> usize
    where
        T: PartialEq,
    {
        let mut removed = 0;
        let mut i = 0;
        while i < self.objects.len() {
            if self.objects[i].object == *object {
                self.objects.swap_remove(i);
                removed += 1;
            } else {
                i += 1;
            }
        }
        removed
    }

    pub fn objects(&self) -> &[Entry<T, F>] {
        &self.objects
    }

    /// Union of every box added to this node, `None` if nothing was ever added.
    ///
    /// Removal does not shrink it.
    pub fn bbox(&self) -> Option<&Aabb<F>> {
        self.bbox.as_ref()
    }

    pub fn is_leaf(&self) -> bool {
        self.ntype == NodeType::Leaf
    }

    pub fn children(&self) -> Option<[NodeId; 2]> {
        match self.ntype {
            NodeType::Branch(children) => Some(children),
            NodeType::Leaf => None,
        }
    }

    /// Classifies the node's bounds. A node that never held anything is `Out`.
    pub(crate) fn classify<S>(&self, shape: &S) -> Intersection
    where
        S: Shape<F> + ?Sized,
    {
        match &self.bbox {
            Some(bbox) => shape.classify(bbox),
            None => Intersection::Out,
        }
    }
}

#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum NodeType {
    #[default]
    Leaf,
    Branch([NodeId; 2]),
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::Leaf => write!(f, "NodeType: Leaf"),
            NodeType::Branch([a, b]) => write!(f, "NodeType: Branch({a}, {b})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounding::TVec3;

    #[test]
    fn test_first_add_assigns_bbox() {
        let mut node: Node<u32, f32> = Node::default();
        assert!(node.bbox().is_none());

        node.add(0, Aabb::from_sphere(TVec3::splat(10.0), 1.0));
        assert_eq!(node.bbox(), Some(&Aabb::from_sphere(TVec3::splat(10.0), 1.0)));

        node.add(1, Aabb::from_sphere(TVec3::splat(20.0), 1.0));
        let bbox = node.bbox().unwrap();
        assert_eq!(bbox.min, TVec3::splat(9.0));
        assert_eq!(bbox.max, TVec3::splat(21.0));
    }

    #[test]
    fn test_remove_swaps() {
        let mut node: Node<u32, f32> = Node::default();
        for object in [1, 2, 1, 3, 1] {
            node.add(object, Aabb::default());
        }

        assert_eq!(node.remove(&1), 3);
        let mut left: Vec<_> = node.objects().iter().map(|e| e.object).collect();
        left.sort();
        assert_eq!(left, vec![2, 3]);

        assert_eq!(node.remove(&7), 0);
        assert_eq!(node.objects().len(), 2);
    }

    #[test]
    fn test_take_objects() {
        let mut node: Node<u32, f32> = Node::default();
        node.add(4, Aabb::from_sphere(TVec3::zero(), 1.0));

        let taken = node.take_objects();
        assert_eq!(taken.len(), 1);
        assert!(node.objects().is_empty());
        assert!(node.bbox().is_some());
        assert_eq!(node.classify(&TVec3::zero()), Intersection::Intersect);
        assert_eq!(Node::<u32, f32>::default().classify(&TVec3::zero()), Intersection::Out);
    }
}
