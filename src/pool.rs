//! [`Pool`] implementation.

use std::ops::{Index, IndexMut};

use crate::{
    bounding::Float,
    node::{Entry, Node, NodeType},
    NodeId,
};

/// Flat storage of every [`Node`] of a tree.
///
/// Nodes reference their children by [`NodeId`]. The first node is the root.
/// Nodes are never freed one by one: a rebuild collapses the whole pool back
/// to a single root and grows it again.
#[derive(Clone)]
pub struct Pool<T, F: Float> {
    pub(crate) vec: Vec<Node<T, F>>,
}

impl<T, F: Float> Default for Pool<T, F> {
    fn default() -> Self {
        Pool {
            vec: vec![Node::default()],
        }
    }
}

impl<T: std::fmt::Debug, F: Float> std::fmt::Debug for Pool<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool").field("vec", &self.vec).finish()
    }
}

/// Indexing a [`pool`](Pool) of [`nodes`](Node) with [`NodeId`]
///
/// ```ignore
/// let node = &tree.nodes[NodeId(42)];
/// ```
impl<T, F: Float> Index<NodeId> for Pool<T, F> {
    type Output = Node<T, F>;

    fn index(&self, index: NodeId) -> &Self::Output {
        &self.vec[usize::from(index)]
    }
}

/// Mutable Indexing a [`pool`](Pool) of [`nodes`](Node) with [`NodeId`]
///
/// ```ignore
/// let mut node = &mut tree.nodes[NodeId(42)];
/// ```
impl<T, F: Float> IndexMut<NodeId> for Pool<T, F> {
    fn index_mut(&mut self, index: NodeId) -> &mut Self::Output {
        &mut self.vec[usize::from(index)]
    }
}

impl<T, F: Float> Pool<T, F> {
    /// Construct a [`Pool`] with a single empty root.
    ///
    /// Helps to reduce the amount of the memory reallocations.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut vec = Vec::with_capacity(capacity.max(1));
        vec.push(Node::default());
        Pool { vec }
    }

    /// Number of nodes, the root included.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.vec.len()
    }

    /// A pool always holds its root.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node<T, F>> {
        self.vec.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Node<T, F>> {
        self.vec.iter_mut()
    }

    /// Drops every node and starts over with an empty root.
    pub(crate) fn clear(&mut self) {
        self.vec.clear();
        self.vec.push(Node::default());
    }

    /// Moves every entry out of every node, then resets to an empty root.
    pub(crate) fn drain(&mut self) -> Vec<Entry<T, F>> {
        let count = self.vec.iter().map(|node| node.objects.len()).sum();
        let mut entries = Vec::with_capacity(count);
        for node in self.vec.iter_mut() {
            entries.extend(node.take_objects());
        }
        self.clear();
        entries
    }

    /// Appends two empty children and turns `parent` into a branch.
    #[inline(always)]
    pub(crate) fn branch(&mut self, parent: NodeId) -> [NodeId; 2] {
        let first = NodeId::from(self.vec.len());
        let second = NodeId::from(self.vec.len() + 1);
        self.vec.push(Node::default());
        self.vec.push(Node::default());
        self[parent].ntype = NodeType::Branch([first, second]);
        [first, second]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounding::{Aabb, TVec3};

    #[test]
    fn test_branch_and_drain() {
        let mut pool: Pool<u8, f32> = Pool::default();
        assert_eq!(pool.len(), 1);

        let [a, b] = pool.branch(NodeId(0));
        assert_eq!((a, b), (NodeId(1), NodeId(2)));
        assert_eq!(pool[NodeId(0)].children(), Some([a, b]));
        assert!(pool[a].is_leaf());

        pool[a].add(1, Aabb::from_sphere(TVec3::zero(), 1.0));
        pool[b].add(2, Aabb::from_sphere(TVec3::splat(3.0), 1.0));

        let drained = pool.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(pool.len(), 1);
        assert!(pool[NodeId(0)].is_leaf());
        assert!(pool[NodeId(0)].bbox().is_none());
    }
}
