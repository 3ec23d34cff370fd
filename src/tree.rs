use std::fmt;

use heapless::Vec as HVec;
use smallvec::SmallVec;

use crate::{
    bounding::{Aabb, Axis, Float},
    node::{Entry, Node, NodeType, Objects},
    pool::Pool,
    shape::{Intersection, Shape},
    NodeId, Volume,
};

/// Nodes kept on the traversal stack before falling back to recursion.
const STACK_DEPTH: usize = 32;

/// Bounding volume tree over `(payload, box)` pairs.
///
/// Filling is cheap and querying is expensive until [`optimize`](AabbTree::optimize)
/// rebuilds the tree: [`add`](AabbTree::add) only ever appends to the root.
/// `IDEAL` is the number of objects a node may hold before a rebuild splits it.
///
/// The tree never looks into payloads besides comparing them on removal.
#[derive(Clone)]
pub struct AabbTree<T, F: Float = f32, const IDEAL: usize = 1> {
    pub nodes: Pool<T, F>,
    pub root: NodeId,
}

impl<T, F: Float, const IDEAL: usize> Default for AabbTree<T, F, IDEAL> {
    fn default() -> Self {
        AabbTree {
            nodes: Pool::default(),
            root: NodeId::default(),
        }
    }
}

impl<T: fmt::Debug, F: Float, const IDEAL: usize> fmt::Debug for AabbTree<T, F, IDEAL> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AabbTree")
            .field("nodes", &self.nodes)
            .field("root", &self.root)
            .finish()
    }
}

impl<T, F: Float, const IDEAL: usize> AabbTree<T, F, IDEAL> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preallocates room for about `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        AabbTree {
            nodes: Pool::with_capacity(capacity),
            root: NodeId::default(),
        }
    }

    /// Appends an object to the root. O(1), the tree is not rebalanced.
    pub fn add(&mut self, object: T, aabb: Aabb<F>) {
        self.nodes[self.root].add(object, aabb);
    }

    /// [`Add`](AabbTree::add) an object that knows its own [`Volume`].
    pub fn insert(&mut self, object: T)
    where
        T: Volume<F = F>,
    {
        let aabb = object.volume();
        self.add(object, aabb);
    }

    /// Removes every entry equal to `object`, wherever it lives.
    ///
    /// Visits every node. Returns the number of removed entries.
    pub fn remove(&mut self, object: &T) -> usize
    where
        T: PartialEq,
    {
        self.nodes.iter_mut().map(|node| node.remove(object)).sum()
    }

    /// Removes every entry equal to `object`, only descending into nodes
    /// whose bounds overlap `hint`.
    ///
    /// Entries outside of `hint` are not found. Returns the number of removed entries.
    pub fn remove_within(&mut self, object: &T, hint: &Aabb<F>) -> usize
    where
        T: PartialEq,
    {
        let mut removed = 0;
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            removed += self.nodes[node].remove(object);
            if let Some(children) = self.nodes[node].children() {
                for child in children {
                    if !self.nodes[child].classify(hint).is_out() {
                        stack.push(child);
                    }
                }
            }
        }
        removed
    }

    /// Query the tree with a [`Shape`].
    ///
    /// Returns the [`vector`](Vec) of objects whose box is not
    /// [`Out`](Intersection::Out) of the shape.
    ///
    /// ```rust
    /// use boxtree::prelude::*;
    ///
    /// let mut tree: AabbTree<&str> = AabbTree::new();
    /// tree.add("origin", Aabb::from_sphere(TVec3::zero(), 1.0));
    /// tree.add("far", Aabb::from_sphere(TVec3::splat(100.0), 1.0));
    /// tree.optimize();
    ///
    /// assert_eq!(tree.query(&TVec3::zero()), vec!["origin"]);
    /// ```
    pub fn query<S>(&self, shape: &S) -> Vec<T>
    where
        S: Shape<F> + ?Sized,
        T: Clone,
    {
        let mut objects = Vec::with_capacity(10);
        self.extend_query(shape, &mut objects);
        objects
    }

    /// Query the tree with a [`Shape`], appending to a supplied
    /// [`vector`](Vec) rather than allocating a new one.
    pub fn extend_query<S>(&self, shape: &S, objects: &mut Vec<T>)
    where
        S: Shape<F> + ?Sized,
        T: Clone,
    {
        self.rquery(self.root, true, shape, &mut |entry: &Entry<T, F>| {
            objects.push(entry.object.clone())
        });
    }

    /// Query the tree with a [`Shape`]. Each matching object is passed to
    /// the supplied closure.
    pub fn query_for_each<S, A>(&self, shape: &S, mut actor: A)
    where
        S: Shape<F> + ?Sized,
        A: FnMut(&T),
    {
        self.rquery(self.root, true, shape, &mut |entry: &Entry<T, F>| {
            actor(&entry.object)
        });
    }

    /// Like [`query_for_each`](AabbTree::query_for_each), but the closure
    /// also sees the box each object was stored with.
    pub fn query_entries<S, A>(&self, shape: &S, mut actor: A)
    where
        S: Shape<F> + ?Sized,
        A: FnMut(&Entry<T, F>),
    {
        self.rquery(self.root, true, shape, &mut actor);
    }

    /// With `test` unset every object below `node` is accepted without a test:
    /// one of its ancestors was classified [`In`](Intersection::In).
    fn rquery<S, A>(&self, node: NodeId, test: bool, shape: &S, actor: &mut A)
    where
        S: Shape<F> + ?Sized,
        A: FnMut(&Entry<T, F>),
    {
        // We use a heapless stack to loop through the nodes, falling back on
        // recursive calls when it is full.
        let mut stack = HVec::<(NodeId, bool), STACK_DEPTH>::new();
        let mut next = Some((node, test));
        while let Some((node, test)) = next.take().or_else(|| stack.pop()) {
            let n = &self.nodes[node];

            for entry in n.objects() {
                if !test || !shape.classify(&entry.aabb).is_out() {
                    actor(entry);
                }
            }

            if let NodeType::Branch(children) = n.ntype {
                for child in children {
                    let test = if test {
                        match self.nodes[child].classify(shape) {
                            Intersection::Out => continue,
                            Intersection::In => false,
                            Intersection::Intersect => true,
                        }
                    } else {
                        false
                    };

                    if let Err((child, test)) = stack.push((child, test)) {
                        self.rquery(child, test, shape, actor);
                    }
                }
            }
        }
    }

    /// True if no node holds an object.
    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(|node| node.objects().is_empty())
    }

    /// Removes everything, leaving an empty root.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Number of stored entries. Walks every node.
    pub fn len(&self) -> usize {
        self.nodes.iter().map(|node| node.objects().len()).sum()
    }

    /// Number of nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes on the longest path from the root to a leaf.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut stack = vec![(self.root, 1)];
        while let Some((node, level)) = stack.pop() {
            depth = depth.max(level);
            if let Some(children) = self.nodes[node].children() {
                stack.extend(children.map(|child| (child, level + 1)));
            }
        }
        depth
    }

    /// Bounds of everything added since the last rebuild, `None` for a fresh tree.
    pub fn bbox(&self) -> Option<&Aabb<F>> {
        self.nodes[self.root].bbox()
    }

    /// Iterates over every stored entry in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry<T, F>> {
        self.nodes.iter().flat_map(|node: &Node<T, F>| node.objects().iter())
    }

    /// Every stored object, in no particular order.
    ///
    /// Meant for debugging and verification, not for queries.
    pub fn contained_objects(&self) -> Vec<&T> {
        let mut objects = Vec::with_capacity(self.len());
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            let n = &self.nodes[node];
            objects.extend(n.objects().iter().map(|entry| &entry.object));
            if let Some(children) = n.children() {
                stack.extend(children);
            }
        }
        objects
    }

    /// Rebuilds the tree into a balanced binary hierarchy.
    ///
    /// Every object is first pulled back into the root, then the root is
    /// split recursively until nodes hold at most `IDEAL` objects.
    /// Always safe, also on an empty or already optimized tree.
    pub fn optimize(&mut self) {
        self.collapse();
        self.remove_duplicate_objects();
        self.distribute_objects_to_children(self.root);

        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "Optimized aabb tree: {} objects, {} nodes, depth {}",
                self.len(),
                self.node_count(),
                self.depth()
            );
        }
    }

    /// Sends every object of every node to the root and drops all other nodes.
    fn collapse(&mut self) {
        for entry in self.nodes.drain() {
            self.nodes[self.root].push(entry);
        }
    }

    /// Duplicates are kept: an object is stored once per add.
    fn remove_duplicate_objects(&mut self) {}

    fn distribute_objects_to_children(&mut self, node: NodeId) {
        let mut pending = vec![(node, 0usize)];
        while let Some((node, level)) = pending.pop() {
            if self.nodes[node].objects().len() <= IDEAL {
                continue;
            }
            let Some(bbox) = self.nodes[node].bbox else {
                continue;
            };

            let objects = self.nodes[node].take_objects();
            let (front, back) = split(objects, bbox.extent().largest_axis());

            // One side got everything, this node stays a leaf.
            if front.is_empty() || back.is_empty() {
                log::trace!(
                    "Reverted degenerate split of {} objects at level {level}",
                    front.len() + back.len()
                );
                let n = &mut self.nodes[node];
                for entry in front.into_iter().chain(back) {
                    n.push(entry);
                }
                continue;
            }

            let [first, second] = self.nodes.branch(node);
            for entry in front {
                self.nodes[first].push(entry);
            }
            for entry in back {
                self.nodes[second].push(entry);
            }

            pending.push((second, level + 1));
            pending.push((first, level + 1));
        }
    }

    /// Writes one line per node, indented by level, followed by the total
    /// object count. Without `verbose` only the total is written.
    pub fn debug_print<W: fmt::Write>(&self, verbose: bool, output: &mut W) -> fmt::Result {
        let mut count = 0;
        self.rdebug_print(self.root, 0, &mut count, verbose, output)?;
        if verbose {
            writeln!(output, "================")?;
        }
        writeln!(output, "TOTAL OBJECTS: {count}")
    }

    fn rdebug_print<W: fmt::Write>(
        &self,
        node: NodeId,
        level: usize,
        count: &mut usize,
        verbose: bool,
        output: &mut W,
    ) -> fmt::Result {
        let n = &self.nodes[node];
        let children = n.children();
        if verbose {
            write!(
                output,
                "{}objects: {}, child nodes: {}, aabb: ",
                "-".repeat(level),
                n.objects().len(),
                children.map_or(0, |c| c.len())
            )?;
            match n.bbox() {
                Some(bbox) => writeln!(output, "{bbox}")?,
                None => writeln!(output, "empty")?,
            }
        }

        *count += n.objects().len();

        for child in children.into_iter().flatten() {
            self.rdebug_print(child, level + 1, count, verbose, output)?;
        }
        Ok(())
    }
}

/// Splits objects around the average of their centers along `axis`.
///
/// Objects exactly on the average alternate between the sides, first one in front.
fn split<T, F: Float>(objects: Objects<T, F>, axis: Axis) -> (Objects<T, F>, Objects<T, F>) {
    let mut sum = F::zero();
    let mut count = F::zero();
    for entry in &objects {
        sum += entry.aabb.center()[axis];
        count += F::one();
    }
    let average = sum / count;

    let mut front = SmallVec::new();
    let mut back = SmallVec::new();
    let mut alternate = false;
    for entry in objects {
        let coord = entry.aabb.center()[axis];
        let to_front = if coord > average {
            true
        } else if coord < average {
            false
        } else {
            alternate = !alternate;
            alternate
        };

        if to_front {
            front.push(entry);
        } else {
            back.push(entry);
        }
    }
    (front, back)
}

impl<T, F: Float, const IDEAL: usize> FromIterator<(T, Aabb<F>)> for AabbTree<T, F, IDEAL> {
    fn from_iter<I: IntoIterator<Item = (T, Aabb<F>)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T, F: Float, const IDEAL: usize> Extend<(T, Aabb<F>)> for AabbTree<T, F, IDEAL> {
    fn extend<I: IntoIterator<Item = (T, Aabb<F>)>>(&mut self, iter: I) {
        for (object, aabb) in iter {
            self.add(object, aabb);
        }
    }
}
