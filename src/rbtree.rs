use std::{
    borrow::Borrow,
    cmp::{Ord, Ordering},
    collections::VecDeque,
    mem,
};

use log::{debug, trace};
use rand::Rng;

use crate::arena::{Arena, Color, Node, NodeId};
use crate::depth::Depth;
use crate::error::Error;

/// RbTree manage a single instance of in-memory index using
/// [red-black][rb] tree. Nodes live in an arena and carry a
/// parent link, so both fix-up passes walk upward in O(1) per step.
///
/// [rb]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree
#[derive(Clone)]
pub struct RbTree<K>
where
    K: Clone + Ord,
{
    name: String,
    arena: Arena<K>,
    root: Option<NodeId>,
    n_count: usize, // number of entries in the tree.
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    fn flip(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

enum Slot {
    Found(NodeId),
    // parent and side of the absent link, None for an empty tree.
    Vacant(Option<(NodeId, Side)>),
}

/// Different ways to construct a new RbTree instance.
impl<K> RbTree<K>
where
    K: Clone + Ord,
{
    /// Create an empty instance of RbTree, identified by `name`.
    /// Applications can choose unique names.
    pub fn new<S>(name: S) -> RbTree<K>
    where
        S: AsRef<str>,
    {
        RbTree {
            name: name.as_ref().to_string(),
            arena: Arena::new(),
            root: Default::default(),
            n_count: Default::default(),
        }
    }

    /// Create a new instance of RbTree and load it with keys from
    /// `iter`. Keys must be ``unique``, a repeated key fails the load.
    pub fn load_from<S, I>(name: S, iter: I) -> Result<RbTree<K>, Error<K>>
    where
        S: AsRef<str>,
        I: Iterator<Item = K>,
    {
        let mut tree = RbTree::new(name);
        for key in iter {
            tree.create(key)?;
        }
        Ok(tree)
    }
}

/// Maintenance API.
impl<K> RbTree<K>
where
    K: Clone + Ord,
{
    /// Identify this instance. Applications can choose unique names while
    /// creating RbTree instances.
    #[inline]
    pub fn id(&self) -> String {
        self.name.clone()
    }

    /// Return number of entries in this instance.
    #[inline]
    pub fn len(&self) -> usize {
        self.n_count
    }

    /// Check whether this index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_count == 0
    }

    /// Return quickly with basic statisics, only entries() and
    /// node_size() are valid with this statisics.
    pub fn stats(&self) -> Stats {
        Stats::new(self.n_count, mem::size_of::<Node<K>>())
    }

    /// Validate the tree with following rules:
    ///
    /// * Root is black.
    /// * From root to any leaf, no consecutive reds allowed in its path.
    /// * Number of blacks should be same under left child and right child.
    /// * Every child points back to its parent.
    /// * Keys are in sorted order.
    ///
    /// Additionally return full statistics on the tree. Refer to [`Stats`]
    /// for more information.
    pub fn validate(&self) -> Result<Stats, Error<K>> {
        if let Some(root) = self.root {
            let node = self.arena.node(root);
            if node.is_red() {
                return Err(Error::RedRoot);
            }
            if node.parent.is_some() {
                return Err(Error::BrokenLink("root has a parent".to_string()));
            }
        }

        let mut depths = Depth::new();
        let blacks = self.validate_tree(self.root, false, 0, 0, &mut depths)?;

        let mut prev: Option<&K> = None;
        for key in self.iter() {
            if let Some(prev) = prev {
                if prev.ge(key) {
                    return Err(Error::SortError(prev.clone(), key.clone()));
                }
            }
            prev = Some(key);
        }
        if self.arena.len() != self.n_count {
            let err = format!("{} nodes for {} entries", self.arena.len(), self.n_count);
            return Err(Error::BrokenLink(err));
        }

        let mut stats = Stats::new(self.n_count, mem::size_of::<Node<K>>());
        stats.set_blacks(blacks);
        stats.set_depths(depths);
        Ok(stats)
    }
}

/// Write operations on RbTree instance.
impl<K> RbTree<K>
where
    K: Clone + Ord,
{
    /// Insert key into the index. Inserting a key that is already
    /// present is silently ignored, use [`RbTree::create`] to detect it.
    pub fn insert(&mut self, key: K) {
        if self.create(key).is_err() {
            debug!("{}: duplicate key ignored", self.name);
        }
    }

    /// Create a new entry for key. If key is already present return
    /// error and leave the tree untouched.
    pub fn create(&mut self, key: K) -> Result<(), Error<K>> {
        let (parent, side) = match self.search_slot(&key) {
            Slot::Found(_) => return Err(Error::DuplicateKey),
            Slot::Vacant(None) => {
                self.root = Some(self.arena.alloc(key, Color::Black, None));
                self.n_count += 1;
                return Ok(());
            }
            Slot::Vacant(Some(slot)) => slot,
        };

        let node = self.arena.alloc(key, Color::Red, Some(parent));
        self.set_child(parent, side, Some(node));
        self.n_count += 1;
        self.insert_fixup(node);
        Ok(())
    }

    /// Remove the entry held by `node` and return its key. Return None
    /// if `node` does not refer to a live entry.
    ///
    /// Removal copies keys between nodes: after this call other handles
    /// may hold a different key or may have been destroyed, lookup again
    /// with [`RbTree::find`].
    pub fn remove(&mut self, node: NodeId) -> Option<K> {
        if !self.arena.is_live(node) {
            debug!("{}: remove on stale handle {:?}", self.name, node);
            return None;
        }
        let key = self.splice(node);
        self.n_count -= 1;
        Some(key)
    }
}

/// Read operations on RbTree instance.
impl<K> RbTree<K>
where
    K: Clone + Ord,
{
    /// Return the node holding key.
    pub fn find<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.search_slot(key) {
            Slot::Found(node) => Some(node),
            Slot::Vacant(_) => None,
        }
    }

    /// Check whether key is present in the index.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[inline]
    pub fn key(&self, node: NodeId) -> Option<&K> {
        self.arena.get(node).map(|n| &n.key)
    }

    #[inline]
    pub fn color(&self, node: NodeId) -> Option<Color> {
        self.arena.get(node).map(|n| n.color)
    }

    #[inline]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node).and_then(|n| n.parent)
    }

    #[inline]
    pub fn left(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node).and_then(|n| n.left)
    }

    #[inline]
    pub fn right(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node).and_then(|n| n.right)
    }

    /// Return the smallest key.
    pub fn min(&self) -> Option<&K> {
        self.root.map(|root| &self.arena.node(self.leftmost(root)).key)
    }

    /// Return the largest key.
    pub fn max(&self) -> Option<&K> {
        let mut node = self.root?;
        while let Some(right) = self.arena.node(node).right {
            node = right;
        }
        Some(&self.arena.node(node).key)
    }

    /// Return the number of nodes on the longest path from root to leaf.
    pub fn height(&self) -> usize {
        self.height_of(self.root)
    }

    /// Return the number of entries in the subtree rooted at `node`.
    pub fn subtree_len(&self, node: NodeId) -> usize {
        if !self.arena.is_live(node) {
            return 0;
        }
        let (mut count, mut stack) = (0, vec![node]);
        while let Some(id) = stack.pop() {
            count += 1;
            let node = self.arena.node(id);
            stack.extend(node.left.iter().chain(node.right.iter()));
        }
        count
    }

    /// Return a random entry from this index.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<K> {
        let mut id = self.root?;

        let mut at_depth = rng.gen::<u8>() % 40;
        loop {
            let node = self.arena.node(id);
            let next = match rng.gen::<u8>() % 2 {
                0 => node.left,
                _ => node.right,
            };
            match next {
                Some(next) if at_depth > 0 => {
                    at_depth -= 1;
                    id = next;
                }
                _ => break Some(node.key.clone()),
            }
        }
    }

    /// Return an iterator over all keys in ascending order.
    pub fn iter(&self) -> Iter<'_, K> {
        let mut iter = Iter {
            arena: &self.arena,
            stack: vec![],
        };
        iter.push_left(self.root);
        iter
    }

    /// Return an iterator over all keys, level by level from the root,
    /// along with their color.
    pub fn level_order(&self) -> LevelOrder<'_, K> {
        LevelOrder {
            arena: &self.arena,
            queue: self.root.into_iter().collect(),
        }
    }
}

impl<K> RbTree<K>
where
    K: Clone + Ord,
{
    fn search_slot<Q>(&self, key: &Q) -> Slot
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut slot = None;
        let mut next = self.root;
        while let Some(id) = next {
            let node = self.arena.node(id);
            let side = match node.key.borrow().cmp(key) {
                Ordering::Greater => Side::Left,
                Ordering::Less => Side::Right,
                Ordering::Equal => return Slot::Found(id),
            };
            slot = Some((id, side));
            next = self.child(id, side);
        }
        Slot::Vacant(slot)
    }

    fn leftmost(&self, mut node: NodeId) -> NodeId {
        while let Some(left) = self.arena.node(node).left {
            node = left;
        }
        node
    }

    fn height_of(&self, node: Option<NodeId>) -> usize {
        match node {
            None => 0,
            Some(id) => {
                let node = self.arena.node(id);
                1 + self.height_of(node.left).max(self.height_of(node.right))
            }
        }
    }

    #[inline]
    fn child(&self, node: NodeId, side: Side) -> Option<NodeId> {
        let node = self.arena.node(node);
        match side {
            Side::Left => node.left,
            Side::Right => node.right,
        }
    }

    // link child under node, and point child back to node.
    fn set_child(&mut self, node: NodeId, side: Side, child: Option<NodeId>) {
        let n = self.arena.node_mut(node);
        match side {
            Side::Left => n.left = child,
            Side::Right => n.right = child,
        }
        if let Some(child) = child {
            self.arena.node_mut(child).parent = Some(node);
        }
    }

    #[inline]
    fn side_in(&self, node: NodeId, parent: NodeId) -> Side {
        if self.arena.node(parent).left == Some(node) {
            Side::Left
        } else {
            Side::Right
        }
    }

    // make `new` take the place of `old` under old's parent, or as root.
    fn replace_in_parent(&mut self, old: NodeId, new: NodeId) {
        let parent = self.arena.node(old).parent;
        match parent {
            None => self.root = Some(new),
            Some(p) => {
                let side = self.side_in(old, p);
                self.set_child(p, side, Some(new));
            }
        }
        self.arena.node_mut(new).parent = parent;
    }

    #[inline]
    fn is_red(&self, node: Option<NodeId>) -> bool {
        node.map_or(false, |id| self.arena.node(id).is_red())
    }

    //--------- rotation routines ----------------

    //              (i)                       (i)
    //               |                         |
    //               x                         y
    //              / \                       / \
    //             /   \                     /   \
    //            /     \                   /     \
    //          xl       y                 x       yr
    //                  / \               / \
    //                yl   yr           xl   yl
    //
    pub(crate) fn rotate_left(&mut self, x: NodeId) -> NodeId {
        self.rotate_down(x, Side::Left)
    }

    //              (i)                       (i)
    //               |                         |
    //               x                         y
    //              / \                       / \
    //             /   \                     /   \
    //            /     \                   /     \
    //           y      xr                yl       x
    //          / \                               / \
    //        yl   yr                           yr   xr
    //
    pub(crate) fn rotate_right(&mut self, x: NodeId) -> NodeId {
        self.rotate_down(x, Side::Right)
    }

    #[inline]
    fn rotate(&mut self, x: NodeId, side: Side) -> NodeId {
        match side {
            Side::Left => self.rotate_left(x),
            Side::Right => self.rotate_right(x),
        }
    }

    // move `x` down towards `side`, its child from the other side takes
    // its place. Colors are left alone.
    fn rotate_down(&mut self, x: NodeId, side: Side) -> NodeId {
        let y = match self.child(x, side.flip()) {
            Some(y) => y,
            None => panic!("rotate_down(): {:?} rotation without a pivot, call the programmer", side),
        };
        let inner = self.child(y, side);
        self.replace_in_parent(x, y);
        self.set_child(x, side.flip(), inner);
        self.set_child(y, side, Some(x));
        y
    }

    //--------- balancing routines ----------------

    fn insert_fixup(&mut self, mut z: NodeId) {
        while let Some(mut parent) = self.arena.node(z).parent {
            if self.arena.node(parent).is_black() {
                break;
            }
            let grand = match self.arena.node(parent).parent {
                Some(grand) => grand,
                None => panic!("insert_fixup(): red root, call the programmer"),
            };
            let side = self.side_in(parent, grand);
            let uncle = self.child(grand, side.flip());

            if self.is_red(uncle) {
                trace!("{}: insert fixup, red uncle", self.name);
                self.arena.node_mut(parent).set_black();
                if let Some(uncle) = uncle {
                    self.arena.node_mut(uncle).set_black();
                }
                self.arena.node_mut(grand).set_red();
                z = grand;
                continue;
            }

            if self.side_in(z, parent) != side {
                trace!("{}: insert fixup, triangle", self.name);
                self.rotate(parent, side);
                mem::swap(&mut z, &mut parent);
            }

            trace!("{}: insert fixup, line", self.name);
            self.rotate(grand, side.flip());
            self.arena.node_mut(parent).set_black();
            self.arena.node_mut(grand).set_red();
            break;
        }

        if let Some(root) = self.root {
            self.arena.node_mut(root).set_black();
        }
    }

    // physically remove an entry from the tree, rebalance if a black
    // node went missing, return the removed key.
    fn splice(&mut self, node: NodeId) -> K {
        let (left, right, parent) = {
            let n = self.arena.node(node);
            (n.left, n.right, n.parent)
        };

        match (left, right) {
            (None, None) => {
                let side = parent.map(|p| (p, self.side_in(node, p)));
                match side {
                    Some((p, side)) => self.set_child(p, side, None),
                    None => self.root = None,
                }
                let removed = self.arena.free(node);
                if let (true, Some((p, side))) = (removed.is_black(), side) {
                    self.remove_fixup(Some(p), side);
                }
                removed.key
            }
            (Some(child), None) | (None, Some(child)) => {
                self.arena.swap_keys(node, child);
                let (cleft, cright) = {
                    let c = self.arena.node(child);
                    (c.left, c.right)
                };
                self.set_child(node, Side::Left, cleft);
                self.set_child(node, Side::Right, cright);
                let removed = self.arena.free(child);

                if self.arena.node(node).is_red() || removed.is_red() {
                    self.arena.node_mut(node).set_black();
                } else if let Some(p) = parent {
                    let side = self.side_in(node, p);
                    self.remove_fixup(Some(p), side);
                }
                removed.key
            }
            (Some(_), Some(right)) => {
                let successor = self.leftmost(right);
                self.arena.swap_keys(node, successor);
                self.splice(successor)
            }
        }
    }

    // resolve a double-black deficiency on the `side` child of `par`.
    fn remove_fixup(&mut self, mut par: Option<NodeId>, mut side: Side) {
        while let Some(p) = par {
            let sibling = match self.child(p, side.flip()) {
                Some(sibling) => sibling,
                None => panic!("remove_fixup(): missing sibling, call the programmer"),
            };

            if self.arena.node(sibling).is_red() {
                trace!("{}: remove fixup, red sibling", self.name);
                self.rotate(p, side);
                self.arena.node_mut(p).set_red();
                self.arena.node_mut(sibling).set_black();
                continue;
            }

            let far = self.child(sibling, side.flip());
            let near = self.child(sibling, side);
            let pcolor = self.arena.node(p).color;

            if let (true, Some(far)) = (self.is_red(far), far) {
                trace!("{}: remove fixup, red far nephew", self.name);
                self.rotate(p, side);
                self.arena.node_mut(sibling).color = pcolor;
                self.arena.node_mut(p).set_black();
                self.arena.node_mut(far).set_black();
                break;
            }

            if let (true, Some(near)) = (self.is_red(near), near) {
                trace!("{}: remove fixup, red near nephew", self.name);
                self.rotate(sibling, side.flip());
                self.rotate(p, side);
                self.arena.node_mut(near).color = pcolor;
                self.arena.node_mut(p).set_black();
                break;
            }

            self.arena.node_mut(sibling).set_red();
            if pcolor == Color::Red {
                trace!("{}: remove fixup, black nephews under red parent", self.name);
                self.arena.node_mut(p).set_black();
                break;
            }

            trace!("{}: remove fixup, black nephews, propagate", self.name);
            par = self.arena.node(p).parent;
            if let Some(grand) = par {
                side = self.side_in(p, grand);
            }
        }

        if let Some(root) = self.root {
            self.arena.node_mut(root).set_black();
        }
    }

    fn validate_tree(
        &self,
        node: Option<NodeId>,
        fromred: bool,
        mut nb: usize,
        depth: usize,
        depths: &mut Depth,
    ) -> Result<usize, Error<K>> {
        let id = match node {
            None => {
                depths.sample(depth);
                return Ok(nb);
            }
            Some(id) => id,
        };

        let node = self.arena.node(id);
        let red = node.is_red();
        if fromred && red {
            return Err(Error::ConsecutiveReds);
        }
        if !red {
            nb += 1;
        }
        for child in node.left.iter().chain(node.right.iter()) {
            if self.arena.node(*child).parent != Some(id) {
                let err = format!("child {:?} of {:?}", child, id);
                return Err(Error::BrokenLink(err));
            }
        }

        let lblacks = self.validate_tree(node.left, red, nb, depth + 1, depths)?;
        let rblacks = self.validate_tree(node.right, red, nb, depth + 1, depths)?;
        if lblacks != rblacks {
            let err = format!("left: {} right: {}", lblacks, rblacks);
            return Err(Error::UnbalancedBlacks(err));
        }
        Ok(lblacks)
    }
}

/// In-order iterator over [`RbTree`] keys.
pub struct Iter<'a, K> {
    arena: &'a Arena<K>,
    stack: Vec<NodeId>,
}

impl<'a, K> Iter<'a, K> {
    fn push_left(&mut self, mut node: Option<NodeId>) {
        while let Some(id) = node {
            self.stack.push(id);
            node = self.arena.node(id).left;
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let arena = self.arena;
        let node = arena.node(self.stack.pop()?);
        self.push_left(node.right);
        Some(&node.key)
    }
}

/// Breadth-first iterator over [`RbTree`] keys and colors.
pub struct LevelOrder<'a, K> {
    arena: &'a Arena<K>,
    queue: VecDeque<NodeId>,
}

impl<'a, K> Iterator for LevelOrder<'a, K> {
    type Item = (&'a K, Color);

    fn next(&mut self) -> Option<Self::Item> {
        let arena = self.arena;
        let node = arena.node(self.queue.pop_front()?);
        self.queue.extend(node.left.iter().chain(node.right.iter()));
        Some((&node.key, node.color))
    }
}

/// Statistics on [`RbTree`]. Serves two purpose:
///
/// * To get partial but quick statistics via [`RbTree::stats`] method.
/// * To get full statisics via [`RbTree::validate`] method.
#[derive(Default, Debug)]
pub struct Stats {
    entries: usize, // number of entries in the tree.
    node_size: usize,
    blacks: Option<usize>,
    depths: Option<Depth>,
}

impl Stats {
    fn new(entries: usize, node_size: usize) -> Stats {
        Stats {
            entries,
            node_size,
            blacks: Default::default(),
            depths: Default::default(),
        }
    }

    #[inline]
    fn set_blacks(&mut self, blacks: usize) {
        self.blacks = Some(blacks)
    }

    #[inline]
    fn set_depths(&mut self, depths: Depth) {
        self.depths = Some(depths)
    }

    /// Return number entries in [`RbTree`] instance.
    #[inline]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Return node-size, including over-head for `RbTree<K>`. Although
    /// the node overhead is constant, the node size varies based on
    /// key type. EG:
    ///
    /// ```
    /// use rb_index::RbTree;
    /// let tree: RbTree<u64> = RbTree::new("myinstance");
    ///
    /// // size of key: 8 bytes, overhead is color and three links.
    /// assert!(tree.stats().node_size() > 8);
    /// ```
    #[inline]
    pub fn node_size(&self) -> usize {
        self.node_size
    }

    /// Return number of black nodes from root to leaf, on both left
    /// and right child.
    #[inline]
    pub fn blacks(&self) -> Option<usize> {
        self.blacks
    }

    /// Return [`Depth`] statistics.
    pub fn depths(&self) -> Option<Depth> {
        match &self.depths {
            Some(depths) if depths.samples() > 0 => Some(depths.clone()),
            _ => None,
        }
    }
}
