use std::fmt;
use std::ops::RangeBounds;

use crate::error::{Error, Result};
use crate::policy::Monoid;
use crate::util::{check_index, normalize_range};

#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Id(u32);

impl Id {
    const NIL: Self = Self(u32::MAX);

    #[inline(always)]
    fn is_nil(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline(always)]
    fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct Node<V> {
    ch: [Id; 2],
    p: Id,
    size: u32,
    value: V,
    prod: V,
}

/// Owned handle to one tree of a [`SplayForest`].
///
/// A handle is only meaningful for the forest that produced it. Operations that restructure a
/// tree take the handle by `&mut` (its root changes) or by value (it is merged away). Dropping a
/// handle without [`SplayForest::release`] keeps its nodes allocated until the forest is dropped.
#[must_use]
#[derive(Debug, PartialEq, Eq)]
pub struct Tree {
    root: Id,
}

impl Tree {
    pub const fn empty() -> Self {
        Self { root: Id::NIL }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_nil()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::empty()
    }
}

/// Node pool for splay trees keyed by position.
///
/// Every tree stored here keeps its values in in-order position. There is no key comparison:
/// nodes are located by comparing the wanted rank with left subtree sizes. Each node also
/// caches the ordered aggregate of its subtree.
pub struct SplayForest<M: Monoid> {
    monoid: M,
    nodes: Vec<Node<M::Value>>,
    free: Vec<Id>,
}

impl<M: Monoid + Default> SplayForest<M> {
    pub fn new() -> Self {
        Self::with_monoid(M::default())
    }
}

impl<M: Monoid + Default> Default for SplayForest<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Monoid> SplayForest<M> {
    pub fn with_monoid(monoid: M) -> Self {
        Self::with_capacity(monoid, 0)
    }

    /// Reserves room for `capacity` nodes up front.
    pub fn with_capacity(monoid: M, capacity: usize) -> Self {
        Self {
            monoid,
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    pub fn monoid(&self) -> &M {
        &self.monoid
    }

    /// Number of nodes currently owned by some tree.
    pub fn live_nodes(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn singleton(&mut self, value: M::Value) -> Tree {
        Tree {
            root: self.alloc(value),
        }
    }

    /// Builds a balanced tree holding `values` in order, in O(n).
    pub fn build<I: IntoIterator<Item = M::Value>>(&mut self, values: I) -> Tree {
        let ids: Vec<Id> = values.into_iter().map(|value| self.alloc(value)).collect();
        let root = self.build_balanced(&ids);
        if !root.is_nil() {
            self.node_mut(root).p = Id::NIL;
        }
        log::trace!("splay forest: built tree of {} nodes", ids.len());
        Tree { root }
    }

    pub fn len(&self, tree: &Tree) -> usize {
        self.sz(tree.root)
    }

    pub fn get(&mut self, tree: &mut Tree, index: usize) -> Result<&M::Value> {
        check_index(index, self.sz(tree.root))?;
        tree.root = self.splay_at(tree.root, index);
        Ok(&self.node(tree.root).value)
    }

    pub fn set(&mut self, tree: &mut Tree, index: usize, value: M::Value) -> Result<()> {
        check_index(index, self.sz(tree.root))?;
        tree.root = self.splay_at(tree.root, index);
        self.node_mut(tree.root).value = value;
        self.update(tree.root);
        Ok(())
    }

    /// Inserts `value` so that it ends up at position `index`.
    pub fn insert(&mut self, tree: &mut Tree, index: usize, value: M::Value) -> Result<()> {
        let len = self.sz(tree.root);
        if index > len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        let node = self.alloc(value);
        let (left, right) = self.split_ids(tree.root, index);
        let left = self.merge_ids(left, node);
        tree.root = self.merge_ids(left, right);
        Ok(())
    }

    /// Appends `value` at the end of `tree`.
    pub fn push_back(&mut self, tree: &mut Tree, value: M::Value) {
        let node = self.alloc(value);
        tree.root = self.merge_ids(tree.root, node);
    }

    /// Inserts all of `other` so that its first element ends up at position `index`.
    ///
    /// On a bad `index`, `other` is handed back untouched alongside the error.
    pub fn insert_tree(
        &mut self,
        tree: &mut Tree,
        index: usize,
        other: Tree,
    ) -> Result<(), (Error, Tree)> {
        let len = self.sz(tree.root);
        if index > len {
            return Err((Error::IndexOutOfRange { index, len }, other));
        }
        let (left, right) = self.split_ids(tree.root, index);
        let left = self.merge_ids(left, other.root);
        tree.root = self.merge_ids(left, right);
        Ok(())
    }

    /// Detaches the node at `index` and hands it back as a single-node tree.
    pub fn erase(&mut self, tree: &mut Tree, index: usize) -> Result<Tree> {
        check_index(index, self.sz(tree.root))?;
        let x = self.splay_at(tree.root, index);
        let [left, right] = self.node(x).ch;
        if !left.is_nil() {
            self.node_mut(left).p = Id::NIL;
        }
        if !right.is_nil() {
            self.node_mut(right).p = Id::NIL;
        }
        self.node_mut(x).ch = [Id::NIL, Id::NIL];
        self.update(x);
        tree.root = self.merge_ids(left, right);
        Ok(Tree { root: x })
    }

    /// Removes the value at `index` and returns its node to the pool.
    pub fn remove(&mut self, tree: &mut Tree, index: usize) -> Result<M::Value> {
        let node = self.erase(tree, index)?;
        let identity = self.monoid.identity();
        let value = std::mem::replace(&mut self.node_mut(node.root).value, identity);
        self.free.push(node.root);
        Ok(value)
    }

    /// Concatenates `left` and `right`.
    pub fn merge(&mut self, left: Tree, right: Tree) -> Tree {
        Tree {
            root: self.merge_ids(left.root, right.root),
        }
    }

    /// Splits `tree` at `at`. `tree` keeps positions `[0, at)` and the rest is returned.
    pub fn split_off(&mut self, tree: &mut Tree, at: usize) -> Result<Tree> {
        let len = self.sz(tree.root);
        if at > len {
            return Err(Error::IndexOutOfRange { index: at, len });
        }
        let (left, right) = self.split_ids(tree.root, at);
        tree.root = left;
        Ok(Tree { root: right })
    }

    /// Folds `range` from left to right by cutting it out as its own subtree.
    pub fn prod<R: RangeBounds<usize>>(&mut self, tree: &mut Tree, range: R) -> Result<M::Value> {
        let (start, end) = normalize_range(range, self.sz(tree.root))?;
        if start == end {
            return Ok(self.monoid.identity());
        }
        let (left, rest) = self.split_ids(tree.root, start);
        let (mid, right) = self.split_ids(rest, end - start);
        let prod = self.node(mid).prod.clone();
        let left = self.merge_ids(left, mid);
        tree.root = self.merge_ids(left, right);
        Ok(prod)
    }

    pub fn all_prod(&self, tree: &Tree) -> M::Value {
        self.prod_of(tree.root)
    }

    /// Moves the value at `r` so that it ends up at position `l`. Either of `l` and `r` may be
    /// the larger one.
    pub fn shift(&mut self, tree: &mut Tree, l: usize, r: usize) -> Result<()> {
        let len = self.sz(tree.root);
        check_index(r, len)?;
        check_index(l, len)?;
        let node = self.erase(tree, r)?;
        let (left, right) = self.split_ids(tree.root, l);
        let left = self.merge_ids(left, node.root);
        tree.root = self.merge_ids(left, right);
        Ok(())
    }

    /// Rotates the window `range` left by `k` positions. Negative `k` rotates right.
    pub fn shift_by<R: RangeBounds<usize>>(&mut self, tree: &mut Tree, range: R, k: i64) -> Result<()> {
        let (start, end) = normalize_range(range, self.sz(tree.root))?;
        let width = end - start;
        if width == 0 {
            return Ok(());
        }
        let k = k.rem_euclid(width as i64) as usize;
        if k == 0 {
            return Ok(());
        }

        let (head, rest) = self.split_ids(tree.root, start);
        let (front, rest) = self.split_ids(rest, k);
        let (back, tail) = self.split_ids(rest, width - k);
        let root = self.merge_ids(head, back);
        let root = self.merge_ids(root, front);
        tree.root = self.merge_ids(root, tail);
        Ok(())
    }

    /// Returns every node of `tree` to the pool.
    pub fn release(&mut self, tree: Tree) {
        let mut stack = Vec::new();
        if !tree.root.is_nil() {
            stack.push(tree.root);
        }
        let identity = self.monoid.identity();
        while let Some(x) = stack.pop() {
            for c in self.node(x).ch {
                if !c.is_nil() {
                    stack.push(c);
                }
            }
            let node = self.node_mut(x);
            node.ch = [Id::NIL, Id::NIL];
            node.p = Id::NIL;
            node.value = identity.clone();
            node.prod = identity.clone();
            self.free.push(x);
        }
    }

    /// In-order iterator over the values of `tree`. Does not restructure the tree.
    pub fn iter<'a>(&'a self, tree: &Tree) -> Iter<'a, M> {
        let mut iter = Iter {
            forest: self,
            stack: Vec::new(),
        };
        iter.push_left_spine(tree.root);
        iter
    }

    /// Checks parent links, subtree sizes and cached aggregates of every node in `tree`.
    pub fn verify(&self, tree: &Tree) -> Result<()>
    where
        M::Value: PartialEq + fmt::Debug,
    {
        if tree.root.is_nil() {
            return Ok(());
        }
        if !self.node(tree.root).p.is_nil() {
            return Err(Error::StructuralInconsistency(format!(
                "root {} has a parent",
                tree.root.0
            )));
        }
        let mut stack = vec![tree.root];
        while let Some(x) = stack.pop() {
            let node = self.node(x);
            for c in node.ch {
                if c.is_nil() {
                    continue;
                }
                if self.node(c).p != x {
                    return Err(Error::StructuralInconsistency(format!(
                        "node {} is not linked back to parent {}",
                        c.0, x.0
                    )));
                }
                stack.push(c);
            }
            let [l, r] = node.ch;
            let size = 1 + self.sz(l) + self.sz(r);
            if node.size as usize != size {
                return Err(Error::StructuralInconsistency(format!(
                    "node {} has size {}, expected {size}",
                    x.0, node.size
                )));
            }
            let expected = self.monoid.combine(
                &self.monoid.combine(&self.prod_of(l), &node.value),
                &self.prod_of(r),
            );
            if node.prod != expected {
                return Err(Error::StructuralInconsistency(format!(
                    "node {} caches {:?}, expected {expected:?}",
                    x.0, node.prod
                )));
            }
        }
        Ok(())
    }

    fn alloc(&mut self, value: M::Value) -> Id {
        let node = Node {
            ch: [Id::NIL, Id::NIL],
            p: Id::NIL,
            size: 1,
            prod: value.clone(),
            value,
        };
        if let Some(x) = self.free.pop() {
            *self.node_mut(x) = node;
            x
        } else {
            assert!(self.nodes.len() < u32::MAX as usize, "splay forest is full");
            self.nodes.push(node);
            Id((self.nodes.len() - 1) as u32)
        }
    }

    fn build_balanced(&mut self, ids: &[Id]) -> Id {
        if ids.is_empty() {
            return Id::NIL;
        }
        let mid = ids.len() / 2;
        let x = ids[mid];
        let left = self.build_balanced(&ids[..mid]);
        let right = self.build_balanced(&ids[mid + 1..]);
        for (dir, c) in [left, right].into_iter().enumerate() {
            self.node_mut(x).ch[dir] = c;
            if !c.is_nil() {
                self.node_mut(c).p = x;
            }
        }
        self.update(x);
        x
    }

    #[inline(always)]
    fn node(&self, x: Id) -> &Node<M::Value> {
        debug_assert!(!x.is_nil());
        &self.nodes[x.idx()]
    }

    #[inline(always)]
    fn node_mut(&mut self, x: Id) -> &mut Node<M::Value> {
        debug_assert!(!x.is_nil());
        &mut self.nodes[x.idx()]
    }

    #[inline(always)]
    fn sz(&self, x: Id) -> usize {
        if x.is_nil() { 0 } else { self.node(x).size as usize }
    }

    #[inline(always)]
    fn prod_of(&self, x: Id) -> M::Value {
        if x.is_nil() {
            self.monoid.identity()
        } else {
            self.node(x).prod.clone()
        }
    }

    fn update(&mut self, x: Id) {
        let [l, r] = self.node(x).ch;
        let size = 1 + self.sz(l) + self.sz(r);
        let mut prod = self.node(x).value.clone();
        if !l.is_nil() {
            prod = self.monoid.combine(&self.node(l).prod, &prod);
        }
        if !r.is_nil() {
            prod = self.monoid.combine(&prod, &self.node(r).prod);
        }
        let nx = self.node_mut(x);
        nx.size = size as u32;
        nx.prod = prod;
    }

    fn rotate(&mut self, x: Id) {
        let p = self.node(x).p;
        let g = self.node(p).p;

        let dir = usize::from(self.node(p).ch[1] == x);
        let b = self.node(x).ch[dir ^ 1];

        if !g.is_nil() {
            let gdir = usize::from(self.node(g).ch[1] == p);
            self.node_mut(g).ch[gdir] = x;
        }
        self.node_mut(x).p = g;

        self.node_mut(x).ch[dir ^ 1] = p;
        self.node_mut(p).p = x;

        self.node_mut(p).ch[dir] = b;
        if !b.is_nil() {
            self.node_mut(b).p = p;
        }

        self.update(p);
        self.update(x);
    }

    fn splay(&mut self, x: Id) {
        loop {
            let p = self.node(x).p;
            if p.is_nil() {
                break;
            }
            let g = self.node(p).p;
            if !g.is_nil() {
                let zig_zig = (self.node(g).ch[0] == p) == (self.node(p).ch[0] == x);
                if zig_zig {
                    self.rotate(p);
                } else {
                    self.rotate(x);
                }
            }
            self.rotate(x);
        }
    }

    /// Walks down from `root` to the node of rank `index` and splays it. Returns the new root.
    fn splay_at(&mut self, root: Id, mut index: usize) -> Id {
        debug_assert!(index < self.sz(root));
        let mut x = root;
        loop {
            let [l, r] = self.node(x).ch;
            let left_size = self.sz(l);
            match index.cmp(&left_size) {
                std::cmp::Ordering::Less => x = l,
                std::cmp::Ordering::Equal => break,
                std::cmp::Ordering::Greater => {
                    index -= left_size + 1;
                    x = r;
                }
            }
        }
        self.splay(x);
        x
    }

    fn merge_ids(&mut self, left: Id, right: Id) -> Id {
        if left.is_nil() {
            return right;
        }
        if right.is_nil() {
            return left;
        }
        let last = self.sz(left) - 1;
        let root = self.splay_at(left, last);
        self.node_mut(root).ch[1] = right;
        self.node_mut(right).p = root;
        self.update(root);
        root
    }

    /// Splits into the first `left_count` nodes and the rest.
    fn split_ids(&mut self, root: Id, left_count: usize) -> (Id, Id) {
        if left_count == 0 {
            return (Id::NIL, root);
        }
        if left_count >= self.sz(root) {
            return (root, Id::NIL);
        }
        let root = self.splay_at(root, left_count);
        let left = self.node(root).ch[0];
        self.node_mut(root).ch[0] = Id::NIL;
        self.node_mut(left).p = Id::NIL;
        self.update(root);
        (left, root)
    }
}

impl<M> fmt::Debug for SplayForest<M>
where
    M: Monoid,
    M::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplayForest")
            .field("nodes", &self.nodes.len())
            .field("free", &self.free.len())
            .finish_non_exhaustive()
    }
}

/// In-order iterator returned by [`SplayForest::iter`].
pub struct Iter<'a, M: Monoid> {
    forest: &'a SplayForest<M>,
    stack: Vec<Id>,
}

impl<M: Monoid> Iter<'_, M> {
    fn push_left_spine(&mut self, mut x: Id) {
        while !x.is_nil() {
            self.stack.push(x);
            x = self.forest.node(x).ch[0];
        }
    }
}

impl<'a, M: Monoid> Iterator for Iter<'a, M> {
    type Item = &'a M::Value;

    fn next(&mut self) -> Option<Self::Item> {
        let x = self.stack.pop()?;
        let forest = self.forest;
        self.push_left_spine(forest.node(x).ch[1]);
        Some(&forest.node(x).value)
    }
}
