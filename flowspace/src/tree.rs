// Copyright 2022 Oxide Computer Company

//! The augmented red-black tree underlying one flowspace layer.
//!
//! Nodes are keyed by the shared minimum of the intervals they hold; the
//! inner map carries the per-maximum payloads. Each node caches the
//! convex hull of every interval in its subtree, which is what makes
//! intersection queries prunable. Nodes live in an arena and refer to
//! one another by index, so parent and threaded successor links cannot
//! form ownership cycles.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use ip4::interval::{Interval, Metric};
use slog::{warn, Logger};

/// Index of a node in the arena. The all-ones value is the nil sentinel.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct NodeId(u32);

impl NodeId {
    pub const NIL: NodeId = NodeId(u32::MAX);

    pub fn is_nil(self) -> bool {
        self == Self::NIL
    }

    fn ix(self) -> usize {
        self.0 as usize
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::NIL
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Color {
    Red,
    Black,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Dir {
    Left,
    Right,
}

impl Dir {
    fn flip(self) -> Dir {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

struct Node<M: Metric, S> {
    /// The minimum shared by every interval stored at this node.
    metric: M,
    /// Payloads keyed by interval maxima.
    inner: BTreeMap<M, S>,
    /// Convex hull of every interval in the subtree rooted here.
    sti: Interval<M>,
    left: NodeId,
    right: NodeId,
    parent: NodeId,
    /// In-order successor, giving constant time forward traversal.
    next: NodeId,
    color: Color,
}

/// Outcome of a search for a metric value.
pub(crate) enum SearchResult {
    Found(NodeId),
    /// The last node visited and the direction the search would have
    /// continued. There is never a child in that direction. `NIL` for an
    /// empty tree.
    Miss(NodeId, Dir),
}

pub(crate) struct Tree<M: Metric, S> {
    nodes: Vec<Node<M, S>>,
    free: Vec<u32>,
    root: NodeId,
}

impl<M: Metric, S> Tree<M, S> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: NodeId::NIL,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_nil()
    }

    fn node(&self, n: NodeId) -> &Node<M, S> {
        &self.nodes[n.ix()]
    }

    fn node_mut(&mut self, n: NodeId) -> &mut Node<M, S> {
        &mut self.nodes[n.ix()]
    }

    pub fn metric(&self, n: NodeId) -> M {
        self.node(n).metric
    }

    pub fn inner(&self, n: NodeId) -> &BTreeMap<M, S> {
        &self.node(n).inner
    }

    pub fn inner_mut(&mut self, n: NodeId) -> &mut BTreeMap<M, S> {
        &mut self.node_mut(n).inner
    }

    pub fn next(&self, n: NodeId) -> NodeId {
        self.node(n).next
    }

    fn left(&self, n: NodeId) -> NodeId {
        self.node(n).left
    }

    fn right(&self, n: NodeId) -> NodeId {
        self.node(n).right
    }

    fn parent(&self, n: NodeId) -> NodeId {
        self.node(n).parent
    }

    fn child(&self, n: NodeId, d: Dir) -> NodeId {
        match d {
            Dir::Left => self.node(n).left,
            Dir::Right => self.node(n).right,
        }
    }

    fn set_link(&mut self, n: NodeId, d: Dir, c: NodeId) {
        match d {
            Dir::Left => self.node_mut(n).left = c,
            Dir::Right => self.node_mut(n).right = c,
        }
        if !c.is_nil() {
            self.node_mut(c).parent = n;
        }
    }

    /// Nil nodes count as black.
    fn color_of(&self, n: NodeId) -> Color {
        if n.is_nil() {
            Color::Black
        } else {
            self.node(n).color
        }
    }

    /// Hull of the intervals stored in the node itself. All intervals at
    /// a node share the minimum, so this is the minimum paired with the
    /// last maximum in the inner map.
    pub fn local_hull(&self, n: NodeId) -> Interval<M> {
        let node = self.node(n);
        match node.inner.keys().next_back() {
            Some(hi) => Interval::new(node.metric, *hi),
            None => Interval::point(node.metric),
        }
    }

    pub fn subtree_hull(&self, n: NodeId) -> Interval<M> {
        self.node(n).sti
    }

    /// Recompute the cached subtree hull of `n` from its local hull and
    /// its children's cached hulls.
    fn structure_fixup(&mut self, n: NodeId) {
        let mut sti = self.local_hull(n);
        let l = self.left(n);
        if !l.is_nil() {
            sti = sti.hull(&self.node(l).sti);
        }
        let r = self.right(n);
        if !r.is_nil() {
            sti = sti.hull(&self.node(r).sti);
        }
        self.node_mut(n).sti = sti;
    }

    /// Recompute hulls from `n` up to the root. Must run after any
    /// change to a node's maxima or to the shape of its subtree.
    pub fn ripple_fixup(&mut self, mut n: NodeId) {
        while !n.is_nil() {
            self.structure_fixup(n);
            n = self.parent(n);
        }
    }

    pub fn search(&self, m: M) -> SearchResult {
        let mut n = self.root;
        if n.is_nil() {
            return SearchResult::Miss(NodeId::NIL, Dir::Left);
        }
        loop {
            let at = self.metric(n);
            let d = if m > at {
                Dir::Right
            } else if m < at {
                Dir::Left
            } else {
                return SearchResult::Found(n);
            };
            let c = self.child(n, d);
            if c.is_nil() {
                return SearchResult::Miss(n, d);
            }
            n = c;
        }
    }

    /// The leftmost node, i.e. the head of the threaded list.
    pub fn first(&self) -> NodeId {
        let mut n = self.root;
        if n.is_nil() {
            return n;
        }
        loop {
            let l = self.left(n);
            if l.is_nil() {
                return n;
            }
            n = l;
        }
    }

    pub fn rightmost_descendant(&self, mut n: NodeId) -> NodeId {
        loop {
            let r = self.right(n);
            if r.is_nil() {
                return n;
            }
            n = r;
        }
    }

    /// The in-order predecessor, found structurally in `O(log n)`.
    fn prev(&self, n: NodeId) -> NodeId {
        let l = self.left(n);
        if !l.is_nil() {
            return self.rightmost_descendant(l);
        }
        let mut c = n;
        let mut p = self.parent(n);
        while !p.is_nil() && self.right(p) != c {
            c = p;
            p = self.parent(p);
        }
        p
    }

    fn alloc(&mut self, metric: M, key: M, value: S) -> NodeId {
        let node = Node {
            metric,
            inner: BTreeMap::from([(key, value)]),
            sti: Interval::new(metric, key),
            left: NodeId::NIL,
            right: NodeId::NIL,
            parent: NodeId::NIL,
            next: NodeId::NIL,
            color: Color::Red,
        };
        match self.free.pop() {
            Some(at) => {
                self.nodes[at as usize] = node;
                NodeId(at)
            }
            None => {
                self.nodes.push(node);
                NodeId(self.nodes.len() as u32 - 1)
            }
        }
    }

    fn release(&mut self, n: NodeId) {
        self.node_mut(n).inner.clear();
        self.free.push(n.0);
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Create a node for `metric` holding `(key, value)` and link it as
    /// the `d` child of `parent`, splicing the threaded list and
    /// rebalancing. `parent` is `NIL` only when the tree is empty.
    pub fn insert_node(
        &mut self,
        parent: NodeId,
        d: Dir,
        metric: M,
        key: M,
        value: S,
    ) -> NodeId {
        let n = self.alloc(metric, key, value);
        if parent.is_nil() {
            self.root = n;
            self.node_mut(n).color = Color::Black;
            return n;
        }

        // Splice the threaded list. New nodes always enter at a leaf
        // position, so the neighbors are found among the ancestors.
        match d {
            Dir::Right => {
                // the parent is the in-order predecessor
                let after = self.node(parent).next;
                self.node_mut(n).next = after;
                self.node_mut(parent).next = n;
            }
            Dir::Left => {
                // the parent is the successor; the predecessor is the
                // nearest ancestor currently threaded to the parent
                self.node_mut(n).next = parent;
                let mut a = self.parent(parent);
                while !a.is_nil() && self.node(a).next != parent {
                    a = self.parent(a);
                }
                if !a.is_nil() {
                    self.node_mut(a).next = n;
                }
            }
        }

        self.set_link(parent, d, n);
        self.rebalance_insert(n);
        self.ripple_fixup(n);
        n
    }

    fn rebalance_insert(&mut self, mut x: NodeId) {
        loop {
            let p = self.parent(x);
            if p.is_nil() || self.node(p).color == Color::Black {
                break;
            }
            let g = self.parent(p);
            if g.is_nil() {
                break;
            }
            let pd = if self.left(g) == p { Dir::Left } else { Dir::Right };
            let uncle = self.child(g, pd.flip());
            if self.color_of(uncle) == Color::Red {
                self.node_mut(p).color = Color::Black;
                self.node_mut(uncle).color = Color::Black;
                self.node_mut(g).color = Color::Red;
                x = g;
            } else {
                if self.child(p, pd.flip()) == x {
                    x = p;
                    self.rotate(x, pd);
                }
                let p2 = self.parent(x);
                let g2 = self.parent(p2);
                self.node_mut(p2).color = Color::Black;
                self.node_mut(g2).color = Color::Red;
                self.rotate(g2, pd.flip());
            }
        }
        let root = self.root;
        self.node_mut(root).color = Color::Black;
    }

    /// Rotate `n` into the position of its `d` child; the child in the
    /// other direction becomes the subtree root. Hulls are recomputed
    /// for the demoted node first, then its replacement.
    fn rotate(&mut self, n: NodeId, d: Dir) {
        let other = d.flip();
        let c = self.child(n, other);
        if c.is_nil() {
            return;
        }
        let p = self.parent(n);
        let pd = if p.is_nil() {
            None
        } else if self.left(p) == n {
            Some(Dir::Left)
        } else {
            Some(Dir::Right)
        };

        let grand = self.child(c, d);
        self.set_link(n, other, grand);
        self.set_link(c, d, n);
        self.node_mut(c).parent = p;
        match pd {
            Some(dir) => match dir {
                Dir::Left => self.node_mut(p).left = c,
                Dir::Right => self.node_mut(p).right = c,
            },
            None => self.root = c,
        }

        self.structure_fixup(n);
        self.structure_fixup(c);
    }

    /// Unlink `z` from the tree and the threaded list, rebalance, and
    /// recycle its slot.
    pub fn remove_node(&mut self, z: NodeId) {
        // retarget the predecessor's thread first, while the structure
        // still reflects the in-order order
        let before = self.prev(z);
        let after = self.node(z).next;
        if !before.is_nil() {
            self.node_mut(before).next = after;
        }

        let zl = self.left(z);
        let zr = self.right(z);
        let mut removed_color = self.node(z).color;
        let x;
        let x_parent;

        if zl.is_nil() || zr.is_nil() {
            x = if zl.is_nil() { zr } else { zl };
            x_parent = self.parent(z);
            self.transplant(z, x);
        } else {
            // with two children the successor is the threaded next node,
            // and it has no left child
            let y = after;
            removed_color = self.node(y).color;
            x = self.right(y);
            if self.parent(y) == z {
                x_parent = y;
            } else {
                x_parent = self.parent(y);
                self.transplant(y, x);
                let r = self.right(z);
                self.node_mut(y).right = r;
                self.node_mut(r).parent = y;
            }
            self.transplant(z, y);
            self.node_mut(y).left = zl;
            self.node_mut(zl).parent = y;
            self.node_mut(y).color = self.node(z).color;
        }

        if removed_color == Color::Black {
            self.rebalance_remove(x, x_parent);
        }

        let start = if x.is_nil() { x_parent } else { x };
        if !start.is_nil() {
            self.ripple_fixup(start);
        }
        if !self.root.is_nil() {
            let root = self.root;
            self.node_mut(root).color = Color::Black;
        }
        self.release(z);
    }

    /// Replace the subtree rooted at `u` with the one rooted at `v`.
    fn transplant(&mut self, u: NodeId, v: NodeId) {
        let p = self.parent(u);
        if p.is_nil() {
            self.root = v;
        } else if self.left(p) == u {
            self.node_mut(p).left = v;
        } else {
            self.node_mut(p).right = v;
        }
        if !v.is_nil() {
            self.node_mut(v).parent = p;
        }
    }

    /// Restore the red-black invariants after removing a black node.
    /// `x` is the child promoted into the removed position, possibly
    /// nil; `p` is its parent.
    fn rebalance_remove(&mut self, mut x: NodeId, mut p: NodeId) {
        while x != self.root && self.color_of(x) == Color::Black {
            if p.is_nil() {
                break;
            }
            let d = if self.left(p) == x { Dir::Left } else { Dir::Right };
            let mut w = self.child(p, d.flip());
            if self.color_of(w) == Color::Red {
                self.node_mut(w).color = Color::Black;
                self.node_mut(p).color = Color::Red;
                self.rotate(p, d);
                w = self.child(p, d.flip());
            }
            if self.color_of(self.child(w, Dir::Left)) == Color::Black
                && self.color_of(self.child(w, Dir::Right)) == Color::Black
            {
                self.node_mut(w).color = Color::Red;
                x = p;
                p = self.parent(x);
            } else {
                if self.color_of(self.child(w, d.flip())) == Color::Black {
                    let near = self.child(w, d);
                    if !near.is_nil() {
                        self.node_mut(near).color = Color::Black;
                    }
                    self.rotate(w, d.flip());
                    self.node_mut(w).color = Color::Red;
                    w = self.child(p, d.flip());
                }
                self.node_mut(w).color = self.node(p).color;
                self.node_mut(p).color = Color::Black;
                let far = self.child(w, d.flip());
                if !far.is_nil() {
                    self.node_mut(far).color = Color::Black;
                }
                self.rotate(p, d);
                x = self.root;
                p = NodeId::NIL;
            }
        }
        if !x.is_nil() {
            self.node_mut(x).color = Color::Black;
        }
    }

    /// The leftmost node whose local hull intersects `q`, found with
    /// subtree-hull pruning, or `NIL` if nothing intersects.
    pub fn find_intersecting(&self, q: &Interval<M>) -> NodeId {
        let mut candidate = NodeId::NIL;
        let mut n = self.root;
        while !n.is_nil() {
            if self.local_hull(n).has_intersection(q) {
                // Best so far; any better candidate can only be in the
                // left subtree. This also bounds the backtrack: reaching
                // this node again means it is the answer.
                candidate = n;
                n = self.left(n);
            } else if self.subtree_hull(n).has_intersection(q) {
                // The node itself misses but a descendant may not. Try
                // left first; the right subtree is covered by the
                // backtrack.
                let l = self.left(n);
                n = if l.is_nil() { self.right(n) } else { l };
            } else {
                // Nothing below; ascend until we hit the candidate, find
                // an unexplored right subtree, or fall off the root.
                loop {
                    let from = n;
                    n = self.parent(n);
                    if n == candidate {
                        return n;
                    }
                    let r = self.right(n);
                    if !r.is_nil() && from != r {
                        n = r;
                        break;
                    }
                }
            }
        }
        candidate
    }

    /// Advance along the threaded list from `n` to the next node whose
    /// local hull intersects `q`, skipping whole subtrees whose cached
    /// hull misses and stopping for good once the minima pass `q`.
    pub fn scan_from(&self, mut n: NodeId, q: &Interval<M>) -> NodeId {
        n = self.next(n);
        while !n.is_nil() && !self.local_hull(n).has_intersection(q) {
            if self.metric(n) > q.max() {
                // every later node has a still larger minimum
                return NodeId::NIL;
            }
            if !self.subtree_hull(n).has_intersection(q) {
                // in-order traversal has already covered the left
                // subtree, so the whole remaining subtree is skippable
                n = self.rightmost_descendant(n);
            }
            n = self.next(n);
        }
        n
    }

    /// Check every invariant: ordering, coloring, equal black heights,
    /// hull caches, and the threaded list. Problems are logged. Returns
    /// the black height of the tree, 0 on failure.
    pub fn validate(&self, log: &Logger) -> usize {
        if self.root.is_nil() {
            return 1;
        }
        if self.node(self.root).color == Color::Red {
            warn!(log, "red root");
            return 0;
        }
        let bh = self.validate_at(self.root, log);
        if bh == 0 {
            return 0;
        }

        // the threaded list must enumerate every node in metric order
        let mut seen = 0;
        let mut n = self.first();
        let mut last: Option<M> = None;
        while !n.is_nil() {
            let m = self.metric(n);
            if let Some(prev) = last {
                if prev >= m {
                    warn!(log, "threaded list out of order";
                        "at" => ?m, "after" => ?prev);
                    return 0;
                }
            }
            last = Some(m);
            seen += 1;
            n = self.next(n);
        }
        if seen != self.node_count() {
            warn!(log, "threaded list misses nodes";
                "seen" => seen, "nodes" => self.node_count());
            return 0;
        }
        bh
    }

    fn validate_at(&self, n: NodeId, log: &Logger) -> usize {
        let l = self.left(n);
        let r = self.right(n);

        if self.node(n).color == Color::Red
            && (self.color_of(l) == Color::Red
                || self.color_of(r) == Color::Red)
        {
            warn!(log, "red node with red child"; "metric" => ?self.metric(n));
            return 0;
        }
        if !l.is_nil() && self.metric(l) >= self.metric(n) {
            warn!(log, "left child out of order"; "metric" => ?self.metric(n));
            return 0;
        }
        if !r.is_nil() && self.metric(r) <= self.metric(n) {
            warn!(log, "right child out of order"; "metric" => ?self.metric(n));
            return 0;
        }

        let lh = if l.is_nil() {
            1
        } else {
            self.validate_at(l, log)
        };
        if lh == 0 {
            return 0;
        }
        let rh = if r.is_nil() {
            1
        } else {
            self.validate_at(r, log)
        };
        if rh == 0 {
            return 0;
        }
        if lh != rh {
            warn!(log, "black height mismatch";
                "metric" => ?self.metric(n), "left" => lh, "right" => rh);
            return 0;
        }

        let mut sti = self.local_hull(n);
        if !l.is_nil() {
            sti = sti.hull(&self.node(l).sti);
        }
        if !r.is_nil() {
            sti = sti.hull(&self.node(r).sti);
        }
        if sti != self.node(n).sti {
            warn!(log, "cached subtree hull mismatch";
                "metric" => ?self.metric(n),
                "cached" => ?self.node(n).sti,
                "actual" => ?sti);
            return 0;
        }

        lh + usize::from(self.node(n).color == Color::Black)
    }

    /// Render the tree shape for diagnostics.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        if !self.root.is_nil() {
            self.dump_at(self.root, 0, &mut out);
        }
        out
    }

    fn dump_at(&self, n: NodeId, level: usize, out: &mut String) {
        let node = self.node(n);
        let color = match node.color {
            Color::Red => "RED  ",
            Color::Black => "BLACK",
        };
        writeln!(
            out,
            "{}Key={:?} {} sti={:?} maxima={}",
            "  ".repeat(level),
            node.metric,
            color,
            node.sti,
            node.inner.len(),
        )
        .unwrap();
        if !node.left.is_nil() {
            self.dump_at(node.left, level + 1, out);
        }
        if !node.right.is_nil() {
            self.dump_at(node.right, level + 1, out);
        }
    }
}

impl<M: Metric, S> Default for Tree<M, S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slog::{o, Drain};
    use std::env;

    fn test_logger() -> Logger {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "warn");
        }
        let decorator = slog_term::TermDecorator::new().build();
        let drain = slog_term::FullFormat::new(decorator).build().fuse();
        let drain = slog_envlogger::new(drain).fuse();
        Logger::root(std::sync::Mutex::new(drain).fuse(), o!())
    }

    /// Insert an interval the way a leaf layer would.
    fn add(tree: &mut Tree<u32, Vec<u32>>, lo: u32, hi: u32, v: u32) {
        match tree.search(lo) {
            SearchResult::Found(n) => {
                tree.inner_mut(n).entry(hi).or_default().push(v);
                tree.ripple_fixup(n);
            }
            SearchResult::Miss(p, d) => {
                tree.insert_node(p, d, lo, hi, vec![v]);
            }
        }
    }

    fn drop_metric(tree: &mut Tree<u32, Vec<u32>>, lo: u32) {
        let SearchResult::Found(n) = tree.search(lo) else {
            panic!("no node for {}", lo);
        };
        tree.remove_node(n);
    }

    #[test]
    fn insertion_keeps_invariants() {
        let log = test_logger();
        let mut tree = Tree::new();
        for (at, lo) in
            [50u32, 20, 80, 10, 30, 70, 90, 5, 15, 25, 35].iter().enumerate()
        {
            add(&mut tree, *lo, lo + 5, at as u32);
            assert!(tree.validate(&log) > 0, "after {}:\n{}", lo, tree.dump());
        }
        assert_eq!(tree.node_count(), 11);
    }

    #[test]
    fn ascending_and_descending_insertion() {
        let log = test_logger();
        let mut tree = Tree::new();
        for lo in 0..64u32 {
            add(&mut tree, lo * 10, lo * 10 + 5, lo);
        }
        assert!(tree.validate(&log) > 0, "{}", tree.dump());

        let mut tree = Tree::new();
        for lo in (0..64u32).rev() {
            add(&mut tree, lo * 10, lo * 10 + 5, lo);
        }
        assert!(tree.validate(&log) > 0, "{}", tree.dump());
    }

    #[test]
    fn threaded_list_is_in_order() {
        let mut tree = Tree::new();
        for lo in [50u32, 20, 80, 10, 30, 70, 90] {
            add(&mut tree, lo, lo + 1, 0);
        }
        let mut order = Vec::new();
        let mut n = tree.first();
        while !n.is_nil() {
            order.push(tree.metric(n));
            n = tree.next(n);
        }
        assert_eq!(order, vec![10, 20, 30, 50, 70, 80, 90]);
    }

    #[test]
    fn removal_keeps_invariants() {
        let log = test_logger();
        let mut tree = Tree::new();
        let metrics: Vec<u32> = (0..32).map(|i| i * 3).collect();
        for (at, lo) in metrics.iter().enumerate() {
            add(&mut tree, *lo, lo + 2, at as u32);
        }
        // remove in an order that exercises leaf, one-child and
        // two-child cases
        for lo in [0u32, 45, 93, 3, 48, 90, 24, 27, 30, 33] {
            drop_metric(&mut tree, lo);
            assert!(
                tree.validate(&log) > 0,
                "after removing {}:\n{}",
                lo,
                tree.dump()
            );
        }
        assert_eq!(tree.node_count(), 22);
    }

    #[test]
    fn remove_down_to_empty() {
        let log = test_logger();
        let mut tree = Tree::new();
        for lo in [5u32, 1, 9, 3, 7] {
            add(&mut tree, lo, lo, 0);
        }
        for lo in [5u32, 1, 9, 3, 7] {
            drop_metric(&mut tree, lo);
            assert!(tree.validate(&log) > 0);
        }
        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 0);
    }

    #[test]
    fn hulls_track_maxima() {
        let mut tree = Tree::new();
        add(&mut tree, 10, 100, 0);
        add(&mut tree, 20, 25, 1);
        add(&mut tree, 5, 8, 2);
        let root = tree.root;
        assert_eq!(tree.subtree_hull(root), Interval::new(5, 100));
        // shrinking the widest interval shrinks the hull
        let SearchResult::Found(n) = tree.search(10) else {
            panic!();
        };
        tree.inner_mut(n).remove(&100);
        tree.inner_mut(n).insert(12, vec![0]);
        tree.ripple_fixup(n);
        assert_eq!(tree.subtree_hull(tree.root), Interval::new(5, 25));
    }

    #[test]
    fn find_intersecting_returns_leftmost() {
        let mut tree = Tree::new();
        add(&mut tree, 10, 20, 0);
        add(&mut tree, 15, 40, 1);
        add(&mut tree, 30, 35, 2);
        add(&mut tree, 60, 70, 3);

        let q = Interval::new(18, 32);
        let n = tree.find_intersecting(&q);
        assert_eq!(tree.metric(n), 10);

        let q = Interval::new(33, 34);
        let n = tree.find_intersecting(&q);
        assert_eq!(tree.metric(n), 15);

        let q = Interval::new(45, 55);
        assert!(tree.find_intersecting(&q).is_nil());

        let q = Interval::new(0, 5);
        assert!(tree.find_intersecting(&q).is_nil());
    }

    #[test]
    fn scan_skips_and_terminates() {
        let mut tree = Tree::new();
        for lo in [10u32, 20, 30, 40, 50] {
            add(&mut tree, lo, lo + 5, 0);
        }
        let q = Interval::new(0, 35);
        let first = tree.find_intersecting(&q);
        assert_eq!(tree.metric(first), 10);
        let second = tree.scan_from(first, &q);
        assert_eq!(tree.metric(second), 20);
        let third = tree.scan_from(second, &q);
        assert_eq!(tree.metric(third), 30);
        // 40 starts past the query maximum
        assert!(tree.scan_from(third, &q).is_nil());
    }

    #[test]
    fn slot_reuse() {
        let mut tree = Tree::new();
        for lo in [1u32, 2, 3] {
            add(&mut tree, lo, lo, 0);
        }
        drop_metric(&mut tree, 2);
        let before = tree.nodes.len();
        add(&mut tree, 4, 4, 0);
        assert_eq!(tree.nodes.len(), before);
    }
}
