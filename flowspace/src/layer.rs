// Copyright 2022 Oxide Computer Company

//! Flowspace layers: one tree per dimension, nested through the payload
//! position.
//!
//! [`LeafLayer`] is the innermost dimension and holds client payloads in
//! a multimap (duplicate entries allowed). [`Layer`] wraps any other
//! space as a further dimension, holding one sub-space per distinct
//! interval maximum. Both implement [`Space`], which is what lets the
//! nesting recurse.
//!
//! Iteration works through cursors: per level, the current node and the
//! current position in its inner map, plus (above the leaf) a cursor
//! into the nested space. Cursors are plain positions, not borrows; any
//! mutation of a layer invalidates every outstanding cursor and iterator
//! into it. An exhausted cursor equals the default cursor, which is the
//! `end` sentinel.

use std::ops::Bound;

use ip4::interval::{Interval, Metric};
use slog::Logger;

use crate::region::Region;
use crate::tree::{NodeId, SearchResult, Tree};

/// A set of `(region, payload)` entries supporting insertion, exact
/// lookup, intersection queries and cursor-based removal.
///
/// Queries visit, exactly once each, every stored entry whose region
/// intersects the query region, ordered lexicographically by
/// `(minimum, maximum, nested order)` per dimension.
pub trait Space: Default {
    /// The box type: one interval per dimension of this space.
    type Region: Region;

    /// The client payload type.
    type Value;

    /// Position of one entry. Cursors compare equal when they denote the
    /// same entry; all end cursors equal the default cursor.
    type Cursor: Clone + Default + PartialEq + std::fmt::Debug;

    /// Add an entry. Rejected (returning `false`) when any dimension of
    /// the region is empty.
    fn insert(&mut self, region: Self::Region, value: Self::Value) -> bool;

    /// Cursor to the first entry intersecting `query`, or the end
    /// cursor.
    fn begin(&self, query: &Self::Region) -> Self::Cursor;

    /// Cursor to the entry matching `region` and `value` exactly, or the
    /// end cursor.
    fn find(&self, region: &Self::Region, value: &Self::Value) -> Self::Cursor
    where
        Self::Value: PartialEq;

    /// Whether the cursor denotes an entry.
    fn is_valid(&self, cursor: &Self::Cursor) -> bool;

    /// Advance to the next entry intersecting `query`, or to end.
    fn advance(&self, cursor: &mut Self::Cursor, query: &Self::Region);

    /// The stored region at the cursor.
    fn region_of(&self, cursor: &Self::Cursor) -> Option<Self::Region>;

    /// The stored payload at the cursor.
    fn value_of(&self, cursor: &Self::Cursor) -> Option<&Self::Value>;

    /// Write access to the stored payload at the cursor.
    fn value_mut_of(
        &mut self,
        cursor: &Self::Cursor,
    ) -> Option<&mut Self::Value>;

    /// Remove the entry at the cursor, returning its payload. The cursor
    /// (and every other cursor into this space) is invalidated.
    fn erase(&mut self, cursor: &Self::Cursor) -> Option<Self::Value>;

    fn is_empty(&self) -> bool;

    /// Number of stored entries.
    fn len(&self) -> usize;

    /// Check the structural invariants of every tree in the space,
    /// logging any problems.
    fn validate(&self, log: &Logger) -> bool;

    /// Iterate entries whose regions intersect `query`.
    fn query(&self, query: Self::Region) -> Iter<'_, Self>
    where
        Self: Sized,
    {
        let cursor = self.begin(&query);
        Iter {
            space: self,
            query,
            cursor,
        }
    }

    /// Iterate every stored entry.
    fn iter_all(&self) -> Iter<'_, Self>
    where
        Self: Sized,
    {
        self.query(Self::Region::all())
    }
}

/// Iterator adapter over a space's cursor, yielding the stored region
/// and a reference to the stored payload.
pub struct Iter<'a, S: Space> {
    space: &'a S,
    query: S::Region,
    cursor: S::Cursor,
}

impl<'a, S: Space> Iterator for Iter<'a, S> {
    type Item = (S::Region, &'a S::Value);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.space.is_valid(&self.cursor) {
            return None;
        }
        let region = self.space.region_of(&self.cursor)?;
        let value = self.space.value_of(&self.cursor)?;
        self.space.advance(&mut self.cursor, &self.query);
        Some((region, value))
    }
}

/// Cursor into a leaf layer: the node, the maximum key within it, and
/// the index among duplicates at that key.
#[derive(Clone, PartialEq, Debug)]
pub struct LeafCursor<M> {
    node: NodeId,
    key: Option<M>,
    dup: usize,
}

impl<M> Default for LeafCursor<M> {
    fn default() -> Self {
        Self {
            node: NodeId::NIL,
            key: None,
            dup: 0,
        }
    }
}

/// The innermost dimension: a one-dimensional interval tree mapping
/// intervals to client payloads, duplicates allowed.
pub struct LeafLayer<M: Metric, V> {
    tree: Tree<M, Vec<V>>,
    count: usize,
}

impl<M: Metric, V> LeafLayer<M, V> {
    pub fn new() -> Self {
        Self {
            tree: Tree::new(),
            count: 0,
        }
    }

    /// Position at the first maximum in `n` not less than the query
    /// minimum. Every maximum from there on intersects the query, since
    /// the node's minimum was already checked against the query maximum.
    fn cursor_at(&self, n: NodeId, q: &Interval<M>) -> LeafCursor<M> {
        if n.is_nil() {
            return LeafCursor::default();
        }
        match self.tree.inner(n).range(Interval::min(q)..).next() {
            Some((key, _)) => LeafCursor {
                node: n,
                key: Some(*key),
                dup: 0,
            },
            None => {
                let n = self.tree.scan_from(n, q);
                self.cursor_at(n, q)
            }
        }
    }

    pub fn dump(&self) -> String {
        self.tree.dump()
    }
}

impl<M: Metric, V> Default for LeafLayer<M, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Metric, V> Space for LeafLayer<M, V> {
    type Region = (Interval<M>, ());
    type Value = V;
    type Cursor = LeafCursor<M>;

    fn insert(&mut self, region: Self::Region, value: V) -> bool {
        if !region.is_valid() {
            return false;
        }
        let iv = region.0;
        match self.tree.search(Interval::min(&iv)) {
            SearchResult::Found(n) => {
                self.tree
                    .inner_mut(n)
                    .entry(Interval::max(&iv))
                    .or_default()
                    .push(value);
                self.tree.ripple_fixup(n);
            }
            SearchResult::Miss(p, d) => {
                self.tree.insert_node(
                    p,
                    d,
                    Interval::min(&iv),
                    Interval::max(&iv),
                    vec![value],
                );
            }
        }
        self.count += 1;
        true
    }

    fn begin(&self, query: &Self::Region) -> Self::Cursor {
        if query.0.is_empty() {
            return LeafCursor::default();
        }
        let n = self.tree.find_intersecting(&query.0);
        self.cursor_at(n, &query.0)
    }

    fn find(&self, region: &Self::Region, value: &V) -> Self::Cursor
    where
        V: PartialEq,
    {
        if !region.is_valid() {
            return LeafCursor::default();
        }
        let iv = &region.0;
        let SearchResult::Found(n) = self.tree.search(iv.min()) else {
            return LeafCursor::default();
        };
        let Some(dups) = self.tree.inner(n).get(&iv.max()) else {
            return LeafCursor::default();
        };
        match dups.iter().position(|v| v == value) {
            Some(dup) => LeafCursor {
                node: n,
                key: Some(iv.max()),
                dup,
            },
            None => LeafCursor::default(),
        }
    }

    fn is_valid(&self, cursor: &Self::Cursor) -> bool {
        !cursor.node.is_nil()
    }

    fn advance(&self, cursor: &mut Self::Cursor, query: &Self::Region) {
        let Some(key) = cursor.key else {
            return;
        };
        if cursor.node.is_nil() {
            return;
        }
        let q = &query.0;

        // next duplicate under the same maximum
        let dups = self.tree.inner(cursor.node).get(&key).map_or(0, Vec::len);
        if cursor.dup + 1 < dups {
            cursor.dup += 1;
            return;
        }

        // next maximum within the node
        let after = self
            .tree
            .inner(cursor.node)
            .range((Bound::Excluded(key), Bound::Unbounded))
            .next()
            .map(|(k, _)| *k);
        if let Some(key) = after {
            cursor.key = Some(key);
            cursor.dup = 0;
            return;
        }

        // next intersecting node
        let n = self.tree.scan_from(cursor.node, q);
        *cursor = self.cursor_at(n, q);
    }

    fn region_of(&self, cursor: &Self::Cursor) -> Option<Self::Region> {
        if cursor.node.is_nil() {
            return None;
        }
        let key = cursor.key?;
        Some((Interval::new(self.tree.metric(cursor.node), key), ()))
    }

    fn value_of(&self, cursor: &Self::Cursor) -> Option<&V> {
        if cursor.node.is_nil() {
            return None;
        }
        let key = cursor.key?;
        self.tree.inner(cursor.node).get(&key)?.get(cursor.dup)
    }

    fn value_mut_of(&mut self, cursor: &Self::Cursor) -> Option<&mut V> {
        if cursor.node.is_nil() {
            return None;
        }
        let key = cursor.key?;
        self.tree
            .inner_mut(cursor.node)
            .get_mut(&key)?
            .get_mut(cursor.dup)
    }

    fn erase(&mut self, cursor: &Self::Cursor) -> Option<V> {
        if cursor.node.is_nil() {
            return None;
        }
        let key = cursor.key?;
        let dups = self.tree.inner_mut(cursor.node).get_mut(&key)?;
        if cursor.dup >= dups.len() {
            return None;
        }
        let value = dups.remove(cursor.dup);
        if dups.is_empty() {
            self.tree.inner_mut(cursor.node).remove(&key);
        }
        if self.tree.inner(cursor.node).is_empty() {
            self.tree.remove_node(cursor.node);
        } else {
            self.tree.ripple_fixup(cursor.node);
        }
        self.count -= 1;
        Some(value)
    }

    fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    fn len(&self) -> usize {
        self.count
    }

    fn validate(&self, log: &Logger) -> bool {
        self.tree.validate(log) > 0
    }
}

/// Cursor into an upper layer: the node, the maximum key selecting the
/// sub-space, and the cursor into that sub-space.
#[derive(Clone, PartialEq, Debug)]
pub struct UpperCursor<M, C> {
    node: NodeId,
    key: Option<M>,
    lower: C,
}

impl<M, C: Default> Default for UpperCursor<M, C> {
    fn default() -> Self {
        Self {
            node: NodeId::NIL,
            key: None,
            lower: C::default(),
        }
    }
}

/// An upper dimension: a one-dimensional interval tree whose payloads
/// are nested spaces, one per distinct interval maximum.
pub struct Layer<M: Metric, S: Space> {
    tree: Tree<M, S>,
    count: usize,
}

impl<M: Metric, S: Space> Layer<M, S> {
    pub fn new() -> Self {
        Self {
            tree: Tree::new(),
            count: 0,
        }
    }

    pub fn dump(&self) -> String {
        self.tree.dump()
    }

    /// Establish a cursor at node `n`: inner position at the first
    /// maximum not below the query minimum, sub-cursor built from the
    /// query tail, then rolled forward to the first fully valid entry.
    fn fill(
        &self,
        n: NodeId,
        query: &<Self as Space>::Region,
    ) -> UpperCursor<M, S::Cursor> {
        if n.is_nil() {
            return UpperCursor::default();
        }
        let mut cursor = match self.tree.inner(n).range(query.0.min()..).next()
        {
            Some((key, sub)) => UpperCursor {
                node: n,
                key: Some(*key),
                lower: sub.begin(&query.1),
            },
            None => {
                let n = self.tree.scan_from(n, &query.0);
                return self.fill(n, query);
            }
        };
        self.validate_forward(&mut cursor, query);
        cursor
    }

    /// Move the cursor forward until its sub-cursor is valid, advancing
    /// the inner position and then scanning to further nodes as needed.
    /// Leaves the cursor either fully valid or equal to end.
    fn validate_forward(
        &self,
        cursor: &mut UpperCursor<M, S::Cursor>,
        query: &<Self as Space>::Region,
    ) {
        while !cursor.node.is_nil() {
            let Some(key) = cursor.key else {
                *cursor = UpperCursor::default();
                return;
            };
            let lower_ok = self
                .tree
                .inner(cursor.node)
                .get(&key)
                .is_some_and(|sub| sub.is_valid(&cursor.lower));
            if lower_ok {
                return;
            }

            // Later maxima in this node are supersets of earlier ones in
            // this dimension, so walk to the end of the inner map before
            // giving up on the node.
            let after = self
                .tree
                .inner(cursor.node)
                .range((Bound::Excluded(key), Bound::Unbounded))
                .next();
            if let Some((key, sub)) = after {
                cursor.key = Some(*key);
                cursor.lower = sub.begin(&query.1);
                continue;
            }

            let n = self.tree.scan_from(cursor.node, &query.0);
            if n.is_nil() {
                *cursor = UpperCursor::default();
                return;
            }
            match self.tree.inner(n).range(query.0.min()..).next() {
                Some((key, sub)) => {
                    cursor.node = n;
                    cursor.key = Some(*key);
                    cursor.lower = sub.begin(&query.1);
                }
                None => {
                    *cursor = UpperCursor::default();
                    return;
                }
            }
        }
    }
}

impl<M: Metric, S: Space> Default for Layer<M, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Metric, S: Space> Space for Layer<M, S> {
    type Region = (Interval<M>, S::Region);
    type Value = S::Value;
    type Cursor = UpperCursor<M, S::Cursor>;

    fn insert(&mut self, region: Self::Region, value: Self::Value) -> bool {
        if !region.is_valid() {
            return false;
        }
        let (iv, tail) = region;
        match self.tree.search(iv.min()) {
            SearchResult::Found(n) => {
                self.tree
                    .inner_mut(n)
                    .entry(iv.max())
                    .or_default()
                    .insert(tail, value);
                self.tree.ripple_fixup(n);
            }
            SearchResult::Miss(p, d) => {
                let mut sub = S::default();
                sub.insert(tail, value);
                self.tree.insert_node(p, d, iv.min(), iv.max(), sub);
            }
        }
        self.count += 1;
        true
    }

    fn begin(&self, query: &Self::Region) -> Self::Cursor {
        if query.0.is_empty() {
            return UpperCursor::default();
        }
        let n = self.tree.find_intersecting(&query.0);
        self.fill(n, query)
    }

    fn find(&self, region: &Self::Region, value: &Self::Value) -> Self::Cursor
    where
        Self::Value: PartialEq,
    {
        if !region.is_valid() {
            return UpperCursor::default();
        }
        let iv = &region.0;
        let SearchResult::Found(n) = self.tree.search(iv.min()) else {
            return UpperCursor::default();
        };
        let Some(sub) = self.tree.inner(n).get(&iv.max()) else {
            return UpperCursor::default();
        };
        let lower = sub.find(&region.1, value);
        if sub.is_valid(&lower) {
            UpperCursor {
                node: n,
                key: Some(iv.max()),
                lower,
            }
        } else {
            UpperCursor::default()
        }
    }

    fn is_valid(&self, cursor: &Self::Cursor) -> bool {
        !cursor.node.is_nil()
    }

    fn advance(&self, cursor: &mut Self::Cursor, query: &Self::Region) {
        if cursor.node.is_nil() {
            return;
        }
        let Some(key) = cursor.key else {
            return;
        };
        if let Some(sub) = self.tree.inner(cursor.node).get(&key) {
            sub.advance(&mut cursor.lower, &query.1);
        }
        self.validate_forward(cursor, query);
    }

    fn region_of(&self, cursor: &Self::Cursor) -> Option<Self::Region> {
        if cursor.node.is_nil() {
            return None;
        }
        let key = cursor.key?;
        let sub = self.tree.inner(cursor.node).get(&key)?;
        let tail = sub.region_of(&cursor.lower)?;
        Some((Interval::new(self.tree.metric(cursor.node), key), tail))
    }

    fn value_of(&self, cursor: &Self::Cursor) -> Option<&Self::Value> {
        if cursor.node.is_nil() {
            return None;
        }
        let key = cursor.key?;
        self.tree
            .inner(cursor.node)
            .get(&key)?
            .value_of(&cursor.lower)
    }

    fn value_mut_of(
        &mut self,
        cursor: &Self::Cursor,
    ) -> Option<&mut Self::Value> {
        if cursor.node.is_nil() {
            return None;
        }
        let key = cursor.key?;
        self.tree
            .inner_mut(cursor.node)
            .get_mut(&key)?
            .value_mut_of(&cursor.lower)
    }

    fn erase(&mut self, cursor: &Self::Cursor) -> Option<Self::Value> {
        if cursor.node.is_nil() {
            return None;
        }
        let key = cursor.key?;
        let value = self
            .tree
            .inner_mut(cursor.node)
            .get_mut(&key)?
            .erase(&cursor.lower);
        if value.is_some() {
            let emptied = self
                .tree
                .inner(cursor.node)
                .get(&key)
                .is_some_and(Space::is_empty);
            if emptied {
                self.tree.inner_mut(cursor.node).remove(&key);
            }
            if self.tree.inner(cursor.node).is_empty() {
                self.tree.remove_node(cursor.node);
            } else {
                self.tree.ripple_fixup(cursor.node);
            }
            self.count -= 1;
        }
        value
    }

    fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    fn len(&self) -> usize {
        self.count
    }

    fn validate(&self, log: &Logger) -> bool {
        if self.tree.validate(log) == 0 {
            return false;
        }
        let mut n = self.tree.first();
        while !n.is_nil() {
            for sub in self.tree.inner(n).values() {
                if !sub.validate(log) {
                    return false;
                }
            }
            n = self.tree.next(n);
        }
        true
    }
}
