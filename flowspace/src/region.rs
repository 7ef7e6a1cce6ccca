// Copyright 2022 Oxide Computer Company

//! Regions: boxes in flowspace, as cons-style tuples of intervals.
//!
//! A region is either `()`, the zero-dimensional box, or a pair
//! `(Interval<M>, Tail)` where the tail is itself a region. Building
//! regions this way lets layers and regions recurse together: the head
//! interval belongs to the outermost layer, the tail to the space nested
//! inside it.

use ip4::interval::{Interval, Metric, Relation, RelationAccumulator};
use std::fmt;

/// An n-tuple of intervals specifying a box in flowspace.
pub trait Region: Clone + PartialEq + fmt::Debug {
    /// The region covering the entire space.
    fn all() -> Self;

    /// Whether every dimension is non-empty.
    fn is_valid(&self) -> bool;

    /// Fold this region's per-dimension relations into `acc`.
    fn fold_relation(&self, other: &Self, acc: &mut RelationAccumulator);

    /// Whether the two boxes share at least one point.
    fn intersects(&self, other: &Self) -> bool;

    /// The accumulated verdict over all dimensions.
    fn relationship(&self, other: &Self) -> Relation {
        let mut acc = RelationAccumulator::new();
        self.fold_relation(other, &mut acc);
        acc.result()
    }
}

impl Region for () {
    fn all() -> Self {}

    fn is_valid(&self) -> bool {
        true
    }

    fn fold_relation(&self, _other: &Self, _acc: &mut RelationAccumulator) {}

    fn intersects(&self, _other: &Self) -> bool {
        true
    }
}

impl<M: Metric, T: Region> Region for (Interval<M>, T) {
    fn all() -> Self {
        (Interval::all(), T::all())
    }

    fn is_valid(&self) -> bool {
        !self.0.is_empty() && self.1.is_valid()
    }

    fn fold_relation(&self, other: &Self, acc: &mut RelationAccumulator) {
        acc.fold(self.0.relationship(&other.0));
        self.1.fold_relation(&other.1, acc);
    }

    fn intersects(&self, other: &Self) -> bool {
        self.0.has_intersection(&other.0) && self.1.intersects(&other.1)
    }
}

/// Build a region from a flat list of intervals:
/// `region![a, b, c]` is `(a, (b, (c, ())))`.
#[macro_export]
macro_rules! region {
    () => { () };
    ($head:expr $(, $tail:expr)* $(,)?) => {
        ($head, $crate::region!($($tail),*))
    };
}
