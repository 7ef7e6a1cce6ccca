// Copyright 2022 Oxide Computer Company

//! N-dimensional interval sets for classifying flows.
//!
//! A flowspace stores `(region, payload)` entries, where a region is a
//! box: one closed interval per dimension. The central query is
//! intersection, iterating every stored entry whose region intersects a
//! query region, and it is answered without materializing any point
//! sets.
//!
//! Layers nest to form the dimensions. The innermost dimension is a
//! [`LeafLayer`] holding client payloads; each further dimension wraps
//! another space in a [`Layer`]. A two-dimensional space over addresses
//! and ports looks like:
//!
//! ```
//! use flowspace::{LeafLayer, Layer, Space};
//! use ip4::{Interval, Ip4Addr, IpPort};
//!
//! let mut space: Layer<Ip4Addr, LeafLayer<IpPort, &str>> = Layer::new();
//! space.insert(
//!     (
//!         "10.0.0.0/24".parse().unwrap(),
//!         (Interval::new(IpPort::new(80), IpPort::new(80)), ()),
//!     ),
//!     "web",
//! );
//! let query = (
//!     "10.0.0.200".parse().unwrap(),
//!     (Interval::point(IpPort::new(80)), ()),
//! );
//! let hits: Vec<&&str> = space.query(query).map(|(_, v)| v).collect();
//! assert_eq!(hits, ["web"].iter().collect::<Vec<_>>());
//! ```
//!
//! Regions are cons-style tuples, `(head interval, tail)` with `()` as
//! the terminator, so the region type composes the same way the layers
//! do. The [`region!`] macro builds one from a flat list of intervals.
//!
//! Each layer is an augmented red-black tree keyed on interval minima,
//! with payloads hung off an inner map of interval maxima and a cached
//! subtree hull used to prune intersection queries.

pub mod layer;
pub mod region;
mod tree;

pub use layer::{Iter, Layer, LeafLayer, Space};
pub use region::Region;
