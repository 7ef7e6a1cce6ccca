// Copyright 2022 Oxide Computer Company

//! Sorted-sequence set facades over ranges, networks and addresses.

use std::fmt;
use std::ops;

use crate::addr::{Ip4Addr, Ip4Net, Ip4Pepa};
use crate::interval::{Interval, Metric};
use crate::range::Ip4Range;

/// A set of addresses stored as a sorted sequence of disjoint, coalesced
/// ranges.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct IpSet {
    ranges: Vec<Ip4Range>,
}

impl IpSet {
    pub fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of stored ranges (not addresses).
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn ranges(&self) -> &[Ip4Range] {
        &self.ranges
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ip4Range> {
        self.ranges.iter()
    }

    /// Indices `[i, j)` of the stored ranges that overlap or are
    /// adjacent to `range`, i.e. everything that must merge with it.
    fn merge_window(&self, range: &Ip4Range) -> (usize, usize) {
        let lo = Interval::min(range).pred().unwrap_or(Ip4Addr::MIN);
        let hi = Interval::max(range).succ().unwrap_or(Ip4Addr::MAX);
        let i = self.ranges.partition_point(|r| Interval::max(r) < lo);
        let j = i + self.ranges[i..]
            .partition_point(|r| Interval::min(r) <= hi);
        (i, j)
    }

    /// Add `range`, merging any overlapping or adjacent stored ranges.
    pub fn insert(&mut self, range: Ip4Range) {
        if range.is_empty() {
            return;
        }
        let (i, j) = self.merge_window(&range);
        let mut merged = range;
        if i < j {
            merged = merged
                .hull(&self.ranges[i])
                .hull(&self.ranges[j - 1]);
        }
        self.ranges.splice(i..j, [merged]);
    }

    pub fn insert_addr(&mut self, addr: Ip4Addr) {
        self.insert(Ip4Range::point(addr));
    }

    pub fn insert_set(&mut self, set: &IpSet) {
        for r in &set.ranges {
            self.insert(*r);
        }
    }

    /// Remove every address in `range`, splitting enclosing stored
    /// ranges into their complements.
    pub fn remove(&mut self, range: Ip4Range) {
        if range.is_empty() {
            return;
        }
        let i = self
            .ranges
            .partition_point(|r| Interval::max(r) < Interval::min(&range));
        let j = i
            + self.ranges[i..]
                .partition_point(|r| Interval::min(r) <= Interval::max(&range));
        if i == j {
            return;
        }
        let mut repl = Vec::with_capacity(2);
        let first = self.ranges[i];
        if Interval::min(&first) < Interval::min(&range) {
            if let Some(hi) = Interval::min(&range).pred() {
                repl.push(Ip4Range::new(Interval::min(&first), hi));
            }
        }
        let last = self.ranges[j - 1];
        if Interval::max(&last) > Interval::max(&range) {
            if let Some(lo) = Interval::max(&range).succ() {
                repl.push(Ip4Range::new(lo, Interval::max(&last)));
            }
        }
        self.ranges.splice(i..j, repl);
    }

    pub fn remove_addr(&mut self, addr: Ip4Addr) {
        self.remove(Ip4Range::point(addr));
    }

    pub fn remove_set(&mut self, set: &IpSet) {
        for r in &set.ranges {
            self.remove(*r);
        }
    }

    /// The per-range intersections of the stored ranges with `range`,
    /// collected into a new set.
    pub fn overlap(&self, range: &Ip4Range) -> IpSet {
        let mut out = IpSet::new();
        if range.is_empty() {
            return out;
        }
        let i = self
            .ranges
            .partition_point(|r| Interval::max(r) < Interval::min(range));
        for r in &self.ranges[i..] {
            if Interval::min(r) > Interval::max(range) {
                break;
            }
            out.insert(r.intersection(range));
        }
        out
    }

    pub fn overlap_set(&self, set: &IpSet) -> IpSet {
        let mut out = IpSet::new();
        for r in &set.ranges {
            out.insert_set(&self.overlap(r));
        }
        out
    }

    /// Whether some single stored range contains all of `range`.
    pub fn contains(&self, range: &Ip4Range) -> bool {
        if range.is_empty() {
            return false;
        }
        let i = self
            .ranges
            .partition_point(|r| Interval::max(r) < Interval::min(range));
        self.ranges
            .get(i)
            .is_some_and(|r| r.is_superset_of(range))
    }

    pub fn contains_addr(&self, addr: Ip4Addr) -> bool {
        self.contains(&Ip4Range::point(addr))
    }

    /// Whether some stored range equals `range` exactly.
    pub fn is_member(&self, range: &Ip4Range) -> bool {
        self.ranges.binary_search(range).is_ok()
    }
}

impl fmt::Debug for IpSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ranges.iter()).finish()
    }
}

impl FromIterator<Ip4Range> for IpSet {
    fn from_iter<I: IntoIterator<Item = Ip4Range>>(iter: I) -> Self {
        let mut set = IpSet::new();
        for r in iter {
            set.insert(r);
        }
        set
    }
}

/// An IP network and a collection of member addresses, every one of
/// which is compatible with the network (`addr & mask == net`).
#[derive(Clone, PartialEq, Eq)]
pub struct IpGroup {
    net: Ip4Net,
    addrs: Vec<Ip4Addr>,
}

impl IpGroup {
    pub fn new(net: Ip4Net) -> Self {
        Self {
            net,
            addrs: Vec::new(),
        }
    }

    pub fn net(&self) -> Ip4Net {
        self.net
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    /// Whether `addr` would fit in the group's network.
    pub fn is_compatible(&self, addr: Ip4Addr) -> bool {
        self.net.contains(addr)
    }

    /// Add an address. Rejected, with no state change, if the address is
    /// outside the group's network.
    pub fn insert(&mut self, addr: Ip4Addr) -> bool {
        if !self.is_compatible(addr) {
            return false;
        }
        self.addrs.push(addr);
        true
    }

    /// Remove an address. Rejected if the address is not present.
    pub fn remove(&mut self, addr: Ip4Addr) -> bool {
        match self.addrs.iter().position(|a| *a == addr) {
            Some(at) => {
                self.addrs.remove(at);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.addrs.clear();
    }

    pub fn contains(&self, addr: Ip4Addr) -> bool {
        self.addrs.contains(&addr)
    }

    pub fn addrs(&self) -> &[Ip4Addr] {
        &self.addrs
    }

    /// Iterate the members as PEPAs carrying the group's mask.
    pub fn pepas(&self) -> impl Iterator<Item = Ip4Pepa> + '_ {
        let mask = self.net.mask();
        self.addrs.iter().map(move |a| Ip4Pepa::new(*a, mask))
    }

    /// Whether this group's network is a strict subset of `that`'s.
    pub fn is_subset_of(&self, that: &IpGroup) -> bool {
        self.net.is_strict_subset_of(&that.net)
    }

    pub fn has_intersection(&self, that: &IpGroup) -> bool {
        self.net.has_intersection(&that.net)
    }
}

impl ops::Add for IpGroup {
    type Output = IpGroup;

    /// The left group with every compatible member of the right added.
    fn add(mut self, rhs: IpGroup) -> IpGroup {
        for addr in rhs.addrs {
            self.insert(addr);
        }
        self
    }
}

impl ops::Sub for IpGroup {
    type Output = IpGroup;

    fn sub(mut self, rhs: IpGroup) -> IpGroup {
        for addr in rhs.addrs {
            self.remove(addr);
        }
        self
    }
}

impl fmt::Debug for IpGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{:?}", self.net, self.addrs)
    }
}

/// A collection of groups whose enclosing networks are pairwise
/// disjoint.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct IpCluster {
    groups: Vec<IpGroup>,
}

impl IpCluster {
    pub fn new() -> Self {
        Self { groups: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[IpGroup] {
        &self.groups
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IpGroup> {
        self.groups.iter()
    }

    /// Add a group. Rejected if its network intersects any group already
    /// present.
    pub fn insert(&mut self, group: IpGroup) -> bool {
        if self.groups.iter().any(|g| g.has_intersection(&group)) {
            return false;
        }
        self.groups.push(group);
        true
    }

    /// Add an empty group for `net`.
    pub fn insert_net(&mut self, net: Ip4Net) -> bool {
        self.insert(IpGroup::new(net))
    }

    /// Add an address to the compatible group, if there is one.
    pub fn insert_addr(&mut self, addr: Ip4Addr) -> bool {
        match self.groups.iter_mut().find(|g| g.is_compatible(addr)) {
            Some(g) => g.insert(addr),
            None => false,
        }
    }

    /// Remove a group. Rejected if no equal group is present.
    pub fn remove(&mut self, group: &IpGroup) -> bool {
        match self.groups.iter().position(|g| g == group) {
            Some(at) => {
                self.groups.remove(at);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }

    pub fn contains(&self, group: &IpGroup) -> bool {
        self.groups.iter().any(|g| g == group)
    }

    pub fn contains_addr(&self, addr: Ip4Addr) -> bool {
        self.groups
            .iter()
            .find(|g| g.is_compatible(addr))
            .is_some_and(|g| g.contains(addr))
    }

    /// Iterate every member of every group as a PEPA.
    pub fn pepas(&self) -> impl Iterator<Item = Ip4Pepa> + '_ {
        self.groups.iter().flat_map(IpGroup::pepas)
    }
}

impl ops::Add for IpCluster {
    type Output = IpCluster;

    fn add(mut self, rhs: IpCluster) -> IpCluster {
        for group in rhs.groups {
            self.insert(group);
        }
        self
    }
}

impl ops::Sub for IpCluster {
    type Output = IpCluster;

    fn sub(mut self, rhs: IpCluster) -> IpCluster {
        for group in &rhs.groups {
            self.remove(group);
        }
        self
    }
}

impl fmt::Debug for IpCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.groups.iter()).finish()
    }
}
