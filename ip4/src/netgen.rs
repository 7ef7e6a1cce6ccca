// Copyright 2022 Oxide Computer Company

//! Generation of the minimal CIDR cover of an address range.

use crate::addr::{Ip4Addr, Ip4Mask, Ip4Net};
use crate::interval::Interval;
use crate::range::Ip4Range;

/// Iterator over the unique minimal sequence of networks that exactly
/// covers an address range.
///
/// At each step the emitted network is the largest one that is based at
/// the low end of the remaining range and fits inside it: `2^k` addresses
/// where `k` is limited both by the alignment of the base and by the size
/// of what is left.
///
/// The default value is the exhausted iterator, equal to any other
/// exhausted iterator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetIter {
    rest: Option<(u32, u32)>,
}

impl NetIter {
    pub fn new(range: &Ip4Range) -> Self {
        let rest = if range.is_empty() {
            None
        } else {
            Some((Interval::min(range).raw(), Interval::max(range).raw()))
        };
        Self { rest }
    }
}

impl Iterator for NetIter {
    type Item = Ip4Net;

    fn next(&mut self) -> Option<Ip4Net> {
        let (lo, hi) = self.rest?;

        // The whole space wraps the size arithmetic, so emit 0/0 directly.
        if lo == 0 && hi == u32::MAX {
            self.rest = None;
            return Some(Ip4Net::new(Ip4Addr::MIN, Ip4Mask::new(0)));
        }

        let size = hi - lo + 1;
        // Largest power of two no bigger than the remaining size, further
        // limited by the alignment of the base address. trailing_zeros of
        // a zero base is 32, which the size limit (at most 31 here) caps.
        let k = (31 - size.leading_zeros()).min(lo.trailing_zeros());
        let net = Ip4Net::new(Ip4Addr::new(lo), Ip4Mask::new(32 - k));

        let upper = net.max_addr().raw();
        self.rest = if upper >= hi { None } else { Some((upper + 1, hi)) };
        Some(net)
    }
}
