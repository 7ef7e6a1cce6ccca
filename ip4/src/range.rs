// Copyright 2022 Oxide Computer Company

//! Concrete interval types over addresses and ports, with their text
//! grammar.
//!
//! The shared grammar is `lo-hi`, where a leading `-hi` means
//! `[MIN, hi]`, a trailing `lo-` means `[lo, MAX]`, and a bare value is a
//! singleton. Address ranges additionally accept `addr/mask` as shorthand
//! for the network's range.

use std::str::FromStr;

use crate::addr::{Ip4Addr, Ip4Net};
use crate::error::ParseError;
use crate::interval::{Interval, Metric};
use crate::netgen::NetIter;
use crate::port::IpPort;

/// A range of IPv4 addresses.
pub type Ip4Range = Interval<Ip4Addr>;

/// A range of TCP/UDP ports.
pub type IpPortRange = Interval<IpPort>;

/// The character between the endpoints of a range in text form.
pub const RANGE_SEPARATOR: char = '-';

/// Parse the shared range grammar, given a parser for a single endpoint.
///
/// A name containing the separator (`FTP-DATA`) is tried whole before any
/// split is attempted, and every separator position is a split candidate,
/// so `20-FTP-DATA` parses as `[20, FTP-DATA]`.
fn parse_interval<M, F>(
    s: &str,
    target: &'static str,
    elem: F,
) -> Result<Interval<M>, ParseError>
where
    M: Metric,
    F: Fn(&str) -> Result<M, ParseError>,
{
    let text = s.trim();
    if text.is_empty() {
        return Err(ParseError::new(target, s, "empty input"));
    }
    if let Ok(single) = elem(text) {
        return Ok(Interval::point(single));
    }
    for (at, _) in text.match_indices(RANGE_SEPARATOR) {
        let (a, b) = (text[..at].trim(), text[at + 1..].trim());
        let lo = if a.is_empty() { Ok(M::MIN) } else { elem(a) };
        let hi = if b.is_empty() { Ok(M::MAX) } else { elem(b) };
        if let (Ok(lo), Ok(hi)) = (lo, hi) {
            return Ok(Interval::new(lo, hi));
        }
    }
    Err(ParseError::new(target, s, "not a range"))
}

impl FromStr for Interval<Ip4Addr> {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, ParseError> {
        let text = s.trim();
        if text.contains(Ip4Net::SEPARATOR) {
            let net: Ip4Net = text.parse().map_err(|e: ParseError| {
                ParseError::new("IPv4 range", s, e.message)
            })?;
            return Ok(net.range());
        }
        parse_interval(text, "IPv4 range", |t| t.parse())
    }
}

impl FromStr for Interval<IpPort> {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, ParseError> {
        parse_interval(s, "port range", |t| t.parse())
    }
}

impl Interval<Ip4Addr> {
    /// Iterate the unique minimal sequence of CIDR networks whose union
    /// is exactly this range.
    pub fn networks(&self) -> NetIter {
        NetIter::new(self)
    }

    /// Whether the range is exactly one CIDR network.
    pub fn is_network(&self) -> bool {
        let mut nets = self.networks();
        nets.next().is_some() && nets.next().is_none()
    }
}

impl From<Ip4Net> for Interval<Ip4Addr> {
    fn from(net: Ip4Net) -> Self {
        net.range()
    }
}
