//! Paint map scenarios over address ranges.

use std::rc::Rc;

use anyhow::Error;
use ip4::map::{Color, Handle};
use ip4::{Ip4Range, IpMap};

/// Colors composed as bit sets, the way ACL compilers tag rule origins.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
struct Marks(u32);

impl Color for Marks {
    fn blend(&self, other: &Self) -> Self {
        Marks(self.0 | other.0)
    }

    fn unblend(&self, other: &Self) -> Self {
        Marks(self.0 & !other.0)
    }
}

fn marks(bits: u32) -> Handle<Marks> {
    Rc::new(Marks(bits))
}

fn range(text: &str) -> Ip4Range {
    text.parse().unwrap()
}

fn picture(map: &IpMap<Marks>) -> Vec<(String, u32)> {
    map.iter()
        .map(|s| (s.range().to_string(), s.color().0))
        .collect()
}

fn segments_are_canonical(map: &IpMap<Marks>) {
    for pair in map.segments().windows(2) {
        assert!(pair[0].range().max() < pair[1].range().min());
        if pair[0].range().is_adjacent_to(&pair[1].range()) {
            assert_ne!(**pair[0].color(), **pair[1].color());
        }
    }
}

#[test]
fn rule_overwrite_sequence() -> Result<(), Error> {
    let mut map = IpMap::new();
    map.paint(range("10.0.0.0-10.0.0.255"), &marks(1));
    map.paint(range("10.0.0.64-10.0.0.127"), &marks(2));
    segments_are_canonical(&map);
    assert_eq!(
        picture(&map),
        vec![
            ("10.0.0.0-10.0.0.63".to_string(), 1),
            ("10.0.0.64-10.0.0.127".to_string(), 2),
            ("10.0.0.128-10.0.0.255".to_string(), 1),
        ],
    );
    Ok(())
}

#[test]
fn blend_accumulates_rule_origins() -> Result<(), Error> {
    let mut map = IpMap::new();
    map.blend(range("10.0.0.0-10.0.0.99"), &marks(0b001));
    map.blend(range("10.0.0.50-10.0.0.149"), &marks(0b010));
    map.blend(range("10.0.0.75-10.0.0.80"), &marks(0b100));
    segments_are_canonical(&map);
    assert_eq!(
        picture(&map),
        vec![
            ("10.0.0.0-10.0.0.49".to_string(), 0b001),
            ("10.0.0.50-10.0.0.74".to_string(), 0b011),
            ("10.0.0.75-10.0.0.80".to_string(), 0b111),
            ("10.0.0.81-10.0.0.99".to_string(), 0b011),
            ("10.0.0.100-10.0.0.149".to_string(), 0b010),
        ],
    );

    // withdrawing the second rule restores its contribution everywhere
    map.unblend(range("10.0.0.50-10.0.0.149"), &marks(0b010));
    segments_are_canonical(&map);
    assert_eq!(
        picture(&map),
        vec![
            ("10.0.0.0-10.0.0.74".to_string(), 0b001),
            ("10.0.0.75-10.0.0.80".to_string(), 0b101),
            ("10.0.0.81-10.0.0.99".to_string(), 0b001),
            ("10.0.0.100-10.0.0.149".to_string(), 0),
        ],
    );
    Ok(())
}

#[test]
fn unpaint_only_matching_color() -> Result<(), Error> {
    let mut map = IpMap::new();
    map.paint(range("10.0.0.0-10.0.0.9"), &marks(1));
    map.paint(range("10.0.0.10-10.0.0.19"), &marks(2));
    map.unpaint(range("10.0.0.5-10.0.0.14"), &marks(2));
    segments_are_canonical(&map);
    assert_eq!(
        picture(&map),
        vec![
            ("10.0.0.0-10.0.0.9".to_string(), 1),
            ("10.0.0.15-10.0.0.19".to_string(), 2),
        ],
    );
    Ok(())
}

#[test]
fn batch_paint_applies_source_segments() -> Result<(), Error> {
    let mut acl = IpMap::new();
    acl.paint(range("10.0.0.0/24"), &marks(1));
    acl.paint(range("10.0.2.0/24"), &marks(2));

    let mut base = IpMap::new();
    base.paint(range("10.0.0.0-10.0.3.255"), &marks(8));
    base.paint_map(&acl);
    segments_are_canonical(&base);
    assert_eq!(
        picture(&base),
        vec![
            ("10.0.0.0-10.0.0.255".to_string(), 1),
            ("10.0.1.0-10.0.1.255".to_string(), 8),
            ("10.0.2.0-10.0.2.255".to_string(), 2),
            ("10.0.3.0-10.0.3.255".to_string(), 8),
        ],
    );

    // and the inverse: uncolor by source ranges
    base.uncolor_map(&acl);
    assert_eq!(
        picture(&base),
        vec![
            ("10.0.1.0-10.0.1.255".to_string(), 8),
            ("10.0.3.0-10.0.3.255".to_string(), 8),
        ],
    );
    Ok(())
}

#[test]
fn paint_uncolor_round_trip_leaves_outside_untouched() -> Result<(), Error> {
    let mut map = IpMap::new();
    map.paint(range("10.0.0.0-10.0.0.99"), &marks(1));
    map.paint(range("10.0.0.200-10.0.0.255"), &marks(2));
    let before = picture(&map);

    map.paint(range("10.0.0.50-10.0.0.219"), &marks(3));
    map.uncolor(range("10.0.0.50-10.0.0.219"));
    segments_are_canonical(&map);
    assert_eq!(
        picture(&map),
        vec![
            ("10.0.0.0-10.0.0.49".to_string(), 1),
            ("10.0.0.220-10.0.0.255".to_string(), 2),
        ],
    );
    // sanity: those are exactly the outside pieces of the original
    assert_eq!(before[0].1, 1);
    assert_eq!(before[1].1, 2);
    Ok(())
}
