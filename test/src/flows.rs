//! Flowspace scenarios over address and port dimensions.

use anyhow::Error;
use flowspace::{region, Layer, LeafLayer, Space};
use ip4::{Interval, Ip4Addr, Ip4Range, IpPort, IpPortRange};

use crate::support::{test_logger, XorShift};

type FlowSpace = Layer<Ip4Addr, LeafLayer<IpPort, &'static str>>;

fn arange(text: &str) -> Ip4Range {
    text.parse().unwrap()
}

fn prange(text: &str) -> IpPortRange {
    text.parse().unwrap()
}

fn hits(space: &FlowSpace, addrs: &str, ports: &str) -> Vec<&'static str> {
    space
        .query(region![arange(addrs), prange(ports)])
        .map(|(_, v)| *v)
        .collect()
}

#[test]
fn two_dimensional_intersection() -> Result<(), Error> {
    let mut space = FlowSpace::new();
    space.insert(region![arange("10.0.0.0-10.0.0.255"), prange("80")], "p1");
    space.insert(region![arange("10.0.0.128-10.0.1.0"), prange("443")], "p2");

    assert_eq!(hits(&space, "10.0.0.200", "80"), vec!["p1"]);
    assert_eq!(hits(&space, "10.0.0.200", "1-1000"), vec!["p1", "p2"]);
    assert!(hits(&space, "192.168.0.1", "80").is_empty());
    Ok(())
}

#[test]
fn query_yields_stored_regions() -> Result<(), Error> {
    let mut space = FlowSpace::new();
    let stored = region![arange("10.0.0.0/30"), prange("80-443")];
    space.insert(stored.clone(), "svc");

    // the iterator reports the stored box, not the query box
    let got: Vec<_> = space
        .query(region![arange("10.0.0.1"), prange("100")])
        .collect();
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].0, stored);
    Ok(())
}

#[test]
fn full_enumeration_is_lexicographic() -> Result<(), Error> {
    let mut space = FlowSpace::new();
    space.insert(region![arange("10.0.0.8-10.0.0.9"), prange("1")], "c");
    space.insert(region![arange("10.0.0.0-10.0.0.9"), prange("9")], "b");
    space.insert(region![arange("10.0.0.0-10.0.0.5"), prange("5-6")], "a");
    space.insert(region![arange("10.0.0.8-10.0.0.20"), prange("2")], "d");

    let order: Vec<&str> = space.iter_all().map(|(_, v)| *v).collect();
    assert_eq!(order, vec!["a", "b", "c", "d"]);
    Ok(())
}

#[test]
fn find_insert_erase_cycle() -> Result<(), Error> {
    let log = test_logger();
    let mut space = FlowSpace::new();
    let web = region![arange("10.0.0.0/24"), prange("80")];
    let dns = region![arange("10.0.0.0/24"), prange("53")];
    space.insert(web.clone(), "web");
    space.insert(dns.clone(), "dns");
    space.insert(web.clone(), "web-backup");
    assert_eq!(space.len(), 3);

    let cursor = space.find(&web, &"web");
    assert!(space.is_valid(&cursor));
    assert_eq!(space.region_of(&cursor), Some(web.clone()));
    assert_eq!(space.value_of(&cursor), Some(&"web"));

    assert_eq!(space.erase(&cursor), Some("web"));
    assert!(space.validate(&log));
    assert_eq!(space.len(), 2);

    // the duplicate under the same region survives
    let cursor = space.find(&web, &"web-backup");
    assert!(space.is_valid(&cursor));
    // the erased payload is gone from every new iteration
    assert!(space.iter_all().all(|(_, v)| *v != "web"));
    Ok(())
}

#[test]
fn payload_writes_reach_storage() -> Result<(), Error> {
    let mut space: Layer<Ip4Addr, LeafLayer<IpPort, u64>> = Layer::new();
    let r = region![arange("10.0.0.1"), prange("80")];
    space.insert(r.clone(), 0);

    let cursor = space.find(&r, &0);
    *space.value_mut_of(&cursor).unwrap() += 41;
    *space.value_mut_of(&cursor).unwrap() += 1;
    let counts: Vec<u64> = space.iter_all().map(|(_, v)| *v).collect();
    assert_eq!(counts, vec![42]);
    Ok(())
}

#[test]
fn query_visits_each_intersecting_entry_once() -> Result<(), Error> {
    let mut space: Layer<Ip4Addr, LeafLayer<IpPort, u32>> = Layer::new();
    let mut rng = XorShift(0xC0FFEE);
    let mut entries = Vec::new();
    for tag in 0..200u32 {
        let alo = rng.next() % 4096;
        let ahi = alo + rng.next() % 256;
        let plo = (rng.next() % 1024) as u16;
        let phi = plo + (rng.next() % 64) as u16;
        let r = region![
            Interval::new(Ip4Addr::new(alo), Ip4Addr::new(ahi)),
            Interval::new(IpPort::new(plo), IpPort::new(phi))
        ];
        space.insert(r.clone(), tag);
        entries.push((r, tag));
    }

    for _ in 0..50 {
        let alo = rng.next() % 4096;
        let ahi = alo + rng.next() % 512;
        let plo = (rng.next() % 1024) as u16;
        let phi = plo + (rng.next() % 128) as u16;
        let query = region![
            Interval::new(Ip4Addr::new(alo), Ip4Addr::new(ahi)),
            Interval::new(IpPort::new(plo), IpPort::new(phi))
        ];

        let mut expect: Vec<u32> = entries
            .iter()
            .filter(|(r, _)| {
                r.0.has_intersection(&query.0)
                    && r.1 .0.has_intersection(&query.1 .0)
            })
            .map(|(_, tag)| *tag)
            .collect();
        let mut got: Vec<u32> =
            space.query(query).map(|(_, v)| *v).collect();
        expect.sort_unstable();
        got.sort_unstable();
        assert_eq!(got, expect);
    }
    Ok(())
}

#[test]
fn churn_keeps_tree_invariants() -> Result<(), Error> {
    let log = test_logger();
    let mut space: Layer<Ip4Addr, LeafLayer<IpPort, u32>> = Layer::new();
    let mut rng = XorShift(0x5EED);
    let mut live: Vec<(Ip4Range, IpPortRange, u32)> = Vec::new();
    for round in 0..500u32 {
        if round % 3 != 2 || live.is_empty() {
            let alo = rng.next() % 100_000;
            let ahi = alo + rng.next() % 1000;
            let plo = (rng.next() % 60_000) as u16;
            let phi = plo.saturating_add((rng.next() % 500) as u16);
            let a = Ip4Range::new(Ip4Addr::new(alo), Ip4Addr::new(ahi));
            let p = IpPortRange::new(IpPort::new(plo), IpPort::new(phi));
            space.insert(region![a, p], round);
            live.push((a, p, round));
        } else {
            let at = (rng.next() as usize) % live.len();
            let (a, p, tag) = live.swap_remove(at);
            let cursor = space.find(&region![a, p], &tag);
            assert!(space.is_valid(&cursor));
            assert_eq!(space.erase(&cursor), Some(tag));
        }
        assert_eq!(space.len(), live.len());
        if round % 25 == 0 {
            assert!(space.validate(&log), "round {}", round);
        }
    }
    assert!(space.validate(&log));
    Ok(())
}
