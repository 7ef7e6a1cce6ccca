//! Set facade scenarios.

use anyhow::Error;
use ip4::{Ip4Addr, Ip4Net, Ip4Range, IpCluster, IpGroup, IpSet};

fn range(text: &str) -> Ip4Range {
    text.parse().unwrap()
}

fn addr(text: &str) -> Ip4Addr {
    text.parse().unwrap()
}

fn net(text: &str) -> Ip4Net {
    text.parse().unwrap()
}

#[test]
fn allowlist_lifecycle() -> Result<(), Error> {
    let mut allow = IpSet::new();
    allow.insert(range("10.0.0.0/24"));
    allow.insert(range("10.0.2.0/24"));
    allow.insert(range("10.0.1.0/24"));
    // the three /24s coalesce into one block
    assert_eq!(allow.ranges(), &[range("10.0.0.0-10.0.2.255")]);

    // punch a hole for one host
    allow.remove(range("10.0.1.7"));
    assert_eq!(
        allow.ranges(),
        &[range("10.0.0.0-10.0.1.6"), range("10.0.1.8-10.0.2.255")],
    );
    assert!(allow.contains_addr(addr("10.0.0.9")));
    assert!(!allow.contains_addr(addr("10.0.1.7")));

    // overlap against a probe range
    let probe = allow.overlap(&range("10.0.1.0-10.0.1.16"));
    assert_eq!(
        probe.ranges(),
        &[range("10.0.1.0-10.0.1.6"), range("10.0.1.8-10.0.1.16")],
    );
    Ok(())
}

#[test]
fn membership_is_exact() -> Result<(), Error> {
    let mut set = IpSet::new();
    set.insert(range("10.0.0.0-10.0.0.9"));
    assert!(set.is_member(&range("10.0.0.0-10.0.0.9")));
    assert!(!set.is_member(&range("10.0.0.0-10.0.0.8")));
    assert!(set.contains(&range("10.0.0.0-10.0.0.8")));
    Ok(())
}

#[test]
fn groups_enforce_network_membership() -> Result<(), Error> {
    let mut group = IpGroup::new(net("10.1.0.0/16"));
    assert!(group.insert(addr("10.1.2.3")));
    assert!(!group.insert(addr("10.2.2.3")));

    let pepas: Vec<String> =
        group.pepas().map(|p| p.to_string()).collect();
    assert_eq!(pepas, vec!["10.1.2.3/16"]);
    Ok(())
}

#[test]
fn clusters_keep_networks_disjoint() -> Result<(), Error> {
    let mut cluster = IpCluster::new();
    assert!(cluster.insert_net(net("10.1.0.0/16")));
    assert!(cluster.insert_net(net("10.2.0.0/16")));
    assert!(!cluster.insert_net(net("10.1.128.0/17")));

    assert!(cluster.insert_addr(addr("10.2.0.5")));
    assert!(!cluster.insert_addr(addr("10.3.0.5")));
    assert!(cluster.contains_addr(addr("10.2.0.5")));

    let mut doomed = IpGroup::new(net("10.2.0.0/16"));
    doomed.insert(addr("10.2.0.5"));
    assert!(cluster.remove(&doomed));
    assert!(!cluster.contains_addr(addr("10.2.0.5")));
    Ok(())
}

#[test]
fn set_algebra_against_cover() -> Result<(), Error> {
    // removing every network of a cover empties the set
    let span = range("10.0.0.3-10.0.7.250");
    let mut set = IpSet::new();
    set.insert(span);
    for n in span.networks() {
        set.remove(n.range());
    }
    assert!(set.is_empty());
    Ok(())
}
