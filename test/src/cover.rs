//! Network cover scenarios.

use anyhow::Error;
use ip4::{Ip4Net, Ip4Range};

fn nets(range: &str) -> Result<Vec<String>, Error> {
    let range: Ip4Range = range.parse()?;
    Ok(range.networks().map(|n| n.to_string()).collect())
}

#[test]
fn unaligned_cover() -> Result<(), Error> {
    assert_eq!(
        nets("10.0.0.5-10.0.0.10")?,
        vec!["10.0.0.5/32", "10.0.0.6/31", "10.0.0.8/30"],
    );
    Ok(())
}

#[test]
fn whole_space_is_default_route() -> Result<(), Error> {
    assert_eq!(nets("0.0.0.0-255.255.255.255")?, vec!["0.0.0.0/0"]);
    Ok(())
}

#[test]
fn cover_round_trips_through_a_set() -> Result<(), Error> {
    use ip4::IpSet;

    let range: Ip4Range = "172.16.0.3-172.16.20.250".parse()?;
    let mut rebuilt = IpSet::new();
    for net in range.networks() {
        rebuilt.insert(net.range());
    }
    // the union of the cover coalesces back to exactly the range
    assert_eq!(rebuilt.ranges(), &[range]);
    Ok(())
}

#[test]
fn cover_is_minimal_for_many_ranges() -> Result<(), Error> {
    for (lo, hi) in [
        (0u32, 0),
        (1, 2),
        (3, 17),
        (255, 256),
        (0x0A000005, 0x0A00000A),
        (0xFFFF_FF00, 0xFFFF_FFFF),
        (0x7FFF_FFFF, 0x8000_0001),
    ] {
        let range = Ip4Range::new(lo.into(), hi.into());
        let cover: Vec<Ip4Net> = range.networks().collect();

        // exact: consecutive, starting and ending on the range bounds
        assert_eq!(cover.first().map(Ip4Net::min_addr), Some(range.min()));
        assert_eq!(cover.last().map(Ip4Net::max_addr), Some(range.max()));
        for pair in cover.windows(2) {
            assert_eq!(pair[0].max_addr() + 1, pair[1].min_addr());
        }

        // minimal: no adjacent pair merges into a single network
        for pair in cover.windows(2) {
            let merged =
                Ip4Range::new(pair[0].min_addr(), pair[1].max_addr());
            assert!(!merged.is_network(), "{:?} not minimal", range);
        }
    }
    Ok(())
}
