//! Round-trip properties of the textual forms.

use anyhow::Error;
use ip4::{
    IcmpType, Ip4Addr, Ip4Mask, Ip4Net, Ip4Pepa, Ip4Protocol, Ip4Range,
    Ip4Service, IpPort, IpPortRange,
};

#[test]
fn addresses_round_trip() -> Result<(), Error> {
    for text in ["0.0.0.0", "10.0.0.5", "172.16.255.1", "255.255.255.255"] {
        let a: Ip4Addr = text.parse()?;
        assert_eq!(a.to_string(), text);
    }
    Ok(())
}

#[test]
fn masks_round_trip_and_validate() -> Result<(), Error> {
    for count in 0..=32u32 {
        let m = Ip4Mask::new(count);
        assert_eq!(m.to_string().parse::<Ip4Mask>()?, m);
    }
    // octet form accepted only for contiguous masks
    assert_eq!("255.255.0.0".parse::<Ip4Mask>()?, Ip4Mask::new(16));
    assert!("255.254.255.0".parse::<Ip4Mask>().is_err());
    Ok(())
}

#[test]
fn networks_canonicalize_on_parse() -> Result<(), Error> {
    let net: Ip4Net = "192.168.77.200/255.255.255.0".parse()?;
    assert_eq!(net.addr(), "192.168.77.0".parse::<Ip4Addr>()?);
    assert_eq!(net.mask(), Ip4Mask::new(24));
    assert_eq!(net.to_string(), "192.168.77.0/24");
    assert_eq!(net.to_string().parse::<Ip4Net>()?, net);
    Ok(())
}

#[test]
fn pepas_preserve_the_address() -> Result<(), Error> {
    let pepa: Ip4Pepa = "192.168.77.200/24".parse()?;
    assert_eq!(pepa.addr(), "192.168.77.200".parse::<Ip4Addr>()?);
    assert_eq!(pepa.to_string().parse::<Ip4Pepa>()?, pepa);
    Ok(())
}

#[test]
fn ranges_round_trip() -> Result<(), Error> {
    for text in [
        "10.0.0.1-10.0.0.9",
        "0.0.0.0-10.0.0.0",
        "10.0.0.1-255.255.255.255",
    ] {
        let r: Ip4Range = text.parse()?;
        assert_eq!(r.to_string(), text);
    }
    let r: IpPortRange = "80-443".parse()?;
    assert_eq!(r.to_string().parse::<IpPortRange>()?, r);
    Ok(())
}

#[test]
fn ports_accept_names() -> Result<(), Error> {
    assert_eq!("SSH".parse::<IpPort>()?, IpPort::new(22));
    assert_eq!("isakmp".parse::<IpPort>()?, IpPort::new(500));
    let p = IpPort::new(123);
    assert_eq!(p.to_string().parse::<IpPort>()?, p);
    assert_eq!(p.name(), "NTP");
    Ok(())
}

#[test]
fn protocols_and_icmp_round_trip() -> Result<(), Error> {
    for p in [
        Ip4Protocol::ICMP,
        Ip4Protocol::TCP,
        Ip4Protocol::UDP,
        Ip4Protocol::new(89),
        Ip4Protocol::IP,
    ] {
        assert_eq!(p.to_string().parse::<Ip4Protocol>()?, p);
        assert_eq!(p.name().parse::<Ip4Protocol>()?, p);
    }
    for t in [IcmpType::ECHO, IcmpType::UNREACHABLE, IcmpType::new(99)] {
        assert_eq!(t.to_string().parse::<IcmpType>()?, t);
    }
    Ok(())
}

#[test]
fn services_round_trip() -> Result<(), Error> {
    for text in ["6:80", "17:53", "1:ECHO", "47", "89"] {
        let svc: Ip4Service = text.parse()?;
        assert_eq!(svc.to_string(), text);
        assert_eq!(svc.to_string().parse::<Ip4Service>()?, svc);
    }
    // named forms normalize to the numeric protocol
    let svc: Ip4Service = "TCP:HTTPS".parse()?;
    assert_eq!(svc.to_string(), "6:443");
    Ok(())
}

#[test]
fn parse_failures_are_reported() {
    assert!("10.0.0".parse::<Ip4Addr>().is_err());
    assert!("1.2.3.4.5".parse::<Ip4Addr>().is_err());
    assert!("40".parse::<Ip4Mask>().is_err());
    assert!("10.0.0.0".parse::<Ip4Net>().is_err());
    assert!("TCP".parse::<Ip4Service>().is_err());
    let err = "299.0.0.1".parse::<Ip4Addr>().unwrap_err();
    assert!(err.to_string().contains("299.0.0.1"));
}
