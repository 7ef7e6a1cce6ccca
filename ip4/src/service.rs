// Copyright 2022 Oxide Computer Company

//! IPv4 services: a protocol together with its ancillary data.

use std::fmt;
use std::str::FromStr;

use crate::error::{ParseError, ServiceError};
use crate::icmp::{Icmp, IcmpType};
use crate::interval::Metric;
use crate::port::IpPort;
use crate::proto::{DataKind, Ip4Protocol};

/// Ancillary data carried by a service. TCP and UDP carry a port, ICMP a
/// message; everything else carries nothing.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ServiceData {
    None,
    Icmp(Icmp),
    Port(IpPort),
}

impl Default for ServiceData {
    fn default() -> Self {
        Self::None
    }
}

/// An IPv4 service. Always contains a protocol, and ancillary data
/// matching that protocol's [`DataKind`].
///
/// Services are totally ordered by `(protocol, data)`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
pub struct Ip4Service {
    protocol: Ip4Protocol,
    data: ServiceData,
}

impl Ip4Service {
    pub const MIN: Self = Self {
        protocol: Ip4Protocol::MIN,
        data: ServiceData::None,
    };
    pub const MAX: Self = Self {
        protocol: Ip4Protocol::MAX,
        data: ServiceData::None,
    };

    /// The character between the protocol and ancillary data in the text
    /// form.
    pub const SEPARATOR: char = ':';

    /// Construct from a protocol, with default ancillary data for its
    /// kind.
    pub fn new(protocol: Ip4Protocol) -> Self {
        let data = match protocol.data_kind() {
            DataKind::Port => ServiceData::Port(IpPort::default()),
            DataKind::Icmp => ServiceData::Icmp(Icmp::default()),
            DataKind::None => ServiceData::None,
        };
        Self { protocol, data }
    }

    /// An ICMP service for message `msg`.
    pub fn icmp(msg: Icmp) -> Self {
        Self {
            protocol: Ip4Protocol::ICMP,
            data: ServiceData::Icmp(msg),
        }
    }

    /// An ICMP service for the message type `mtype`.
    pub fn icmp_type(mtype: IcmpType) -> Self {
        Self::icmp(Icmp::from(mtype))
    }

    /// A TCP or UDP service on `port`. Rejected for protocols that do
    /// not carry a port.
    pub fn with_port(
        protocol: Ip4Protocol,
        port: IpPort,
    ) -> Result<Self, ServiceError> {
        if protocol.data_kind() != DataKind::Port {
            return Err(ServiceError::NotPort(protocol.raw()));
        }
        Ok(Self {
            protocol,
            data: ServiceData::Port(port),
        })
    }

    pub fn protocol(&self) -> Ip4Protocol {
        self.protocol
    }

    pub fn data(&self) -> ServiceData {
        self.data
    }

    pub fn data_kind(&self) -> DataKind {
        self.protocol.data_kind()
    }

    /// Whether the protocol is valid and the ancillary data matches its
    /// kind.
    pub fn is_valid(&self) -> bool {
        self.protocol.is_valid()
            && match (self.protocol.data_kind(), &self.data) {
                (DataKind::None, ServiceData::None) => true,
                (DataKind::Icmp, ServiceData::Icmp(_)) => true,
                (DataKind::Port, ServiceData::Port(_)) => true,
                _ => false,
            }
    }

    pub fn has_port(&self) -> bool {
        self.protocol.data_kind() == DataKind::Port
    }

    pub fn has_icmp(&self) -> bool {
        self.protocol.data_kind() == DataKind::Icmp
    }

    pub fn is(&self, protocol: Ip4Protocol) -> bool {
        self.protocol == protocol
    }

    /// The TCP/UDP port of the service.
    pub fn port(&self) -> Result<IpPort, ServiceError> {
        match self.data {
            ServiceData::Port(p) => Ok(p),
            _ => Err(ServiceError::NotPort(self.protocol.raw())),
        }
    }

    /// The ICMP message of the service.
    pub fn icmp_data(&self) -> Result<Icmp, ServiceError> {
        match self.data {
            ServiceData::Icmp(i) => Ok(i),
            _ => Err(ServiceError::NotIcmp(self.protocol.raw())),
        }
    }

    pub fn set_port(&mut self, port: IpPort) -> Result<(), ServiceError> {
        if self.protocol.data_kind() != DataKind::Port {
            return Err(ServiceError::NotPort(self.protocol.raw()));
        }
        self.data = ServiceData::Port(port);
        Ok(())
    }

    pub fn set_icmp(&mut self, msg: Icmp) -> Result<(), ServiceError> {
        if self.protocol.data_kind() != DataKind::Icmp {
            return Err(ServiceError::NotIcmp(self.protocol.raw()));
        }
        self.data = ServiceData::Icmp(msg);
        Ok(())
    }

    /// The service with the minimum ancillary data for `protocol`.
    pub fn minimum_for(protocol: Ip4Protocol) -> Self {
        let data = match protocol.data_kind() {
            DataKind::Port => ServiceData::Port(IpPort::MIN),
            DataKind::Icmp => ServiceData::Icmp(Icmp::MIN),
            DataKind::None => ServiceData::None,
        };
        Self { protocol, data }
    }

    /// The service with the maximum ancillary data for `protocol`.
    pub fn maximum_for(protocol: Ip4Protocol) -> Self {
        let data = match protocol.data_kind() {
            DataKind::Port => ServiceData::Port(IpPort::MAX),
            DataKind::Icmp => ServiceData::Icmp(Icmp::MAX),
            DataKind::None => ServiceData::None,
        };
        Self { protocol, data }
    }

    /// Step to the next service: through the ancillary space first, then
    /// on to the next protocol at its minimum.
    pub fn step_up(&mut self) {
        match self.data {
            ServiceData::Port(p) if p != IpPort::MAX => {
                self.data = ServiceData::Port(p + 1);
                return;
            }
            ServiceData::Icmp(i) if i.message_type() != IcmpType::MAX => {
                if let Some(t) = i.message_type().succ() {
                    self.data = ServiceData::Icmp(Icmp::from(t));
                    return;
                }
            }
            _ => {}
        }
        if let Some(p) = self.protocol.succ() {
            *self = Self::minimum_for(p);
        }
    }

    /// Step to the previous service: through the ancillary space first,
    /// then back to the previous protocol at its maximum.
    pub fn step_down(&mut self) {
        match self.data {
            ServiceData::Port(p) if p != IpPort::MIN => {
                self.data = ServiceData::Port(p - 1);
                return;
            }
            ServiceData::Icmp(i) if i.message_type() != IcmpType::MIN => {
                if let Some(t) = i.message_type().pred() {
                    self.data = ServiceData::Icmp(Icmp::from(t));
                    return;
                }
            }
            _ => {}
        }
        if let Some(p) = self.protocol.pred() {
            *self = Self::maximum_for(p);
        }
    }
}

impl From<Icmp> for Ip4Service {
    fn from(msg: Icmp) -> Self {
        Self::icmp(msg)
    }
}

impl From<IcmpType> for Ip4Service {
    fn from(mtype: IcmpType) -> Self {
        Self::icmp_type(mtype)
    }
}

impl fmt::Display for Ip4Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.protocol)?;
        match self.data {
            ServiceData::Icmp(i) => {
                write!(f, "{}{}", Self::SEPARATOR, i.message_type())
            }
            ServiceData::Port(p) => write!(f, "{}{}", Self::SEPARATOR, p),
            ServiceData::None => Ok(()),
        }
    }
}

impl FromStr for Ip4Service {
    type Err = ParseError;

    /// Parse `PROTO[:ANCILLARY]`, e.g. `"UDP:517"`, `"6:80"`,
    /// `"1:ECHO"`. The ancillary part is required exactly when the
    /// protocol carries ancillary data.
    fn from_str(s: &str) -> Result<Self, ParseError> {
        let text = s.trim();
        let (proto_text, rest) = match text.split_once(Self::SEPARATOR) {
            Some((p, r)) => (p, Some(r.trim())),
            None => (text, None),
        };
        let protocol: Ip4Protocol = proto_text
            .parse()
            .map_err(|e: ParseError| ParseError::new("service", s, e.message))?;
        match protocol.data_kind() {
            DataKind::Port => {
                let port_text = rest.filter(|r| !r.is_empty()).ok_or_else(
                    || ParseError::new("service", s, "missing port"),
                )?;
                let port: IpPort = port_text.parse().map_err(
                    |e: ParseError| ParseError::new("service", s, e.message),
                )?;
                Self::with_port(protocol, port).map_err(|_| {
                    ParseError::new("service", s, "protocol/port mismatch")
                })
            }
            DataKind::Icmp => {
                let icmp_text = rest.filter(|r| !r.is_empty()).ok_or_else(
                    || ParseError::new("service", s, "missing ICMP type"),
                )?;
                let mtype: IcmpType = icmp_text.parse().map_err(
                    |e: ParseError| ParseError::new("service", s, e.message),
                )?;
                Ok(Self::icmp_type(mtype))
            }
            DataKind::None => match rest {
                // a trailing bare colon is tolerated
                Some("") | None => Ok(Self::new(protocol)),
                Some(_) => Err(ParseError::new(
                    "service",
                    s,
                    "protocol carries no ancillary data",
                )),
            },
        }
    }
}
