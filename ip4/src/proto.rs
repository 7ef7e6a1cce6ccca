// Copyright 2022 Oxide Computer Company

//! The protocol field of an IP header.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::ParseError;
use crate::interval::Metric;
use crate::lexicon::Lexicon;

/// The kind of ancillary data a protocol carries in a service.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DataKind {
    /// No ancillary data.
    None,
    /// An ICMP message.
    Icmp,
    /// A TCP/UDP port.
    Port,
}

/// An IP protocol value in `0..=255`, plus the `IP` sentinel (`256`)
/// standing for all protocols and an invalid sentinel.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ip4Protocol(i16);

impl Ip4Protocol {
    pub const MIN: Self = Self(0);
    pub const MAX: Self = Self(255);

    /// Sentinel covering all IP protocols.
    pub const IP: Self = Self(256);
    pub const INVALID: Self = Self(-1);

    pub const ICMP: Self = Self(1);
    pub const TCP: Self = Self(6);
    pub const UDP: Self = Self(17);

    /// Construct from a raw value; values outside `0..=256` become
    /// `INVALID`.
    pub fn new(value: i32) -> Self {
        if Self::valid(value) {
            Self(value as i16)
        } else {
            Self::INVALID
        }
    }

    pub fn raw(self) -> i32 {
        self.0 as i32
    }

    pub fn valid(value: i32) -> bool {
        (Self::MIN.0 as i32..=Self::IP.0 as i32).contains(&value)
    }

    pub fn is_valid(self) -> bool {
        Self::valid(self.0 as i32)
    }

    /// What type of ancillary data a service with this protocol carries.
    pub fn data_kind(self) -> DataKind {
        match self {
            Self::ICMP => DataKind::Icmp,
            Self::TCP | Self::UDP => DataKind::Port,
            _ => DataKind::None,
        }
    }

    pub fn has_ancillary_data(self) -> bool {
        self.data_kind() != DataKind::None
    }

    /// The primary name if registered, the decimal value if merely
    /// valid, `"INVALID"` otherwise.
    pub fn name(self) -> String {
        match lexicon().name(self) {
            Some(name) => name,
            None => "INVALID".to_string(),
        }
    }
}

impl Default for Ip4Protocol {
    fn default() -> Self {
        Self::INVALID
    }
}

impl Metric for Ip4Protocol {
    const MIN: Self = Self::MIN;
    const MAX: Self = Self::MAX;

    fn succ(self) -> Option<Self> {
        if self >= Self::MIN && self < Self::MAX {
            Some(Self(self.0 + 1))
        } else {
            None
        }
    }

    fn pred(self) -> Option<Self> {
        if self > Self::MIN && self <= Self::MAX {
            Some(Self(self.0 - 1))
        } else {
            None
        }
    }
}

impl fmt::Display for Ip4Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Ip4Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Ip4Protocol {
    type Err = ParseError;

    /// Parse a decimal value in `0..=256` or a name from the protocol
    /// lexicon.
    fn from_str(s: &str) -> Result<Self, ParseError> {
        let text = s.trim();
        if text.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            let value = text.parse::<i32>().map_err(|_| {
                ParseError::new("IP protocol", s, "not numeric")
            })?;
            if !Self::valid(value) {
                return Err(ParseError::new("IP protocol", s, "out of range"));
            }
            return Ok(Self::new(value));
        }
        lexicon()
            .key(text)
            .filter(|p| p.is_valid())
            .ok_or_else(|| ParseError::new("IP protocol", s, "unknown name"))
    }
}

static PROTOCOL_LEXICON: LazyLock<Lexicon<Ip4Protocol>> = LazyLock::new(|| {
    let w = Ip4Protocol::new;
    Lexicon::build()
        .word(Ip4Protocol::IP, "IP")
        .word(Ip4Protocol::TCP, "TCP")
        .word(Ip4Protocol::UDP, "UDP")
        .word(Ip4Protocol::ICMP, "ICMP")
        .word(w(51), "AH")
        .alias("AHP")
        .word(w(88), "EIGRP")
        .word(w(50), "ESP")
        .alias("IPSEC")
        .word(w(47), "GRE")
        .alias("PPTP")
        .word(w(56), "ICMP6")
        .word(w(2), "IGMP")
        .word(w(4), "IPINIP")
        .word(w(94), "NOS")
        .word(w(89), "OSPF")
        .word(w(108), "PCP")
        .word(w(103), "PIM")
        .word(w(109), "SNP")
        .default_name_with(|p: &Ip4Protocol| {
            if p.is_valid() {
                p.raw().to_string()
            } else {
                "INVALID".to_string()
            }
        })
        .default_key(Ip4Protocol::INVALID)
        .finish()
});

/// The process-wide protocol name table, immutable after construction.
pub fn lexicon() -> &'static Lexicon<Ip4Protocol> {
    &PROTOCOL_LEXICON
}
