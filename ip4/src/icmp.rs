// Copyright 2022 Oxide Computer Company

//! ICMP message types and messages.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::ParseError;
use crate::interval::Metric;
use crate::lexicon::Lexicon;

/// An ICMP message type value in `0..=255`, with a distinguished invalid
/// sentinel outside that range.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IcmpType(i16);

impl IcmpType {
    pub const INVALID: Self = Self(-1);

    pub const ECHO_REPLY: Self = Self(0);
    pub const UNREACHABLE: Self = Self(3);
    pub const SOURCE_QUENCH: Self = Self(4);
    pub const REDIRECT: Self = Self(5);
    pub const ALTERNATE_ADDRESS: Self = Self(6);
    pub const ECHO: Self = Self(8);
    pub const ROUTER_ADVERTISEMENT: Self = Self(9);
    pub const ROUTER_SOLICITATION: Self = Self(10);
    pub const TIME_EXCEEDED: Self = Self(11);
    pub const PARAMETER_PROBLEM: Self = Self(12);
    pub const TIME_STAMP_REQUEST: Self = Self(13);
    pub const TIME_STAMP_REPLY: Self = Self(14);
    pub const INFO_REQUEST: Self = Self(15);
    pub const INFO_REPLY: Self = Self(16);
    pub const ADDR_MASK_REQUEST: Self = Self(17);
    pub const ADDR_MASK_REPLY: Self = Self(18);
    pub const TRACEROUTE: Self = Self(30);
    pub const CONVERSION_ERROR: Self = Self(31);
    pub const MOBILE_REDIRECT: Self = Self(32);

    pub const MIN: Self = Self(0);
    pub const MAX: Self = Self(255);

    /// Construct from a raw value; out-of-range values become `INVALID`.
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
        (Self::MIN.0 as i32..=Self::MAX.0 as i32).contains(&value)
    }

    pub fn is_valid(self) -> bool {
        Self::valid(self.0 as i32)
    }

    /// Whether the value has a registered name.
    pub fn is_defined(self) -> bool {
        lexicon().primary(self).is_some()
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

impl Default for IcmpType {
    fn default() -> Self {
        Self::INVALID
    }
}

impl Metric for IcmpType {
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

impl fmt::Display for IcmpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Debug for IcmpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for IcmpType {
    type Err = ParseError;

    /// Parse a decimal value in `0..=255` or a name from the ICMP
    /// lexicon. Names never start with a digit, so the first character
    /// selects the form.
    fn from_str(s: &str) -> Result<Self, ParseError> {
        let text = s.trim();
        if text.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            let value = text.parse::<i32>().map_err(|_| {
                ParseError::new("ICMP type", s, "not numeric")
            })?;
            if !Self::valid(value) {
                return Err(ParseError::new("ICMP type", s, "out of range"));
            }
            return Ok(Self::new(value));
        }
        lexicon()
            .key(text)
            .filter(|t| t.is_valid())
            .ok_or_else(|| ParseError::new("ICMP type", s, "unknown name"))
    }
}

static ICMP_LEXICON: LazyLock<Lexicon<IcmpType>> = LazyLock::new(|| {
    Lexicon::build()
        .word(IcmpType::ECHO_REPLY, "ECHO_REPLY")
        .alias("MIN")
        .word(IcmpType::UNREACHABLE, "UNREACHABLE")
        .word(IcmpType::SOURCE_QUENCH, "SOURCE_QUENCH")
        .word(IcmpType::REDIRECT, "REDIRECT")
        .word(IcmpType::ALTERNATE_ADDRESS, "ALTERNATE_ADDRESS")
        .word(IcmpType::ECHO, "ECHO")
        .word(IcmpType::ROUTER_ADVERTISEMENT, "ROUTER_ADVERTISEMENT")
        .word(IcmpType::ROUTER_SOLICITATION, "ROUTER_SOLICITATION")
        .word(IcmpType::TIME_EXCEEDED, "TIME_EXCEEDED")
        .word(IcmpType::PARAMETER_PROBLEM, "PARAMETER_PROBLEM")
        .word(IcmpType::TIME_STAMP_REQUEST, "TIME_STAMP_REQUEST")
        .word(IcmpType::TIME_STAMP_REPLY, "TIME_STAMP_REPLY")
        .word(IcmpType::INFO_REQUEST, "INFO_REQUEST")
        .word(IcmpType::INFO_REPLY, "INFO_REPLY")
        .word(IcmpType::ADDR_MASK_REQUEST, "ADDR_MASK_REQUEST")
        .word(IcmpType::ADDR_MASK_REPLY, "ADDR_MASK_REPLY")
        .word(IcmpType::TRACEROUTE, "TRACEROUTE")
        .word(IcmpType::CONVERSION_ERROR, "CONVERSION_ERROR")
        .word(IcmpType::MOBILE_REDIRECT, "MOBILE_REDIRECT")
        .default_name_with(|t: &IcmpType| {
            if t.is_valid() {
                t.raw().to_string()
            } else {
                "INVALID".to_string()
            }
        })
        .default_key(IcmpType::INVALID)
        .finish()
});

/// The process-wide ICMP type name table, immutable after construction.
pub fn lexicon() -> &'static Lexicon<IcmpType> {
    &ICMP_LEXICON
}

/// An ICMP message code. Just an 8 bit value, no special properties.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug,
)]
pub struct IcmpCode(u8);

impl IcmpCode {
    pub const MIN: Self = Self(u8::MIN);
    pub const MAX: Self = Self(u8::MAX);

    pub const fn new(code: u8) -> Self {
        Self(code)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl From<u8> for IcmpCode {
    fn from(raw: u8) -> Self {
        Self(raw)
    }
}

impl fmt::Display for IcmpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ICMP message: a type and a code. The code is carried data only; no
/// consistency with the type is checked, and comparisons consider the
/// type alone.
#[derive(Clone, Copy, Default, Debug)]
pub struct Icmp {
    mtype: IcmpType,
    code: IcmpCode,
}

impl Icmp {
    pub const MIN: Self = Self {
        mtype: IcmpType::MIN,
        code: IcmpCode::MIN,
    };
    pub const MAX: Self = Self {
        mtype: IcmpType::MAX,
        code: IcmpCode::MAX,
    };

    pub fn new(mtype: IcmpType, code: IcmpCode) -> Self {
        Self { mtype, code }
    }

    pub fn message_type(&self) -> IcmpType {
        self.mtype
    }

    pub fn code(&self) -> IcmpCode {
        self.code
    }
}

impl From<IcmpType> for Icmp {
    fn from(mtype: IcmpType) -> Self {
        Self {
            mtype,
            code: IcmpCode::default(),
        }
    }
}

impl PartialEq for Icmp {
    fn eq(&self, other: &Self) -> bool {
        self.mtype == other.mtype
    }
}

impl Eq for Icmp {}

impl PartialOrd for Icmp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Icmp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.mtype.cmp(&other.mtype)
    }
}

impl Hash for Icmp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.mtype.hash(state);
    }
}

impl fmt::Display for Icmp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mtype)
    }
}
