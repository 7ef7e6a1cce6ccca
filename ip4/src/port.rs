// Copyright 2022 Oxide Computer Company

//! UDP/TCP ports.

use std::fmt;
use std::ops;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::ParseError;
use crate::interval::Metric;
use crate::lexicon::Lexicon;

/// A UDP/TCP port, stored in host order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
pub struct IpPort(u16);

impl IpPort {
    /// The width of the type in bits.
    pub const WIDTH: u32 = 16;

    pub const MIN: Self = Self(u16::MIN);
    pub const MAX: Self = Self(u16::MAX);

    pub const fn new(port: u16) -> Self {
        Self(port)
    }

    /// The port value in host type and order.
    pub const fn raw(self) -> u16 {
        self.0
    }

    pub fn set(&mut self, port: u16) {
        self.0 = port;
    }

    /// The port value in network byte order.
    pub fn to_network_order(self) -> u16 {
        self.0.to_be()
    }

    pub fn from_network_order(raw: u16) -> Self {
        Self(u16::from_be(raw))
    }

    /// The name used when formatting with the port lexicon: the primary
    /// name if one is registered, the decimal value otherwise.
    pub fn name(self) -> String {
        match lexicon().name(self) {
            Some(name) => name,
            None => self.0.to_string(),
        }
    }
}

impl Metric for IpPort {
    const MIN: Self = Self::MIN;
    const MAX: Self = Self::MAX;

    fn succ(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    fn pred(self) -> Option<Self> {
        self.0.checked_sub(1).map(Self)
    }
}

impl From<u16> for IpPort {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<IpPort> for u16 {
    fn from(p: IpPort) -> u16 {
        p.0
    }
}

impl ops::Add for IpPort {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl ops::Sub for IpPort {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl ops::Add<u16> for IpPort {
    type Output = Self;

    fn add(self, rhs: u16) -> Self {
        Self(self.0.wrapping_add(rhs))
    }
}

impl ops::Sub<u16> for IpPort {
    type Output = Self;

    fn sub(self, rhs: u16) -> Self {
        Self(self.0.wrapping_sub(rhs))
    }
}

impl fmt::Display for IpPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for IpPort {
    type Err = ParseError;

    /// Parse a decimal port number or a name from the port lexicon.
    fn from_str(s: &str) -> Result<Self, ParseError> {
        let text = s.trim();
        if text.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return text
                .parse::<u16>()
                .map(Self)
                .map_err(|_| ParseError::new("port", s, "out of range"));
        }
        lexicon()
            .key(text)
            .ok_or_else(|| ParseError::new("port", s, "unknown name"))
    }
}

static PORT_LEXICON: LazyLock<Lexicon<IpPort>> = LazyLock::new(|| {
    let w = IpPort::new;
    Lexicon::build()
        .word(w(7), "ECHO")
        .word(w(9), "DISCARD")
        .word(w(13), "DAYTIME")
        .word(w(19), "CHARGEN")
        .word(w(20), "FTP-DATA")
        .word(w(21), "FTP")
        .word(w(22), "SSH")
        .word(w(23), "TELNET")
        .word(w(25), "SMTP")
        .word(w(37), "TIME")
        .word(w(42), "NAMESERVER")
        .word(w(43), "WHOIS")
        .word(w(49), "TACACS")
        .word(w(53), "DNS")
        .alias("DOMAIN")
        .word(w(67), "BOOTPS")
        .word(w(68), "BOOTPC")
        .word(w(69), "TFTP")
        .word(w(70), "GOPHER")
        .word(w(79), "FINGER")
        .word(w(80), "HTTP")
        .alias("WWW")
        .alias("WEB")
        .word(w(90), "DNSIX")
        .word(w(101), "HOSTNAME")
        .word(w(109), "POP2")
        .word(w(110), "POP3")
        .word(w(111), "RPC")
        .alias("SUNRPC")
        .word(w(113), "IDENT")
        .word(w(119), "NNTP")
        .word(w(123), "NTP")
        .word(w(137), "NETBIOS-NS")
        .word(w(138), "NETBIOS-DGM")
        .word(w(139), "NETBIOS-SSN")
        .word(w(143), "IMAP")
        .word(w(161), "SNMP")
        .word(w(162), "SNMPTRAP")
        .word(w(177), "XDMP")
        .word(w(179), "BGP")
        .word(w(194), "IRC")
        .word(w(389), "LDAP")
        .word(w(434), "MOBILE-IP")
        .word(w(443), "HTTPS")
        .word(w(445), "SMB")
        .alias("MICROSOFT-DS")
        .word(w(496), "PIM-AUTO-RP")
        .word(w(500), "ISAKMP")
        .word(w(512), "BIFF")
        .alias("EXEC")
        .word(w(513), "LOGIN")
        .alias("WHO")
        .word(w(514), "SYSLOG")
        .word(w(515), "LDP")
        .word(w(517), "TALK")
        .word(w(520), "RIP")
        .word(w(540), "UUCP")
        .word(w(543), "KLOGIN")
        .word(w(544), "KSHELL")
        .word(w(750), "KERBEROS")
        .word(w(1352), "LOTUSNOTES")
        .word(w(1494), "CITRIX-ICA")
        .word(w(1521), "SQLNET")
        .word(w(1645), "RADIUS")
        .word(w(1646), "RADIUS-ACCT")
        .word(w(1720), "H323")
        .word(w(1723), "PPTP")
        .word(w(2748), "CTIQBE")
        .word(w(5190), "AOL")
        .word(w(5510), "SECUREID-UDP")
        .word(w(5631), "PCANYWHERE-DATA")
        .word(w(5632), "PCANYWHERE-STATUS")
        .default_name_with(|p| p.raw().to_string())
        .finish()
});

/// The process-wide port name table, immutable after construction.
pub fn lexicon() -> &'static Lexicon<IpPort> {
    &PORT_LEXICON
}
