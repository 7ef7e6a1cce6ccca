// Copyright 2022 Oxide Computer Company

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Error produced when text does not match the grammar of the value being
/// parsed.
///
/// The parse target is left at its documented default when this is
/// returned: address `0.0.0.0`, mask `0`, empty range, invalid
/// protocol/ICMP sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// What the text was being parsed as, e.g. `"IPv4 address"`.
    pub target: &'static str,

    /// The offending input.
    pub input: String,

    /// Message associated with this error.
    pub message: String,
}

impl ParseError {
    pub fn new(
        target: &'static str,
        input: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            target,
            input: input.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {}: {}",
            "error".bright_red(),
            format!("invalid {}", self.target).bright_white().bold(),
            format!("{:?}", self.input).bright_red(),
            self.message,
        )
    }
}

impl std::error::Error for ParseError {}

/// Ancillary data was requested from a service whose protocol does not
/// carry that kind of data.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceError {
    #[error("protocol {0} does not carry a port")]
    NotPort(i32),

    #[error("protocol {0} does not carry an ICMP message")]
    NotIcmp(i32),
}

/// Failure to change the set of associations in a lexicon.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexiconError {
    #[error("name {0:?} is already bound to a different value")]
    NameTaken(String),
}
