//! Shared helpers for the scenario tests.

use slog::{o, Drain, Logger};
use std::env;

/// A terminal logger gated on `RUST_LOG`, defaulting to warnings.
pub fn test_logger() -> Logger {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "warn");
    }
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_envlogger::new(drain).fuse();
    Logger::root(std::sync::Mutex::new(drain).fuse(), o!())
}

/// A small deterministic generator for churn tests.
pub struct XorShift(pub u32);

impl XorShift {
    pub fn next(&mut self) -> u32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
        self.0
    }
}
