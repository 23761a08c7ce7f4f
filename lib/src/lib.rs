// LEAP for Rust
// SPDX-License-Identifier: MPL-2.0

//! An asynchronous Rust client for Lutron lighting-control bridges
//! speaking LEAP, the line-delimited JSON protocol used by Caseta smart
//! bridges and RadioRA 3 / HomeWorks QSX processors.
//!
//! The [`client::Smartbridge`] façade is the entry point; see its crate
//! documentation for an example.

#[cfg(feature = "client")]
pub use leap_client as client;
pub use leap_core as core;
pub use leap_types as types;

/// Convenience logging setup for binaries and examples.
#[cfg(feature = "console-logging")]
pub mod console_logging {
    /// Install an `env_logger` writing to stderr, defaulting to `info`.
    pub fn init() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .init();
    }
}
