// LEAP for Rust
// SPDX-License-Identifier: MPL-2.0

#![warn(missing_docs)]

//! Client runtime for Lutron lighting-control bridges speaking LEAP.
//!
//! The entry point is [`Smartbridge`]. It owns a supervised session to one
//! bridge: it connects over client-authenticated TLS, loads the bridge
//! topology into an in-memory model, keeps the connection alive with
//! pings, reconnects with backoff after any failure, and fans incoming
//! state-change events out to registered subscribers.
//!
//! ```no_run
//! use leap_client::Smartbridge;
//!
//! # async fn demo() -> leap_types::Result<()> {
//! let bridge = Smartbridge::create_tls(
//!     "192.168.1.40",
//!     leap_client::LEAP_PORT,
//!     "caseta-bridge.crt".as_ref(),
//!     "caseta.crt".as_ref(),
//!     "caseta.key".as_ref(),
//! )?;
//! bridge.connect().await?;
//! bridge.set_value("2", 50, None).await?;
//! # Ok(())
//! # }
//! ```

mod bridge;
mod connect;
mod events;
mod model;
mod session;
mod topology;

pub use bridge::{ButtonSubscriber, DeviceSubscriber, OccupancySubscriber, Smartbridge};
pub use connect::{Connector, LeapStream, TlsConnector, LEAP_PORT};
pub use model::{Area, Button, Device, KeypadLed, OccupancyGroup, Scene};
pub use session::{CONNECT_TIMEOUT, PING_INTERVAL, RECONNECT_DELAY, REQUEST_TIMEOUT};
