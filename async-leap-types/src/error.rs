// LEAP for Rust
// SPDX-License-Identifier: MPL-2.0

//! LEAP client errors.

use thiserror::Error;

use crate::messages::Response;

/// Raised when the bridge answers a request with a non-2xx status.
///
/// Carries the full response so the caller can inspect the body.
#[derive(Debug, Error)]
#[error("bridge response error: {}", status_string(.0))]
pub struct BridgeResponseError(pub Response);

impl BridgeResponseError {
    /// The response returned by the bridge.
    pub fn response(&self) -> &Response {
        &self.0
    }

    /// The status code returned by the bridge, if any.
    pub fn code(&self) -> Option<i32> {
        self.0.header.status_code.as_ref().and_then(|s| s.code)
    }
}

fn status_string(response: &Response) -> String {
    match &response.header.status_code {
        Some(status) => status.to_string(),
        None => "no status code".to_string(),
    }
}

/// Errors surfaced by the LEAP client crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The connection was lost while a request was outstanding, or an
    /// operation was attempted while no session is live.
    #[error("the bridge is disconnected")]
    Disconnected,

    /// A request or subscribe did not complete within the request timeout.
    #[error("request timed out")]
    TimedOut,

    /// The bridge answered with a non-successful status code.
    #[error(transparent)]
    BridgeResponse(#[from] BridgeResponseError),

    /// An inbound frame was not valid UTF-8 JSON. Fatal for the current
    /// connection.
    #[error("failed to parse an inbound frame: {0}")]
    Parse(String),

    /// I/O failure on the underlying stream.
    #[error("stream error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid hostname, missing certificate files, malformed PEM and the
    /// like. Raised by the connector before a connection is attempted.
    #[error("configuration error: {0}")]
    Config(String),

    /// A resource reference that does not follow the `/kind/id` shape.
    #[error("cannot find an id in href {0:?}")]
    InvalidHref(String),

    /// An operation referenced a device id that is not in the model.
    #[error("unknown device {0}")]
    UnknownDevice(String),

    /// An operation referenced a scene id that is not in the model.
    #[error("unknown scene {0}")]
    UnknownScene(String),

    /// A button tap referenced a button that does not exist under the
    /// given keypad and button group.
    #[error("no button {button} in group {group} on keypad {keypad}")]
    UnknownButton {
        /// The keypad device id passed by the caller.
        keypad: String,
        /// The button group id passed by the caller.
        group: String,
        /// The button id passed by the caller.
        button: String,
    },
}
