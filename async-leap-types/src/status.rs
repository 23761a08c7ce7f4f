// LEAP for Rust
// SPDX-License-Identifier: MPL-2.0

//! Response status parsing.

use std::fmt;

use serde::de::{Deserializer, Error as _};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// A LEAP response status split into its code and message parts.
///
/// On the wire this is a single string such as `"200 OK"` or
/// `"404 NotFound"`. A status with no leading integer keeps the whole
/// string as the message and has no code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseStatus {
    /// The numeric status code, if the string started with one.
    pub code: Option<i32>,
    /// The rest of the status string.
    pub message: String,
}

impl ResponseStatus {
    /// Create a status from its parts.
    pub fn new(code: Option<i32>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Check whether the status code is in the range `[200, 300)`.
    pub fn is_successful(&self) -> bool {
        matches!(self.code, Some(code) if (200..300).contains(&code))
    }
}

impl From<&str> for ResponseStatus {
    fn from(data: &str) -> Self {
        match data.split_once(' ') {
            Some((code, message)) => match code.parse::<i32>() {
                Ok(code) => Self::new(Some(code), message),
                Err(_) => Self::new(None, data),
            },
            None => Self::new(None, data),
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} {}", code, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl Serialize for ResponseStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResponseStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Err(D::Error::custom("empty status code string"));
        }
        Ok(ResponseStatus::from(raw.as_str()))
    }
}
