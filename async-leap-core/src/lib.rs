// LEAP for Rust
// SPDX-License-Identifier: MPL-2.0

#![warn(missing_docs)]

//! Transport-level plumbing for the LEAP protocol: the CR-LF JSON frame
//! codec and the tag-multiplexed request/response protocol that runs on
//! top of one framed stream.

mod codec;
mod protocol;

pub use codec::LeapCodec;
pub use protocol::{
    HandlerId, LeapEventLoop, LeapProtocol, SubscriptionCallback, UnsolicitedHandler,
};
