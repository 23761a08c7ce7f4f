// LEAP for Rust
// SPDX-License-Identifier: MPL-2.0

#![warn(missing_docs)]

//! Message and model types shared by the LEAP client crates.
//!
//! LEAP is Lutron's line-delimited JSON protocol. This crate holds the
//! request/response envelope, the typed message bodies the client consumes,
//! the value enums of the bridge model (fan speeds, occupancy, button
//! events, color tuning), and the common [`Error`] type. It contains no
//! async code.

mod body;
mod color;
mod device;
mod error;
mod fade;
mod href;
mod messages;
mod status;

pub use body::{
    AreaDefinition, AreaRef, AreaStatus, ButtonDefinition, ButtonEventBody, ButtonGroupExpanded,
    ButtonStatus, ControlStationDefinition, DeviceDefinition, Engraving, GangedDevice,
    GangedDeviceRef, Href, LedStatus, MultipleAreaDefinition, MultipleAreaStatus,
    MultipleButtonDefinition, MultipleButtonGroupExpandedDefinition,
    MultipleControlStationDefinition, MultipleDeviceDefinition,
    MultipleOccupancyGroupDefinition, MultipleOccupancyGroupStatus,
    MultipleVirtualButtonDefinition, MultipleZoneDefinition, MultipleZoneStatus,
    OccupancyGroupDefinition, OccupancyGroupRef, OccupancyGroupStatus, OccupancySensorRef,
    OneButtonStatusEvent, OneDeviceDefinition, OneLedStatus, OnePingResponse,
    OneProjectDefinition, OneZoneStatus, PingResponse, ProjectDefinition, SerialNumber,
    VirtualButtonDefinition, ZoneDefinition, ZoneStatus,
};
pub use color::{ColorValue, WarmDimmingValue};
pub use device::{
    device_domain, is_dimmable, is_spectrum_tune, is_white_tune, ButtonEvent, DeviceDomain,
    FanSpeed, OccupancyStatus, RA3_KEYPAD_DEVICE_TYPES, RA3_OCCUPANCY_SENSOR_DEVICE_TYPES,
    RA3_PROJECT_TYPES,
};
pub use error::{BridgeResponseError, Error};
pub use fade::fade_time_string;
pub use href::id_from_href;
pub use messages::{make_tag, CommuniqueType, RequestEnvelope, RequestHeader, Response, ResponseHeader};
pub use status::ResponseStatus;

/// Result type used throughout the LEAP crates.
pub type Result<T> = std::result::Result<T, Error>;
