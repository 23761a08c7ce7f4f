// LEAP for Rust
// SPDX-License-Identifier: MPL-2.0

//! The in-memory representation of a bridge's topology.
//!
//! Entity maps are populated by the topology loader at login and mutated
//! only by the event router. Callers see clones through the accessor
//! methods on [`crate::Smartbridge`]; nothing hands out references into
//! the locked state.

use std::collections::HashMap;

use leap_types::{device_domain, ButtonEvent, ColorValue, DeviceDomain, FanSpeed, OccupancyStatus};

/// A room or other region of the installation.
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    /// Area id.
    pub id: String,
    /// Area name.
    pub name: String,
    /// The containing area; the root has none.
    pub parent_id: Option<String>,
}

/// A logical endpoint on the bridge: a load, a keypad, a sensor, the
/// bridge itself, or (on RA3) a keypad LED sub-device.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    /// Device id.
    pub id: String,
    /// Fully qualified name, joined with `_`.
    pub name: String,
    /// LEAP device type tag.
    pub device_type: String,
    /// Model number.
    pub model: Option<String>,
    /// Serial number.
    pub serial: Option<String>,
    /// The area the device belongs to.
    pub area_id: Option<String>,
    /// The zone this device drives, for loads.
    pub zone_id: Option<String>,
    /// Button groups, for remotes and keypads.
    pub button_group_ids: Vec<String>,
    /// Occupancy sensors hosted by the device.
    pub occupancy_sensor_ids: Vec<String>,
    /// The owning keypad, for LED sub-devices.
    pub parent_device_id: Option<String>,
    /// Current level: -1 until the first status arrives, then 0–100.
    pub current_state: i32,
    /// Current fan speed, for fan controllers.
    pub fan_speed: Option<FanSpeed>,
    /// Current slat tilt, 0–100, for tilting blinds.
    pub tilt: Option<i32>,
    /// Current color, for spectrum and white tuning lights.
    pub color: Option<ColorValue>,
    /// Whether warm dimming is active, where supported.
    pub warm_dim: Option<bool>,
}

impl Device {
    /// The functional domain of this device, if it has one.
    pub fn domain(&self) -> Option<DeviceDomain> {
        device_domain(&self.device_type)
    }

    /// Whether the device is on: level above zero, or a fan running at
    /// any non-Off speed.
    pub fn is_on(&self) -> bool {
        self.current_state > 0 || self.fan_speed.is_some_and(|speed| speed != FanSpeed::Off)
    }
}

/// A physical button on a remote or keypad.
#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    /// Button id.
    pub id: String,
    /// The device the button sits on.
    pub device_id: String,
    /// The button group the button belongs to.
    pub group_id: String,
    /// Position of the button on its keypad.
    pub number: Option<u8>,
    /// Engraved name, canonical raise/lower name, or the wire name.
    pub name: String,
    /// Last observed press state; starts as released.
    pub current_state: ButtonEvent,
    /// The LED paired with the button, on keypads that have them.
    pub led_id: Option<String>,
}

/// A keypad LED. State is -1 until the first status arrives, then 100
/// for on and 0 for off, matching the level convention of devices.
#[derive(Debug, Clone, PartialEq)]
pub struct KeypadLed {
    /// LED id.
    pub id: String,
    /// The keypad the LED sits on.
    pub device_id: String,
    /// The button the LED is paired with.
    pub button_id: String,
    /// -1 unknown, 100 on, 0 off.
    pub state: i32,
}

/// A bridge-programmed scene, triggered through its virtual button.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Virtual button id.
    pub id: String,
    /// Scene name.
    pub name: String,
}

/// An aggregation of occupancy sensors reporting one status per area.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyGroup {
    /// Group id. On RA3 systems this is the area id.
    pub id: String,
    /// Display name, `"<area> Occupancy"`.
    pub name: String,
    /// The area the group reports for.
    pub area_id: Option<String>,
    /// The sensors feeding the group.
    pub sensor_ids: Vec<String>,
    /// Last reported status.
    pub status: OccupancyStatus,
}

/// Where a RA3 button lives, for routing its events to the owning keypad.
#[derive(Debug, Clone)]
pub(crate) struct Ra3ButtonIndex {
    pub device_id: String,
    #[allow(dead_code)]
    pub group_id: String,
}

/// Where a RA3 LED lives.
#[derive(Debug, Clone)]
pub(crate) struct Ra3LedIndex {
    pub device_id: String,
    #[allow(dead_code)]
    pub group_id: String,
    pub button_id: String,
}

/// All model data for one bridge. Entity maps survive reconnects (they
/// are refreshed in place after each login); the cross-indexes are
/// rebuilt from scratch every login.
#[derive(Debug, Default)]
pub(crate) struct BridgeState {
    pub areas: HashMap<String, Area>,
    pub devices: HashMap<String, Device>,
    pub buttons: HashMap<String, Button>,
    pub leds: HashMap<String, KeypadLed>,
    pub scenes: HashMap<String, Scene>,
    pub occupancy_groups: HashMap<String, OccupancyGroup>,

    pub zone_to_device: HashMap<String, String>,
    pub button_group_to_device: HashMap<String, String>,
    pub ra3_buttons: HashMap<String, Ra3ButtonIndex>,
    pub ra3_leds: HashMap<String, Ra3LedIndex>,
    pub occupancy_group_areas: HashMap<String, Vec<String>>,
}

impl BridgeState {
    /// Drop everything a new login rebuilds, keeping entity state so
    /// levels survive a reconnect until fresh statuses arrive.
    pub fn begin_login(&mut self) {
        self.zone_to_device.clear();
        self.button_group_to_device.clear();
        self.ra3_buttons.clear();
        self.ra3_leds.clear();
        self.occupancy_group_areas.clear();
    }
}
