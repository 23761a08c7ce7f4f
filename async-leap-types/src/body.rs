// LEAP for Rust
// SPDX-License-Identifier: MPL-2.0

//! Typed message bodies.
//!
//! One lenient record per `MessageBodyType` the client consumes. The
//! bridge freely omits fields depending on model and firmware, so almost
//! everything is optional; absent collections decode as empty.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::device::{ButtonEvent, FanSpeed, OccupancyStatus};

/// A reference to another resource, `{"href": "/kind/id"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Href {
    /// The resource path.
    pub href: String,
}

/// A serial number, numeric on Caseta bridges and free-form on newer
/// processors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SerialNumber {
    /// Numeric serial.
    Number(u64),
    /// Free-form serial.
    Text(String),
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerialNumber::Number(n) => write!(f, "{n}"),
            SerialNumber::Text(s) => f.write_str(s),
        }
    }
}

/// One record of a `MultipleDeviceDefinition` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceDefinition {
    /// The device's own reference.
    #[serde(default)]
    pub href: Option<String>,
    /// Short name.
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    /// Name path from the root area down to the device.
    #[serde(rename = "FullyQualifiedName", default)]
    pub fully_qualified_name: Vec<String>,
    /// Model number.
    #[serde(rename = "ModelNumber", default)]
    pub model_number: Option<String>,
    /// Serial number.
    #[serde(rename = "SerialNumber", default)]
    pub serial_number: Option<SerialNumber>,
    /// LEAP device type tag.
    #[serde(rename = "DeviceType", default)]
    pub device_type: Option<String>,
    /// Zones this device drives; loads have exactly one.
    #[serde(rename = "LocalZones", default)]
    pub local_zones: Vec<Href>,
    /// The area the device is assigned to.
    #[serde(rename = "AssociatedArea", default)]
    pub associated_area: Option<Href>,
    /// Button groups, for remotes and keypads.
    #[serde(rename = "ButtonGroups", default)]
    pub button_groups: Vec<Href>,
    /// Occupancy sensors hosted by this device.
    #[serde(rename = "OccupancySensors", default)]
    pub occupancy_sensors: Vec<Href>,
}

/// `MultipleDeviceDefinition` — the `/device` read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MultipleDeviceDefinition {
    /// The devices.
    #[serde(rename = "Devices", default)]
    pub devices: Vec<DeviceDefinition>,
}

/// `OneDeviceDefinition` — a single `/device/{id}` read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OneDeviceDefinition {
    /// The device.
    #[serde(rename = "Device", default)]
    pub device: Option<DeviceDefinition>,
}

/// Engraving information on a keypad button.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Engraving {
    /// The engraved text, possibly multi-line.
    #[serde(rename = "Text", default)]
    pub text: Option<String>,
}

/// One button definition, from `/button` or an expanded button group.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ButtonDefinition {
    /// The button's own reference.
    #[serde(default)]
    pub href: Option<String>,
    /// Wire name, e.g. `"Button 1"`.
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    /// Position of the button on its keypad.
    #[serde(rename = "ButtonNumber", default)]
    pub button_number: Option<u8>,
    /// Engraving, if the keypad supports it.
    #[serde(rename = "Engraving", default)]
    pub engraving: Option<Engraving>,
    /// The owning button group.
    #[serde(rename = "Parent", default)]
    pub parent: Option<Href>,
    /// The LED paired with this button, on keypads that have them.
    #[serde(rename = "AssociatedLED", default)]
    pub associated_led: Option<Href>,
}

/// `MultipleButtonDefinition` — the `/button` read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MultipleButtonDefinition {
    /// The buttons.
    #[serde(rename = "Buttons", default)]
    pub buttons: Vec<ButtonDefinition>,
}

/// One expanded button group of a keypad.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ButtonGroupExpanded {
    /// The group's own reference.
    #[serde(default)]
    pub href: Option<String>,
    /// The buttons in the group.
    #[serde(rename = "Buttons", default)]
    pub buttons: Vec<ButtonDefinition>,
}

/// `ExpandedButtonGroup` — the `/device/{id}/buttongroup/expanded` read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MultipleButtonGroupExpandedDefinition {
    /// The expanded groups.
    #[serde(rename = "ButtonGroupsExpanded", default)]
    pub button_groups_expanded: Vec<ButtonGroupExpanded>,
}

/// One scene definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VirtualButtonDefinition {
    /// The virtual button's own reference.
    #[serde(default)]
    pub href: Option<String>,
    /// Scene name; unnamed entries are placeholders.
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    /// Whether the bridge has an action programmed for this button.
    #[serde(rename = "IsProgrammed", default)]
    pub is_programmed: Option<bool>,
}

/// `MultipleVirtualButtonDefinition` — the `/virtualbutton` read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MultipleVirtualButtonDefinition {
    /// The virtual buttons.
    #[serde(rename = "VirtualButtons", default)]
    pub virtual_buttons: Vec<VirtualButtonDefinition>,
}

/// One area definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AreaDefinition {
    /// The area's own reference.
    #[serde(default)]
    pub href: Option<String>,
    /// Area name.
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    /// Parent area; the root has none.
    #[serde(rename = "Parent", default)]
    pub parent: Option<Href>,
    /// Occupancy groups covering this area.
    #[serde(rename = "AssociatedOccupancyGroups", default)]
    pub associated_occupancy_groups: Vec<OccupancyGroupRef>,
}

/// A reference wrapper around an occupancy group.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OccupancyGroupRef {
    /// The occupancy group.
    #[serde(rename = "OccupancyGroup", default)]
    pub occupancy_group: Option<Href>,
}

/// `MultipleAreaDefinition` — the `/area` read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MultipleAreaDefinition {
    /// The areas.
    #[serde(rename = "Areas", default)]
    pub areas: Vec<AreaDefinition>,
}

/// A reference wrapper around an occupancy sensor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OccupancySensorRef {
    /// The sensor.
    #[serde(rename = "OccupancySensor", default)]
    pub occupancy_sensor: Option<Href>,
}

/// A reference wrapper around an area.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AreaRef {
    /// The area.
    #[serde(rename = "Area", default)]
    pub area: Option<Href>,
}

/// One occupancy group definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OccupancyGroupDefinition {
    /// The group's own reference.
    #[serde(default)]
    pub href: Option<String>,
    /// The sensors aggregated by the group.
    #[serde(rename = "AssociatedSensors", default)]
    pub associated_sensors: Vec<OccupancySensorRef>,
    /// The areas the group reports for.
    #[serde(rename = "AssociatedAreas", default)]
    pub associated_areas: Vec<AreaRef>,
}

/// `MultipleOccupancyGroupDefinition` — the `/occupancygroup` read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MultipleOccupancyGroupDefinition {
    /// The occupancy groups.
    #[serde(rename = "OccupancyGroups", default)]
    pub occupancy_groups: Vec<OccupancyGroupDefinition>,
}

/// One entry of a bulk occupancy group status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OccupancyGroupStatus {
    /// The group the status belongs to.
    #[serde(rename = "OccupancyGroup", default)]
    pub occupancy_group: Option<Href>,
    /// The new status.
    #[serde(rename = "OccupancyStatus", default)]
    pub occupancy_status: Option<OccupancyStatus>,
}

/// `MultipleOccupancyGroupStatus` — occupancy subscription payloads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MultipleOccupancyGroupStatus {
    /// The statuses.
    #[serde(rename = "OccupancyGroupStatuses", default)]
    pub occupancy_group_statuses: Vec<OccupancyGroupStatus>,
}

/// One entry of a bulk area status, used by RA3/QSX processors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AreaStatus {
    /// The area status reference, `/area/{id}/status`.
    #[serde(default)]
    pub href: Option<String>,
    /// Occupancy for the area; entries without it are ignored.
    #[serde(rename = "OccupancyStatus", default)]
    pub occupancy_status: Option<OccupancyStatus>,
}

/// `MultipleAreaStatus` — the `/area/status` subscription payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MultipleAreaStatus {
    /// The statuses.
    #[serde(rename = "AreaStatuses", default)]
    pub area_statuses: Vec<AreaStatus>,
}

/// The state of one zone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZoneStatus {
    /// The status reference, `/zone/{id}/status`.
    #[serde(default)]
    pub href: Option<String>,
    /// The zone the status belongs to.
    #[serde(rename = "Zone", default)]
    pub zone: Option<Href>,
    /// Brightness or position, 0–100.
    #[serde(rename = "Level", default)]
    pub level: Option<i32>,
    /// Fan speed, for fan zones.
    #[serde(rename = "FanSpeed", default)]
    pub fan_speed: Option<FanSpeed>,
    /// Slat tilt, 0–100, for tilting blinds.
    #[serde(rename = "Tilt", default)]
    pub tilt: Option<i32>,
    /// Color tuning state, for spectrum and white tuning zones. Kept raw;
    /// see [`crate::ColorValue::from_zone_status`].
    #[serde(rename = "ColorTuningStatus", default)]
    pub color_tuning_status: Option<Value>,
}

/// `OneZoneStatus` — a single zone status read or event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OneZoneStatus {
    /// The status.
    #[serde(rename = "ZoneStatus", default)]
    pub zone_status: Option<ZoneStatus>,
}

/// `MultipleZoneStatus` — the bulk `/zone/status` subscription payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MultipleZoneStatus {
    /// The statuses.
    #[serde(rename = "ZoneStatuses", default)]
    pub zone_statuses: Vec<ZoneStatus>,
}

/// The inner button status of a `OneButtonStatusEvent`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ButtonStatus {
    /// The button.
    #[serde(rename = "Button", default)]
    pub button: Option<Href>,
    /// The event.
    #[serde(rename = "ButtonEvent", default)]
    pub button_event: Option<ButtonEventBody>,
}

/// The event half of a button status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ButtonEventBody {
    /// Press or Release.
    #[serde(rename = "EventType", default)]
    pub event_type: Option<ButtonEvent>,
}

/// `OneButtonStatusEvent` — a button press/release notification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OneButtonStatusEvent {
    /// The status.
    #[serde(rename = "ButtonStatus", default)]
    pub button_status: Option<ButtonStatus>,
}

/// The state of one keypad LED.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedStatus {
    /// The status reference, `/led/{id}/status`.
    #[serde(default)]
    pub href: Option<String>,
    /// The LED the status belongs to.
    #[serde(rename = "LED", default)]
    pub led: Option<Href>,
    /// `"On"` or `"Off"`.
    #[serde(rename = "State", default)]
    pub state: Option<String>,
}

/// `OneLEDStatus` — a single LED status read or event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OneLedStatus {
    /// The status.
    #[serde(rename = "LEDStatus", default)]
    pub led_status: Option<LedStatus>,
}

/// `OnePingResponse` — the `/server/1/status/ping` read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OnePingResponse {
    /// The ping response.
    #[serde(rename = "PingResponse", default)]
    pub ping_response: Option<PingResponse>,
}

/// The body of a ping response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PingResponse {
    /// The LEAP protocol version the bridge speaks.
    #[serde(rename = "LEAPVersion", default)]
    pub leap_version: Option<f64>,
}

/// `OneProjectDefinition` — the `/project` read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OneProjectDefinition {
    /// The project.
    #[serde(rename = "Project", default)]
    pub project: Option<ProjectDefinition>,
}

/// The project record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectDefinition {
    /// Project name.
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    /// The product family; decides the topology-load branch.
    #[serde(rename = "ProductType", default)]
    pub product_type: Option<String>,
}

/// One ganged device on a control station.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GangedDevice {
    /// The device.
    #[serde(rename = "Device", default)]
    pub device: Option<GangedDeviceRef>,
}

/// The device half of a ganged-device record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GangedDeviceRef {
    /// The device reference.
    #[serde(default)]
    pub href: Option<String>,
    /// LEAP device type tag.
    #[serde(rename = "DeviceType", default)]
    pub device_type: Option<String>,
    /// `"Addressed"` once the device is commissioned.
    #[serde(rename = "AddressedState", default)]
    pub addressed_state: Option<String>,
}

/// One control station definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ControlStationDefinition {
    /// The station's own reference.
    #[serde(default)]
    pub href: Option<String>,
    /// Station name.
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    /// The area the station is mounted in.
    #[serde(rename = "AssociatedArea", default)]
    pub associated_area: Option<Href>,
    /// The devices ganged into the station.
    #[serde(rename = "AssociatedGangedDevices", default)]
    pub associated_ganged_devices: Vec<GangedDevice>,
}

/// `MultipleControlStationDefinition` — the
/// `/area/{id}/associatedcontrolstation` read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MultipleControlStationDefinition {
    /// The stations.
    #[serde(rename = "ControlStations", default)]
    pub control_stations: Vec<ControlStationDefinition>,
}

/// One zone definition, from `/area/{id}/associatedzone`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZoneDefinition {
    /// The zone's own reference.
    #[serde(default)]
    pub href: Option<String>,
    /// Zone name.
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    /// How the zone is controlled, e.g. `"Dimmed"` or `"Switched"`.
    #[serde(rename = "ControlType", default)]
    pub control_type: Option<String>,
    /// The area the zone belongs to.
    #[serde(rename = "AssociatedArea", default)]
    pub associated_area: Option<Href>,
}

/// `MultipleZoneDefinition` — zones associated with an area.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MultipleZoneDefinition {
    /// The zones.
    #[serde(rename = "Zones", default)]
    pub zones: Vec<ZoneDefinition>,
}
