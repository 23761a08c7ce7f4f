// LEAP for Rust
// SPDX-License-Identifier: MPL-2.0

//! Value enums and device-type classification tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Fan speeds understood by Lutron fan controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FanSpeed {
    /// Fan off.
    Off,
    /// Low speed.
    Low,
    /// Medium speed.
    Medium,
    /// Between medium and high.
    MediumHigh,
    /// High speed.
    High,
}

impl FanSpeed {
    /// The exact string sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            FanSpeed::Off => "Off",
            FanSpeed::Low => "Low",
            FanSpeed::Medium => "Medium",
            FanSpeed::MediumHigh => "MediumHigh",
            FanSpeed::High => "High",
        }
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The status reported by an occupancy group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OccupancyStatus {
    /// At least one sensor reports presence.
    Occupied,
    /// No sensor reports presence.
    Unoccupied,
    /// No status has been received yet.
    Unknown,
}

/// A button press-state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonEvent {
    /// The button went down.
    Press,
    /// The button came up.
    Release,
}

/// Coarse functional classification of a device, as used by
/// `get_devices_by_domain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceDomain {
    /// Dimmable loads.
    Light,
    /// On/off loads.
    Switch,
    /// Shades and blinds.
    Cover,
    /// Fan speed controllers.
    Fan,
    /// Remotes and occupancy sensors.
    Sensor,
    /// Wall keypads.
    Keypad,
}

impl DeviceDomain {
    /// The lowercase name of the domain.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceDomain::Light => "light",
            DeviceDomain::Switch => "switch",
            DeviceDomain::Cover => "cover",
            DeviceDomain::Fan => "fan",
            DeviceDomain::Sensor => "sensor",
            DeviceDomain::Keypad => "keypad",
        }
    }
}

impl fmt::Display for DeviceDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceDomain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "light" => Ok(DeviceDomain::Light),
            "switch" => Ok(DeviceDomain::Switch),
            "cover" => Ok(DeviceDomain::Cover),
            "fan" => Ok(DeviceDomain::Fan),
            "sensor" => Ok(DeviceDomain::Sensor),
            "keypad" => Ok(DeviceDomain::Keypad),
            other => Err(Error::Config(format!("unknown device domain {other:?}"))),
        }
    }
}

const LIGHT_TYPES: &[&str] = &[
    "WallDimmer",
    "PlugInDimmer",
    "InLineDimmer",
    "SunnataDimmer",
    "TempInWallPaddleDimmer",
    "WallDimmerWithPreset",
    "Dimmed",
    "SpectrumTune",
    "KetraLamp",
];

const SWITCH_TYPES: &[&str] = &[
    "WallSwitch",
    "OutdoorPlugInSwitch",
    "PlugInSwitch",
    "InLineSwitch",
    "PowPakSwitch",
    "SunnataSwitch",
    "TempInWallPaddleSwitch",
    "Switched",
];

const FAN_TYPES: &[&str] = &["CasetaFanSpeedController", "MaestroFanSpeedController", "FanSpeed"];

const COVER_TYPES: &[&str] = &[
    "SerenaHoneycombShade",
    "SerenaRollerShade",
    "TriathlonHoneycombShade",
    "TriathlonRollerShade",
    "QsWirelessShade",
    "QsWirelessHorizontalSheerBlind",
    "QsWirelessWoodBlind",
    "RightDrawDrape",
    "Shade",
    "SerenaTiltOnlyWoodBlind",
    "PalladiomWireFreeShade",
];

const SENSOR_TYPES: &[&str] = &[
    "Pico1Button",
    "Pico2Button",
    "Pico2ButtonRaiseLower",
    "Pico3Button",
    "Pico3ButtonRaiseLower",
    "Pico4Button",
    "Pico4ButtonScene",
    "Pico4ButtonZone",
    "Pico4Button2Group",
    "FourGroupRemote",
];

/// Keypad device types found on RA3 and QSX control stations.
pub const RA3_KEYPAD_DEVICE_TYPES: &[&str] = &[
    "SunnataKeypad",
    "SunnataHybridKeypad",
    "PalladiomKeypad",
    "InternationalSeetouchKeypad",
    "SeeTouchHybridKeypad",
];

/// Device types that act as occupancy sensors on RA3 and QSX systems.
pub const RA3_OCCUPANCY_SENSOR_DEVICE_TYPES: &[&str] = &[
    "RPSOccupancySensor",
    "RPSCeilingMountedOccSensor",
    "RPSWallMountedOccSensor",
];

/// Project `ProductType` values that select the RA3/QSX topology branch.
pub const RA3_PROJECT_TYPES: &[&str] = &["Lutron RadioRA 3 Project", "Lutron HWQS Project"];

const DIMMABLE_TYPES: &[&str] = &[
    "WallDimmer",
    "PlugInDimmer",
    "InLineDimmer",
    "SunnataDimmer",
    "TempInWallPaddleDimmer",
    "WallDimmerWithPreset",
    "Dimmed",
];

const SPECTRUM_TUNE_TYPES: &[&str] = &["KetraLamp", "SpectrumTune"];

const WHITE_TUNE_TYPES: &[&str] = &["WhiteTune", "LumarisTypeXLinearTunableWhite"];

/// Classify a LEAP device type string into a domain, if it has one.
///
/// The bridge itself, occupancy sensors and other non-controllable
/// endpoints have no domain.
pub fn device_domain(device_type: &str) -> Option<DeviceDomain> {
    if LIGHT_TYPES.contains(&device_type) {
        Some(DeviceDomain::Light)
    } else if SWITCH_TYPES.contains(&device_type) {
        Some(DeviceDomain::Switch)
    } else if FAN_TYPES.contains(&device_type) {
        Some(DeviceDomain::Fan)
    } else if COVER_TYPES.contains(&device_type) {
        Some(DeviceDomain::Cover)
    } else if SENSOR_TYPES.contains(&device_type) {
        Some(DeviceDomain::Sensor)
    } else if RA3_KEYPAD_DEVICE_TYPES.contains(&device_type) {
        Some(DeviceDomain::Keypad)
    } else {
        None
    }
}

/// Whether a device type accepts `GoToDimmedLevel` with a fade time.
pub fn is_dimmable(device_type: &str) -> bool {
    DIMMABLE_TYPES.contains(&device_type)
}

/// Whether a device type is a spectrum-tuning lamp driven by
/// `GoToSpectrumTuningLevel`.
pub fn is_spectrum_tune(device_type: &str) -> bool {
    SPECTRUM_TUNE_TYPES.contains(&device_type)
}

/// Whether a device type is a white-tuning load driven by
/// `GoToWhiteTuningLevel`.
pub fn is_white_tune(device_type: &str) -> bool {
    WHITE_TUNE_TYPES.contains(&device_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_speed_wire_strings() {
        assert_eq!(
            serde_json::to_string(&FanSpeed::MediumHigh).unwrap(),
            "\"MediumHigh\""
        );
        let speed: FanSpeed = serde_json::from_str("\"Off\"").unwrap();
        assert_eq!(speed, FanSpeed::Off);
    }

    #[test]
    fn domains_cover_common_types() {
        assert_eq!(device_domain("WallDimmer"), Some(DeviceDomain::Light));
        assert_eq!(device_domain("WallSwitch"), Some(DeviceDomain::Switch));
        assert_eq!(
            device_domain("CasetaFanSpeedController"),
            Some(DeviceDomain::Fan)
        );
        assert_eq!(device_domain("SerenaRollerShade"), Some(DeviceDomain::Cover));
        assert_eq!(device_domain("Pico3ButtonRaiseLower"), Some(DeviceDomain::Sensor));
        assert_eq!(device_domain("SunnataKeypad"), Some(DeviceDomain::Keypad));
        assert_eq!(device_domain("SmartBridge"), None);
    }

    #[test]
    fn domain_parses_from_str() {
        assert_eq!("cover".parse::<DeviceDomain>().unwrap(), DeviceDomain::Cover);
        assert!("garage".parse::<DeviceDomain>().is_err());
    }

    #[test]
    fn ketra_is_spectrum_tune_not_dimmable() {
        assert!(is_spectrum_tune("KetraLamp"));
        assert!(!is_dimmable("KetraLamp"));
        assert!(is_dimmable("WallDimmer"));
    }
}
