// LEAP for Rust
// SPDX-License-Identifier: MPL-2.0

//! Color values for spectrum-tuning and white-tuning lights.

use serde_json::{json, Value};

/// A color for spectrum tune or white tune lights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorValue {
    /// A color specified as hue and saturation.
    FullColor {
        /// Hue of the bulb, 0–360.
        hue: u16,
        /// Saturation of the bulb, 0–100.
        saturation: u8,
    },
    /// A color temperature.
    WarmCool {
        /// Temperature in kelvin.
        kelvin: u16,
    },
}

impl ColorValue {
    /// The tuning-level fragment of this color.
    fn tuning_level(&self) -> Value {
        match self {
            ColorValue::FullColor { hue, saturation } => json!({
                "HSVTuningLevel": {"Hue": hue, "Saturation": saturation}
            }),
            ColorValue::WarmCool { kelvin } => json!({
                "WhiteTuningLevel": {"Kelvin": kelvin}
            }),
        }
    }

    /// Parameters for a `GoToSpectrumTuningLevel` command.
    pub fn spectrum_tuning_parameters(&self) -> Value {
        json!({"ColorTuningStatus": self.tuning_level()})
    }

    /// Parameters for a `GoToWhiteTuningLevel` command.
    pub fn white_tuning_parameters(&self) -> Value {
        self.tuning_level()
    }

    /// Extract the color from a raw `ColorTuningStatus` fragment of a zone
    /// status, if one is set.
    pub fn from_zone_status(color_tuning_status: &Value) -> Option<ColorValue> {
        if let Some(white) = color_tuning_status.get("WhiteTuningLevel") {
            let kelvin = white.get("Kelvin")?.as_u64()?;
            return Some(ColorValue::WarmCool {
                kelvin: u16::try_from(kelvin).ok()?,
            });
        }
        if let Some(hsv) = color_tuning_status.get("HSVTuningLevel") {
            let hue = hsv.get("Hue")?.as_u64()?;
            let saturation = hsv.get("Saturation")?.as_u64()?;
            return Some(ColorValue::FullColor {
                hue: u16::try_from(hue).ok()?,
                saturation: u8::try_from(saturation).ok()?,
            });
        }
        None
    }
}

/// Warm dimming, which shifts a light warmer as it dims along a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarmDimmingValue {
    /// Whether warm dimming is enabled.
    pub enabled: bool,
}

impl WarmDimmingValue {
    /// Create a warm dimming value.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// The `CurveDimming` fragment for applying warm dimming.
    pub fn curve_dimming_parameters(&self) -> Value {
        if self.enabled {
            json!({"CurveDimming": {"Curve": {"href": "/curve/1"}}})
        } else {
            json!({"CurveDimming": null})
        }
    }

    /// Whether warm dimming is active for a raw `ColorTuningStatus`
    /// fragment, or `None` if the fragment carries no curve information.
    pub fn from_zone_status(color_tuning_status: &Value) -> Option<bool> {
        let curve = color_tuning_status.get("CurveDimming")?;
        Some(!curve.is_null() && curve.get("Curve").is_some())
    }
}
