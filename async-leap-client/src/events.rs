// LEAP for Rust
// SPDX-License-Identifier: MPL-2.0

//! The event router.
//!
//! Translates inbound LEAP payloads into model mutations and invokes the
//! per-entity subscriber callbacks. Everything here runs on the read-loop
//! task, so callbacks for one entity fire strictly in arrival order; a
//! slow callback delays all subsequent event processing, so callbacks
//! must not block.
//!
//! Model locks are released before any callback runs, so a callback may
//! call back into the bridge accessors.

use std::panic::{catch_unwind, AssertUnwindSafe};

use log::{debug, error, trace, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use leap_types::{
    id_from_href, ColorValue, MultipleAreaStatus, MultipleOccupancyGroupStatus,
    MultipleZoneStatus, OccupancyStatus, OneButtonStatusEvent, OneLedStatus, OneZoneStatus,
    Response, WarmDimmingValue, ZoneStatus,
};

use crate::bridge::BridgeInner;
use crate::model::Device;

const LED_ON: i32 = 100;
const LED_OFF: i32 = 0;

fn dispatch(what: &str, callback: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(callback)).is_err() {
        error!("{what} subscriber callback panicked");
    }
}

fn decode<T: DeserializeOwned + Default>(body: Option<&Value>, what: &str) -> T {
    match body {
        Some(body) => match serde_json::from_value(body.clone()) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("unexpected {what} body: {e}");
                T::default()
            }
        },
        None => {
            debug!("{what} message carried no body");
            T::default()
        }
    }
}

/// The single unsolicited handler registered on every connection.
/// Dispatches on `(CommuniqueType, MessageBodyType)`.
pub(crate) fn handle_unsolicited(inner: &BridgeInner, response: &Response) {
    let communique_type = response.communique_type.as_deref();
    let body_type = response.header.message_body_type.as_deref();
    match (communique_type, body_type) {
        (Some("ReadResponse"), Some("OneZoneStatus")) => handle_one_zone_status(inner, response),
        (Some("ReadResponse"), Some("OneLEDStatus")) => handle_led_status(inner, None, response),
        _ => {
            trace!("ignoring unsolicited {communique_type:?}/{body_type:?} message");
        }
    }
}

/// A single zone status, arriving unsolicited (Caseta), from the bulk
/// subscription (RA3), or as the answer to a zone status read during
/// login.
pub(crate) fn handle_one_zone_status(inner: &BridgeInner, response: &Response) {
    let body: OneZoneStatus = decode(response.body(), "OneZoneStatus");
    if let Some(status) = body.zone_status {
        apply_zone_status(inner, &status);
    }
}

/// Bulk zone statuses from the RA3 `/zone/status` subscription.
pub(crate) fn handle_multi_zone_status(inner: &BridgeInner, response: &Response) {
    let body: MultipleZoneStatus = decode(response.body(), "MultipleZoneStatus");
    for status in &body.zone_statuses {
        apply_zone_status(inner, status);
    }
}

fn apply_zone_status(inner: &BridgeInner, status: &ZoneStatus) {
    let zone_href = status
        .zone
        .as_ref()
        .map(|zone| zone.href.as_str())
        .or(status.href.as_deref());
    let Some(zone_href) = zone_href else {
        warn!("zone status without a zone reference");
        return;
    };
    let zone_id = match id_from_href(zone_href) {
        Ok(id) => id.to_string(),
        Err(e) => {
            warn!("zone status with a bad reference: {e}");
            return;
        }
    };

    let updated: Option<(String, Device)> = {
        let mut state = inner.state.lock();
        let Some(device_id) = state.zone_to_device.get(&zone_id).cloned() else {
            debug!("status for unknown zone {zone_id}");
            return;
        };
        let Some(device) = state.devices.get_mut(&device_id) else {
            return;
        };
        if let Some(level) = status.level {
            if level >= 0 {
                device.current_state = level;
            }
        }
        device.fan_speed = status.fan_speed;
        device.tilt = status.tilt;
        if let Some(color_status) = &status.color_tuning_status {
            device.color = ColorValue::from_zone_status(color_status);
            device.warm_dim = WarmDimmingValue::from_zone_status(color_status);
        }
        Some((device_id.clone(), device.clone()))
    };

    if let Some((device_id, device)) = updated {
        notify_device(inner, &device_id, &device);
    }
}

fn notify_device(inner: &BridgeInner, device_id: &str, device: &Device) {
    let callback = inner.subscribers.lock().devices.get(device_id).cloned();
    if let Some(callback) = callback {
        dispatch("device", || callback(device));
    }
}

/// Bulk occupancy group statuses, both the subscribe response processed
/// at login and later tagged frames.
pub(crate) fn handle_occupancy_status(inner: &BridgeInner, response: &Response) {
    let body: MultipleOccupancyGroupStatus = decode(response.body(), "MultipleOccupancyGroupStatus");
    for status in &body.occupancy_group_statuses {
        let Some(group) = &status.occupancy_group else {
            continue;
        };
        let Ok(group_id) = id_from_href(&group.href) else {
            warn!("occupancy status with a bad group reference {:?}", group.href);
            continue;
        };
        let Some(new_status) = status.occupancy_status else {
            continue;
        };
        apply_occupancy_status(inner, group_id, new_status);
    }
}

/// Bulk area statuses from the RA3 `/area/status` subscription. Groups
/// are keyed by area id there; entries without occupancy are ignored.
pub(crate) fn handle_area_status(inner: &BridgeInner, response: &Response) {
    let body: MultipleAreaStatus = decode(response.body(), "MultipleAreaStatus");
    for status in &body.area_statuses {
        let Some(href) = &status.href else {
            continue;
        };
        let Ok(area_id) = id_from_href(href) else {
            warn!("area status with a bad reference {href:?}");
            continue;
        };
        let Some(new_status) = status.occupancy_status else {
            continue;
        };
        apply_occupancy_status(inner, area_id, new_status);
    }
}

fn apply_occupancy_status(inner: &BridgeInner, group_id: &str, new_status: OccupancyStatus) {
    let updated = {
        let mut state = inner.state.lock();
        match state.occupancy_groups.get_mut(group_id) {
            Some(group) => {
                group.status = new_status;
                true
            }
            None => {
                debug!("status for unknown occupancy group {group_id}");
                false
            }
        }
    };
    if !updated {
        return;
    }

    let callback = inner.subscribers.lock().occupancy.get(group_id).cloned();
    if let Some(callback) = callback {
        dispatch("occupancy", || callback(new_status));
    }
}

/// A press/release event for one button, delivered on the per-button
/// tagged subscription created at login.
pub(crate) fn handle_button_event(inner: &BridgeInner, button_id: &str, response: &Response) {
    let body: OneButtonStatusEvent = decode(response.body(), "OneButtonStatusEvent");
    let Some(event) = body
        .button_status
        .and_then(|status| status.button_event)
        .and_then(|event| event.event_type)
    else {
        warn!("button event for {button_id} without an event type");
        return;
    };

    let keypad: Option<(String, Device)> = {
        let mut state = inner.state.lock();
        if let Some(button) = state.buttons.get_mut(button_id) {
            button.current_state = event;
        } else {
            debug!("event for unknown button {button_id}");
        }
        state
            .ra3_buttons
            .get(button_id)
            .map(|index| index.device_id.clone())
            .and_then(|device_id| {
                state
                    .devices
                    .get(&device_id)
                    .cloned()
                    .map(|device| (device_id, device))
            })
    };

    let callback = inner.subscribers.lock().buttons.get(button_id).cloned();
    if let Some(callback) = callback {
        dispatch("button", || callback(event));
    }

    // On RA3 the button belongs to a keypad device whose subscribers also
    // want to know.
    if let Some((device_id, device)) = keypad {
        notify_device(inner, &device_id, &device);
    }
}

/// A status for one keypad LED, either from its tagged subscription
/// (`led_id` known from the subscribe) or unsolicited as `OneLEDStatus`.
pub(crate) fn handle_led_status(inner: &BridgeInner, led_id: Option<&str>, response: &Response) {
    let body: OneLedStatus = decode(response.body(), "OneLEDStatus");
    let Some(status) = body.led_status else {
        return;
    };

    let from_body = status
        .led
        .as_ref()
        .map(|led| led.href.as_str())
        .or(status.href.as_deref())
        .and_then(|href| id_from_href(href).ok());
    let Some(led_id) = led_id.or(from_body) else {
        warn!("LED status without an LED reference");
        return;
    };

    let on = status.state.as_deref() == Some("On");
    let new_state = if on { LED_ON } else { LED_OFF };

    let keypad: Option<(String, Device)> = {
        let mut state = inner.state.lock();
        let Some(led) = state.leds.get_mut(led_id) else {
            debug!("status for unknown LED {led_id}");
            return;
        };
        led.state = new_state;
        let device_id = led.device_id.clone();
        // The LED sub-device mirrors the state as a level.
        if let Some(led_device) = state.devices.get_mut(led_id) {
            led_device.current_state = new_state;
        }
        state
            .devices
            .get(&device_id)
            .cloned()
            .map(|device| (device_id, device))
    };

    if let Some((device_id, device)) = keypad {
        notify_device(inner, &device_id, &device);
    }
}
