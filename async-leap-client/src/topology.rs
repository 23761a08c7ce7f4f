// LEAP for Rust
// SPDX-License-Identifier: MPL-2.0

//! The topology loader.
//!
//! Runs once per successful connection. Probes the bridge family through
//! `/project` and then walks the family-specific sequence of reads and
//! subscribes that populates the model. Caseta bridges expose devices and
//! buttons as flat lists; RA3 and QSX processors are walked area by area
//! through their control stations.

use std::sync::Arc;

use log::{debug, warn};
use serde::de::DeserializeOwned;

use leap_core::{LeapProtocol, SubscriptionCallback};
use leap_types::{
    id_from_href, ButtonDefinition, ButtonEvent, CommuniqueType, DeviceDefinition, Error,
    MultipleAreaDefinition, MultipleButtonDefinition, MultipleButtonGroupExpandedDefinition,
    MultipleControlStationDefinition, MultipleDeviceDefinition,
    MultipleOccupancyGroupDefinition, MultipleVirtualButtonDefinition, MultipleZoneDefinition,
    OccupancyStatus, OneDeviceDefinition, OneProjectDefinition, Response, Result,
    ZoneDefinition, RA3_KEYPAD_DEVICE_TYPES, RA3_OCCUPANCY_SENSOR_DEVICE_TYPES,
    RA3_PROJECT_TYPES,
};

use crate::bridge::BridgeInner;
use crate::events;
use crate::model::{
    Area, BridgeState, Button, Device, KeypadLed, OccupancyGroup, Ra3ButtonIndex, Ra3LedIndex,
    Scene,
};
use crate::session::{request, subscribe};

/// Load the bridge topology. The monitor reports the session as connected
/// once this returns.
pub(crate) async fn login(inner: Arc<BridgeInner>, leap: Arc<LeapProtocol>) -> Result<()> {
    inner.state.lock().begin_login();

    load_areas(&inner, &leap).await?;

    let response = request(&leap, CommuniqueType::ReadRequest, "/project", None).await?;
    let project: OneProjectDefinition = decode_body(&response, "/project");
    let product_type = project.project.and_then(|project| project.product_type);

    if product_type
        .as_deref()
        .is_some_and(|product| RA3_PROJECT_TYPES.contains(&product))
    {
        debug!("bridge reports {product_type:?}; loading as a RA3/QSX processor");
        login_ra3(&inner, &leap).await
    } else {
        debug!("bridge reports {product_type:?}; loading as a Caseta bridge");
        login_caseta(&inner, &leap).await
    }
}

fn decode_body<T: DeserializeOwned + Default>(response: &Response, url: &str) -> T {
    match response.body() {
        Some(body) => match serde_json::from_value(body.clone()) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("unexpected {url} body: {e}");
                T::default()
            }
        },
        None => {
            // Some bridges answer with Body: null where a body is
            // expected, notably /occupancygroup. Treat that as empty.
            debug!("{url} returned no body");
            T::default()
        }
    }
}

async fn load_areas(inner: &Arc<BridgeInner>, leap: &LeapProtocol) -> Result<()> {
    let response = request(leap, CommuniqueType::ReadRequest, "/area", None).await?;
    let definitions: MultipleAreaDefinition = decode_body(&response, "/area");

    let mut state = inner.state.lock();
    for area in definitions.areas {
        let Some(href) = area.href.as_deref() else {
            continue;
        };
        let area_id = match id_from_href(href) {
            Ok(id) => id.to_string(),
            Err(e) => {
                warn!("skipping area with a bad reference: {e}");
                continue;
            }
        };
        // The root area's parent is the project, which has no numeric id.
        let parent_id = area
            .parent
            .as_ref()
            .and_then(|parent| id_from_href(&parent.href).ok())
            .map(str::to_string);
        for group in &area.associated_occupancy_groups {
            let Some(group_href) = &group.occupancy_group else {
                continue;
            };
            if let Ok(group_id) = id_from_href(&group_href.href) {
                state
                    .occupancy_group_areas
                    .entry(group_id.to_string())
                    .or_default()
                    .push(area_id.clone());
            }
        }
        state.areas.insert(
            area_id.clone(),
            Area {
                id: area_id,
                name: area.name.unwrap_or_default(),
                parent_id,
            },
        );
    }
    Ok(())
}

/// Insert or refresh one device. Dynamic state (level, fan, tilt, color)
/// is preserved when the device is already known from a previous login.
fn insert_device(
    state: &mut BridgeState,
    definition: DeviceDefinition,
    fallback_area: Option<&str>,
    parent_device_id: Option<String>,
) -> Option<String> {
    let href = definition.href.as_deref()?;
    let device_id = match id_from_href(href) {
        Ok(id) => id.to_string(),
        Err(e) => {
            warn!("skipping device with a bad reference: {e}");
            return None;
        }
    };

    let name = if definition.fully_qualified_name.is_empty() {
        definition.name.clone().unwrap_or_default()
    } else {
        definition.fully_qualified_name.join("_")
    };
    let zone_id = definition
        .local_zones
        .first()
        .and_then(|zone| id_from_href(&zone.href).ok())
        .map(str::to_string);
    let button_group_ids: Vec<String> = definition
        .button_groups
        .iter()
        .filter_map(|group| id_from_href(&group.href).ok())
        .map(str::to_string)
        .collect();
    let occupancy_sensor_ids: Vec<String> = definition
        .occupancy_sensors
        .iter()
        .filter_map(|sensor| id_from_href(&sensor.href).ok())
        .map(str::to_string)
        .collect();
    let area_id = definition
        .associated_area
        .as_ref()
        .and_then(|area| id_from_href(&area.href).ok())
        .map(str::to_string)
        .or_else(|| fallback_area.map(str::to_string));

    for group_id in &button_group_ids {
        state
            .button_group_to_device
            .insert(group_id.clone(), device_id.clone());
    }
    if let Some(zone) = &zone_id {
        state.zone_to_device.insert(zone.clone(), device_id.clone());
    }

    let (current_state, fan_speed, tilt, color, warm_dim) = state
        .devices
        .get(&device_id)
        .map(|device| {
            (
                device.current_state,
                device.fan_speed,
                device.tilt,
                device.color,
                device.warm_dim,
            )
        })
        .unwrap_or((-1, None, None, None, None));

    state.devices.insert(
        device_id.clone(),
        Device {
            id: device_id.clone(),
            name,
            device_type: definition.device_type.unwrap_or_default(),
            model: definition.model_number,
            serial: definition.serial_number.map(|serial| serial.to_string()),
            area_id,
            zone_id,
            button_group_ids,
            occupancy_sensor_ids,
            parent_device_id,
            current_state,
            fan_speed,
            tilt,
            color,
            warm_dim,
        },
    );
    Some(device_id)
}

/// Engraving text wins, then the per-model raise/lower names, then the
/// wire name.
fn button_name(keypad_model: Option<&str>, definition: &ButtonDefinition) -> String {
    if let Some(text) = definition
        .engraving
        .as_ref()
        .and_then(|engraving| engraving.text.as_deref())
    {
        if !text.trim().is_empty() {
            return text.replace('\n', " ");
        }
    }
    if let (Some(model), Some(number)) = (keypad_model, definition.button_number) {
        if let Some(name) = special_button_name(model, number) {
            return name.to_string();
        }
    }
    match (&definition.name, definition.button_number) {
        (Some(name), _) => name.clone(),
        (None, Some(number)) => format!("Button {number}"),
        (None, None) => "Button".to_string(),
    }
}

/// Raise/lower buttons carry no engraving; their canonical names depend
/// on the keypad model and button position.
fn special_button_name(model: &str, number: u8) -> Option<&'static str> {
    match (model, number) {
        ("RRST-W2B-XX", 18)
        | ("RRST-W4B-XX", 18)
        | ("RRST-HN2B-XX", 18)
        | ("RRST-HN4B-XX", 18) => Some("Raise"),
        ("RRST-W2B-XX", 19)
        | ("RRST-W4B-XX", 19)
        | ("RRST-HN2B-XX", 19)
        | ("RRST-HN4B-XX", 19) => Some("Lower"),
        ("RRST-W3RL-XX", 2) => Some("Raise (Top)"),
        ("RRST-W3RL-XX", 4) => Some("Lower (Top)"),
        ("RRST-W3RL-XX", 18) => Some("Raise"),
        ("RRST-W3RL-XX", 19) => Some("Lower"),
        _ => None,
    }
}

async fn subscribe_button_events(
    inner: &Arc<BridgeInner>,
    leap: &LeapProtocol,
    button_id: &str,
) -> Result<()> {
    let router = inner.clone();
    let id = button_id.to_string();
    let callback: SubscriptionCallback = Arc::new(move |response| {
        events::handle_button_event(&router, &id, &response);
    });
    subscribe(
        leap,
        &format!("/button/{button_id}/status/event"),
        callback,
        None,
    )
    .await?;
    Ok(())
}

async fn login_caseta(inner: &Arc<BridgeInner>, leap: &LeapProtocol) -> Result<()> {
    // Devices, and the button-group index buttons are attributed through.
    let response = request(leap, CommuniqueType::ReadRequest, "/device", None).await?;
    let definitions: MultipleDeviceDefinition = decode_body(&response, "/device");
    {
        let mut state = inner.state.lock();
        for definition in definitions.devices {
            insert_device(&mut state, definition, None, None);
        }
    }

    // Buttons.
    let response = request(leap, CommuniqueType::ReadRequest, "/button", None).await?;
    let definitions: MultipleButtonDefinition = decode_body(&response, "/button");
    {
        let mut state = inner.state.lock();
        for button in definitions.buttons {
            let Some(href) = button.href.as_deref() else {
                continue;
            };
            let button_id = match id_from_href(href) {
                Ok(id) => id.to_string(),
                Err(e) => {
                    warn!("skipping button with a bad reference: {e}");
                    continue;
                }
            };
            let Some(group_id) = button
                .parent
                .as_ref()
                .and_then(|parent| id_from_href(&parent.href).ok())
                .map(str::to_string)
            else {
                continue;
            };
            let Some(device_id) = state.button_group_to_device.get(&group_id).cloned() else {
                debug!("button {button_id} belongs to unknown button group {group_id}");
                continue;
            };
            let model = state
                .devices
                .get(&device_id)
                .and_then(|device| device.model.clone());
            let led_id = button
                .associated_led
                .as_ref()
                .and_then(|led| id_from_href(&led.href).ok())
                .map(str::to_string);
            let name = button_name(model.as_deref(), &button);
            state.buttons.insert(
                button_id.clone(),
                Button {
                    id: button_id,
                    device_id,
                    group_id,
                    number: button.button_number,
                    name,
                    current_state: ButtonEvent::Release,
                    led_id,
                },
            );
        }
    }

    // LIP id mapping, best effort: some bridge models answer this with an
    // error, which is not a reason to fail the login.
    match request(leap, CommuniqueType::ReadRequest, "/server/2/id", None).await {
        Ok(_) => {}
        Err(Error::BridgeResponse(e)) => {
            debug!("bridge does not expose LIP ids: {e}");
        }
        Err(e) => return Err(e),
    }

    // Scenes. Unnamed and unprogrammed virtual buttons are placeholders.
    let response = request(leap, CommuniqueType::ReadRequest, "/virtualbutton", None).await?;
    let definitions: MultipleVirtualButtonDefinition = decode_body(&response, "/virtualbutton");
    {
        let mut state = inner.state.lock();
        for virtual_button in definitions.virtual_buttons {
            if virtual_button.is_programmed != Some(true) {
                continue;
            }
            let Some(name) = virtual_button.name.filter(|name| !name.is_empty()) else {
                continue;
            };
            let Some(href) = virtual_button.href.as_deref() else {
                continue;
            };
            let Ok(scene_id) = id_from_href(href) else {
                warn!("skipping virtual button with a bad reference {href:?}");
                continue;
            };
            state.scenes.insert(
                scene_id.to_string(),
                Scene {
                    id: scene_id.to_string(),
                    name,
                },
            );
        }
    }

    // Occupancy groups: only groups with sensors and exactly one area are
    // meaningful.
    let response = request(leap, CommuniqueType::ReadRequest, "/occupancygroup", None).await?;
    let definitions: MultipleOccupancyGroupDefinition = decode_body(&response, "/occupancygroup");
    {
        let mut state = inner.state.lock();
        for group in definitions.occupancy_groups {
            let Some(href) = group.href.as_deref() else {
                continue;
            };
            let Ok(group_id) = id_from_href(href) else {
                warn!("skipping occupancy group with a bad reference {href:?}");
                continue;
            };
            let sensor_ids: Vec<String> = group
                .associated_sensors
                .iter()
                .filter_map(|sensor| sensor.occupancy_sensor.as_ref())
                .filter_map(|sensor| id_from_href(&sensor.href).ok())
                .map(str::to_string)
                .collect();
            if sensor_ids.is_empty() {
                continue;
            }
            let area_id = match state.occupancy_group_areas.get(group_id) {
                Some(areas) if areas.len() == 1 => areas[0].clone(),
                _ => {
                    debug!("occupancy group {group_id} is not tied to exactly one area");
                    continue;
                }
            };
            let area_name = state
                .areas
                .get(&area_id)
                .map(|area| area.name.clone())
                .unwrap_or_default();
            state.occupancy_groups.insert(
                group_id.to_string(),
                OccupancyGroup {
                    id: group_id.to_string(),
                    name: format!("{area_name} Occupancy"),
                    area_id: Some(area_id),
                    sensor_ids,
                    status: OccupancyStatus::Unknown,
                },
            );
        }
    }

    // Occupancy status subscription; the subscribe response already
    // carries the current statuses.
    let router = inner.clone();
    let callback: SubscriptionCallback = Arc::new(move |response| {
        events::handle_occupancy_status(&router, &response);
    });
    let (response, _tag) = subscribe(leap, "/occupancygroup/status", callback, None).await?;
    events::handle_occupancy_status(inner, &response);

    // Button events.
    let mut button_ids: Vec<String> = inner.state.lock().buttons.keys().cloned().collect();
    button_ids.sort_by_key(|id| id.parse::<u64>().unwrap_or(u64::MAX));
    for button_id in &button_ids {
        subscribe_button_events(inner, leap, button_id).await?;
    }

    // Prime zone state through the same handler later events use.
    let mut zone_ids: Vec<String> = inner
        .state
        .lock()
        .devices
        .values()
        .filter_map(|device| device.zone_id.clone())
        .collect();
    zone_ids.sort_by_key(|id| id.parse::<u64>().unwrap_or(u64::MAX));
    for zone_id in &zone_ids {
        let response = request(
            leap,
            CommuniqueType::ReadRequest,
            &format!("/zone/{zone_id}/status"),
            None,
        )
        .await?;
        events::handle_one_zone_status(inner, &response);
    }

    Ok(())
}

async fn login_ra3(inner: &Arc<BridgeInner>, leap: &LeapProtocol) -> Result<()> {
    // The processor itself is always device "1".
    let response = request(
        leap,
        CommuniqueType::ReadRequest,
        "/device?where=IsThisDevice:true",
        None,
    )
    .await?;
    let definitions: MultipleDeviceDefinition = decode_body(&response, "/device?where=IsThisDevice:true");
    if let Some(processor) = definitions.devices.into_iter().next() {
        let mut state = inner.state.lock();
        insert_processor(&mut state, processor);
    }

    let mut area_ids: Vec<String> = inner.state.lock().areas.keys().cloned().collect();
    area_ids.sort_by_key(|id| id.parse::<u64>().unwrap_or(u64::MAX));

    for area_id in &area_ids {
        // Keypads hang off the area's control stations.
        let response = request(
            leap,
            CommuniqueType::ReadRequest,
            &format!("/area/{area_id}/associatedcontrolstation"),
            None,
        )
        .await?;
        let stations: MultipleControlStationDefinition =
            decode_body(&response, "associatedcontrolstation");
        for station in stations.control_stations {
            for ganged in station.associated_ganged_devices {
                let Some(device) = ganged.device else {
                    continue;
                };
                let Some(device_type) = device.device_type.as_deref() else {
                    continue;
                };
                if !RA3_KEYPAD_DEVICE_TYPES.contains(&device_type) {
                    continue;
                }
                let Some(href) = device.href.as_deref() else {
                    continue;
                };
                let keypad_id = match id_from_href(href) {
                    Ok(id) => id.to_string(),
                    Err(e) => {
                        warn!("skipping ganged device with a bad reference: {e}");
                        continue;
                    }
                };
                load_ra3_keypad(inner, leap, area_id, &keypad_id).await?;
            }
        }

        // Zones appear as controllable devices of their own.
        let response = request(
            leap,
            CommuniqueType::ReadRequest,
            &format!("/area/{area_id}/associatedzone"),
            None,
        )
        .await?;
        let zones: MultipleZoneDefinition = decode_body(&response, "associatedzone");
        {
            let mut state = inner.state.lock();
            for zone in zones.zones {
                insert_zone_device(&mut state, area_id, zone);
            }
        }
    }

    // Zone state arrives in bulk on these processors.
    let router = inner.clone();
    let callback: SubscriptionCallback = Arc::new(move |response| {
        events::handle_multi_zone_status(&router, &response);
    });
    let (response, _tag) = subscribe(leap, "/zone/status", callback, None).await?;
    events::handle_multi_zone_status(inner, &response);

    // Occupancy sensors are plain devices; group them per area.
    let response = request(
        leap,
        CommuniqueType::ReadRequest,
        "/device?where=IsThisDevice:false",
        None,
    )
    .await?;
    let definitions: MultipleDeviceDefinition =
        decode_body(&response, "/device?where=IsThisDevice:false");
    {
        let mut state = inner.state.lock();
        for definition in definitions.devices {
            let Some(device_type) = definition.device_type.as_deref() else {
                continue;
            };
            if !RA3_OCCUPANCY_SENSOR_DEVICE_TYPES.contains(&device_type) {
                continue;
            }
            let Some(sensor_id) = definition
                .href
                .as_deref()
                .and_then(|href| id_from_href(href).ok())
                .map(str::to_string)
            else {
                continue;
            };
            let Some(area_id) = definition
                .associated_area
                .as_ref()
                .and_then(|area| id_from_href(&area.href).ok())
                .map(str::to_string)
            else {
                debug!("occupancy sensor {sensor_id} has no area");
                continue;
            };
            let area_name = state
                .areas
                .get(&area_id)
                .map(|area| area.name.clone())
                .unwrap_or_default();
            let group = state
                .occupancy_groups
                .entry(area_id.clone())
                .or_insert_with(|| OccupancyGroup {
                    id: area_id.clone(),
                    name: format!("{area_name} Occupancy"),
                    area_id: Some(area_id.clone()),
                    sensor_ids: Vec::new(),
                    status: OccupancyStatus::Unknown,
                });
            if !group.sensor_ids.contains(&sensor_id) {
                group.sensor_ids.push(sensor_id);
            }
        }
    }

    // Occupancy arrives as area statuses here.
    let router = inner.clone();
    let callback: SubscriptionCallback = Arc::new(move |response| {
        events::handle_area_status(&router, &response);
    });
    let (response, _tag) = subscribe(leap, "/area/status", callback, None).await?;
    events::handle_area_status(inner, &response);

    Ok(())
}

fn insert_processor(state: &mut BridgeState, definition: DeviceDefinition) {
    let name = if definition.fully_qualified_name.is_empty() {
        definition.name.clone().unwrap_or_default()
    } else {
        definition.fully_qualified_name.join("_")
    };
    let current_state = state
        .devices
        .get("1")
        .map(|device| device.current_state)
        .unwrap_or(-1);
    state.devices.insert(
        "1".to_string(),
        Device {
            id: "1".to_string(),
            name,
            device_type: definition.device_type.unwrap_or_default(),
            model: definition.model_number,
            serial: definition.serial_number.map(|serial| serial.to_string()),
            area_id: None,
            zone_id: None,
            button_group_ids: Vec::new(),
            occupancy_sensor_ids: Vec::new(),
            parent_device_id: None,
            current_state,
            fan_speed: None,
            tilt: None,
            color: None,
            warm_dim: None,
        },
    );
}

async fn load_ra3_keypad(
    inner: &Arc<BridgeInner>,
    leap: &LeapProtocol,
    area_id: &str,
    keypad_id: &str,
) -> Result<()> {
    let response = request(
        leap,
        CommuniqueType::ReadRequest,
        &format!("/device/{keypad_id}"),
        None,
    )
    .await?;
    let definition: OneDeviceDefinition = decode_body(&response, "/device/{id}");
    let Some(definition) = definition.device else {
        debug!("keypad {keypad_id} has no definition");
        return Ok(());
    };
    let model = definition.model_number.clone();
    {
        let mut state = inner.state.lock();
        insert_device(&mut state, definition, Some(area_id), None);
    }

    let response = request(
        leap,
        CommuniqueType::ReadRequest,
        &format!("/device/{keypad_id}/buttongroup/expanded"),
        None,
    )
    .await?;
    let groups: MultipleButtonGroupExpandedDefinition =
        decode_body(&response, "buttongroup/expanded");

    let mut led_ids: Vec<String> = Vec::new();
    let mut button_ids: Vec<String> = Vec::new();
    {
        let mut state = inner.state.lock();
        let keypad_name = state
            .devices
            .get(keypad_id)
            .map(|device| device.name.clone())
            .unwrap_or_default();
        for group in groups.button_groups_expanded {
            let Some(group_id) = group
                .href
                .as_deref()
                .and_then(|href| id_from_href(href).ok())
                .map(str::to_string)
            else {
                continue;
            };
            state
                .button_group_to_device
                .insert(group_id.clone(), keypad_id.to_string());
            for button in group.buttons {
                let Some(button_id) = button
                    .href
                    .as_deref()
                    .and_then(|href| id_from_href(href).ok())
                    .map(str::to_string)
                else {
                    continue;
                };
                let led_id = button
                    .associated_led
                    .as_ref()
                    .and_then(|led| id_from_href(&led.href).ok())
                    .map(str::to_string);
                let name = button_name(model.as_deref(), &button);
                state.buttons.insert(
                    button_id.clone(),
                    Button {
                        id: button_id.clone(),
                        device_id: keypad_id.to_string(),
                        group_id: group_id.clone(),
                        number: button.button_number,
                        name: name.clone(),
                        current_state: ButtonEvent::Release,
                        led_id: led_id.clone(),
                    },
                );
                state.ra3_buttons.insert(
                    button_id.clone(),
                    Ra3ButtonIndex {
                        device_id: keypad_id.to_string(),
                        group_id: group_id.clone(),
                    },
                );
                if let Some(led_id) = led_id {
                    state.ra3_leds.insert(
                        led_id.clone(),
                        Ra3LedIndex {
                            device_id: keypad_id.to_string(),
                            group_id: group_id.clone(),
                            button_id: button_id.clone(),
                        },
                    );
                    state.leds.insert(
                        led_id.clone(),
                        KeypadLed {
                            id: led_id.clone(),
                            device_id: keypad_id.to_string(),
                            button_id: button_id.clone(),
                            state: -1,
                        },
                    );
                    // LEDs double as sub-devices of the keypad.
                    let led_state = state
                        .devices
                        .get(&led_id)
                        .map(|device| device.current_state)
                        .unwrap_or(-1);
                    state.devices.insert(
                        led_id.clone(),
                        Device {
                            id: led_id.clone(),
                            name: format!("{keypad_name} {name} LED"),
                            device_type: "KeypadLED".to_string(),
                            model: None,
                            serial: None,
                            area_id: Some(area_id.to_string()),
                            zone_id: None,
                            button_group_ids: Vec::new(),
                            occupancy_sensor_ids: Vec::new(),
                            parent_device_id: Some(keypad_id.to_string()),
                            current_state: led_state,
                            fan_speed: None,
                            tilt: None,
                            color: None,
                            warm_dim: None,
                        },
                    );
                    led_ids.push(led_id);
                }
                button_ids.push(button_id);
            }
        }
    }

    for led_id in &led_ids {
        let router = inner.clone();
        let id = led_id.clone();
        let callback: SubscriptionCallback = Arc::new(move |response| {
            events::handle_led_status(&router, Some(&id), &response);
        });
        subscribe(leap, &format!("/led/{led_id}/status"), callback, None).await?;
    }
    for button_id in &button_ids {
        subscribe_button_events(inner, leap, button_id).await?;
    }

    Ok(())
}

fn insert_zone_device(state: &mut BridgeState, area_id: &str, zone: ZoneDefinition) {
    let Some(href) = zone.href.as_deref() else {
        return;
    };
    let zone_id = match id_from_href(href) {
        Ok(id) => id.to_string(),
        Err(e) => {
            warn!("skipping zone with a bad reference: {e}");
            return;
        }
    };

    let area_name = state
        .areas
        .get(area_id)
        .map(|area| area.name.as_str())
        .unwrap_or("");
    let name = match zone.name {
        Some(zone_name) if !area_name.is_empty() => format!("{area_name}_{zone_name}"),
        Some(zone_name) => zone_name,
        None => format!("Zone {zone_id}"),
    };

    state
        .zone_to_device
        .insert(zone_id.clone(), zone_id.clone());

    let (current_state, fan_speed, tilt, color, warm_dim) = state
        .devices
        .get(&zone_id)
        .map(|device| {
            (
                device.current_state,
                device.fan_speed,
                device.tilt,
                device.color,
                device.warm_dim,
            )
        })
        .unwrap_or((-1, None, None, None, None));

    state.devices.insert(
        zone_id.clone(),
        Device {
            id: zone_id.clone(),
            name,
            device_type: zone.control_type.unwrap_or_default(),
            model: None,
            serial: None,
            area_id: Some(area_id.to_string()),
            zone_id: Some(zone_id),
            button_group_ids: Vec::new(),
            occupancy_sensor_ids: Vec::new(),
            parent_device_id: None,
            current_state,
            fan_speed,
            tilt,
            color,
            warm_dim,
        },
    );
}
