#![allow(dead_code)] // each test binary uses a different slice of this

//! A scripted fake bridge for driving the client end to end over
//! in-memory streams.
//!
//! Each queued connection is one duplex pipe with a server task behind
//! it. The server answers requests from a routing table keyed by
//! `(CommuniqueType, Url)`, echoing the client tag, records everything it
//! receives, remembers the tag of every subscribe so tests can push
//! tagged frames later, and can be killed to simulate a network drop.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use leap::client::{Connector, LeapStream, Smartbridge};
use leap::types::{Error, Result};

/// Routing table for a scripted connection.
pub type Routes = HashMap<(String, String), Value>;

pub struct TestBridge {
    pub bridge: Smartbridge,
    connections: UnboundedSender<Box<dyn LeapStream>>,
}

struct QueueConnector {
    connections: tokio::sync::Mutex<UnboundedReceiver<Box<dyn LeapStream>>>,
}

#[async_trait]
impl Connector for QueueConnector {
    async fn connect(&self) -> Result<Box<dyn LeapStream>> {
        let mut connections = self.connections.lock().await;
        connections.recv().await.ok_or(Error::Disconnected)
    }
}

impl TestBridge {
    pub fn new() -> Self {
        let (connections, receiver) = unbounded_channel();
        let bridge = Smartbridge::new(Box::new(QueueConnector {
            connections: tokio::sync::Mutex::new(receiver),
        }));
        Self {
            bridge,
            connections,
        }
    }

    /// Queue one connection backed by a scripted server. The next
    /// connect attempt of the monitor picks it up.
    pub fn add_connection(&self, routes: Routes) -> ServerHandle {
        let (client_side, server_side) = tokio::io::duplex(64 * 1024);
        self.connections
            .send(Box::new(client_side))
            .expect("connector dropped");
        ServerHandle::spawn(server_side, routes)
    }
}

pub struct ServerHandle {
    requests: Arc<Mutex<Vec<Value>>>,
    tags: Arc<Mutex<HashMap<String, String>>>,
    inject: UnboundedSender<Value>,
    incoming: tokio::sync::Mutex<UnboundedReceiver<Value>>,
    reader_task: tokio::task::JoinHandle<()>,
    writer_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    fn spawn(stream: DuplexStream, routes: Routes) -> Self {
        let (read, write) = tokio::io::split(stream);
        let write = Arc::new(tokio::sync::Mutex::new(write));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let tags = Arc::new(Mutex::new(HashMap::new()));
        let (incoming_tx, incoming_rx) = unbounded_channel();
        let (inject_tx, mut inject_rx) = unbounded_channel::<Value>();

        let injection_write = write.clone();
        let writer_task = tokio::spawn(async move {
            while let Some(frame) = inject_rx.recv().await {
                if write_frame(&injection_write, &frame).await.is_err() {
                    break;
                }
            }
        });

        let recorded = requests.clone();
        let seen_tags = tags.clone();
        let reader_task = tokio::spawn(async move {
            let mut reader = BufReader::new(read);
            let mut line = String::new();
            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {}
                }
                let Ok(frame) = serde_json::from_str::<Value>(line.trim_end()) else {
                    continue;
                };
                let communique_type = frame["CommuniqueType"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                let url = frame["Header"]["Url"].as_str().unwrap_or_default().to_string();
                let tag = frame["Header"]["ClientTag"].as_str().map(str::to_string);

                if communique_type == "SubscribeRequest" {
                    if let Some(tag) = &tag {
                        seen_tags.lock().unwrap().insert(url.clone(), tag.clone());
                    }
                }
                recorded.lock().unwrap().push(frame.clone());
                let _ = incoming_tx.send(frame);

                // Requests without a route get no answer, which is how
                // the timeout tests starve the client.
                if let Some(mut response) = routes.get(&(communique_type, url)).cloned() {
                    if let Some(tag) = tag {
                        response["Header"]["ClientTag"] = json!(tag);
                    }
                    if write_frame(&write, &response).await.is_err() {
                        break;
                    }
                }
            }
        });

        Self {
            requests,
            tags,
            inject: inject_tx,
            incoming: tokio::sync::Mutex::new(incoming_rx),
            reader_task,
            writer_task,
        }
    }

    /// Push an untagged frame to the client.
    pub fn inject(&self, frame: Value) {
        self.inject.send(frame).expect("server writer gone");
    }

    /// Push a frame carrying the tag under which the client subscribed
    /// to `url`.
    pub fn inject_tagged(&self, url: &str, mut frame: Value) {
        let tag = self.tag_for(url).expect("client never subscribed to url");
        frame["Header"]["ClientTag"] = json!(tag);
        self.inject.send(frame).expect("server writer gone");
    }

    pub fn tag_for(&self, url: &str) -> Option<String> {
        self.tags.lock().unwrap().get(url).cloned()
    }

    /// Await the next request the client sends.
    pub async fn next_request(&self) -> Value {
        self.incoming
            .lock()
            .await
            .recv()
            .await
            .expect("server stream ended")
    }

    /// Drain requests until one matches the given type and URL.
    pub async fn wait_for_request(&self, communique_type: &str, url: &str) -> Value {
        loop {
            let frame = self.next_request().await;
            if frame["CommuniqueType"] == communique_type && frame["Header"]["Url"] == url {
                return frame;
            }
        }
    }

    /// All recorded requests matching the given type and URL.
    pub fn recorded(&self, communique_type: &str, url: &str) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|frame| {
                frame["CommuniqueType"] == communique_type && frame["Header"]["Url"] == url
            })
            .cloned()
            .collect()
    }

    /// Sever the connection, as a network drop would.
    pub fn kill(&self) {
        self.reader_task.abort();
        self.writer_task.abort();
    }
}

async fn write_frame(
    write: &tokio::sync::Mutex<tokio::io::WriteHalf<DuplexStream>>,
    frame: &Value,
) -> std::io::Result<()> {
    let mut bytes = frame.to_string().into_bytes();
    bytes.extend_from_slice(b"\r\n");
    write.lock().await.write_all(&bytes).await
}

pub fn read_response(url: &str, body_type: &str, body: Value) -> Value {
    json!({
        "CommuniqueType": "ReadResponse",
        "Header": {
            "StatusCode": "200 OK",
            "Url": url,
            "MessageBodyType": body_type,
        },
        "Body": body,
    })
}

pub fn subscribe_response(url: &str, body_type: &str, body: Value) -> Value {
    json!({
        "CommuniqueType": "SubscribeResponse",
        "Header": {
            "StatusCode": "200 OK",
            "Url": url,
            "MessageBodyType": body_type,
        },
        "Body": body,
    })
}

pub fn create_response(url: &str, body: Value) -> Value {
    json!({
        "CommuniqueType": "CreateResponse",
        "Header": {
            "StatusCode": "201 Created",
            "Url": url,
        },
        "Body": body,
    })
}

fn route(routes: &mut Routes, communique_type: &str, url: &str, response: Value) {
    routes.insert((communique_type.to_string(), url.to_string()), response);
}

/// The standard Caseta fixture: a bridge, one dimmer, one Pico remote
/// with two buttons, one fan, one shade, one scene and one occupancy
/// group.
pub fn caseta_routes() -> Routes {
    let mut routes = Routes::new();

    route(
        &mut routes,
        "ReadRequest",
        "/area",
        read_response(
            "/area",
            "MultipleAreaDefinition",
            json!({"Areas": [
                {
                    "href": "/area/1",
                    "Name": "Hallway",
                    "AssociatedOccupancyGroups": [
                        {"OccupancyGroup": {"href": "/occupancygroup/2"}}
                    ],
                },
                {"href": "/area/2", "Name": "Bedroom"},
            ]}),
        ),
    );

    route(
        &mut routes,
        "ReadRequest",
        "/project",
        read_response(
            "/project",
            "OneProjectDefinition",
            json!({"Project": {"Name": "Smart Bridge", "ProductType": "Lutron Caseta Project"}}),
        ),
    );

    route(
        &mut routes,
        "ReadRequest",
        "/device",
        read_response(
            "/device",
            "MultipleDeviceDefinition",
            json!({"Devices": [
                {
                    "href": "/device/1",
                    "Name": "Smart Bridge",
                    "FullyQualifiedName": ["Smart Bridge"],
                    "SerialNumber": 1234,
                    "ModelNumber": "L-BDG2-WH",
                    "DeviceType": "SmartBridge",
                },
                {
                    "href": "/device/2",
                    "Name": "Lights",
                    "FullyQualifiedName": ["Hallway", "Lights"],
                    "SerialNumber": 2345,
                    "ModelNumber": "PD-6WCL-XX",
                    "DeviceType": "WallDimmer",
                    "LocalZones": [{"href": "/zone/1"}],
                    "AssociatedArea": {"href": "/area/1"},
                },
                {
                    "href": "/device/3",
                    "Name": "Pico",
                    "FullyQualifiedName": ["Hallway", "Pico"],
                    "SerialNumber": 4567,
                    "ModelNumber": "PJ2-3BRL-GXX-X01",
                    "DeviceType": "Pico3ButtonRaiseLower",
                    "ButtonGroups": [{"href": "/buttongroup/2"}],
                    "AssociatedArea": {"href": "/area/1"},
                },
                {
                    "href": "/device/4",
                    "Name": "Fan",
                    "FullyQualifiedName": ["Bedroom", "Fan"],
                    "SerialNumber": 5678,
                    "ModelNumber": "PD-FSQN-XX",
                    "DeviceType": "CasetaFanSpeedController",
                    "LocalZones": [{"href": "/zone/2"}],
                    "AssociatedArea": {"href": "/area/2"},
                },
                {
                    "href": "/device/5",
                    "Name": "Blinds",
                    "FullyQualifiedName": ["Bedroom", "Blinds"],
                    "SerialNumber": 6789,
                    "ModelNumber": "CS-YJ-4GC-WH",
                    "DeviceType": "SerenaRollerShade",
                    "LocalZones": [{"href": "/zone/3"}],
                    "AssociatedArea": {"href": "/area/2"},
                },
            ]}),
        ),
    );

    route(
        &mut routes,
        "ReadRequest",
        "/button",
        read_response(
            "/button",
            "MultipleButtonDefinition",
            json!({"Buttons": [
                {
                    "href": "/button/101",
                    "Name": "Button 1",
                    "ButtonNumber": 0,
                    "Parent": {"href": "/buttongroup/2"},
                },
                {
                    "href": "/button/102",
                    "Name": "Button 2",
                    "ButtonNumber": 2,
                    "Parent": {"href": "/buttongroup/2"},
                },
            ]}),
        ),
    );

    // Older bridges refuse the LIP id listing; the client must shrug.
    route(
        &mut routes,
        "ReadRequest",
        "/server/2/id",
        json!({
            "CommuniqueType": "ExceptionResponse",
            "Header": {"StatusCode": "404 NotFound", "Url": "/server/2/id"},
        }),
    );

    route(
        &mut routes,
        "ReadRequest",
        "/virtualbutton",
        read_response(
            "/virtualbutton",
            "MultipleVirtualButtonDefinition",
            json!({"VirtualButtons": [
                {"href": "/virtualbutton/1", "Name": "Bright", "IsProgrammed": true},
                {"href": "/virtualbutton/2", "Name": "Unused", "IsProgrammed": false},
                {"href": "/virtualbutton/3", "IsProgrammed": true},
            ]}),
        ),
    );

    route(
        &mut routes,
        "ReadRequest",
        "/occupancygroup",
        read_response(
            "/occupancygroup",
            "MultipleOccupancyGroupDefinition",
            json!({"OccupancyGroups": [
                {
                    "href": "/occupancygroup/2",
                    "AssociatedSensors": [
                        {"OccupancySensor": {"href": "/occupancysensor/2"}}
                    ],
                },
                {"href": "/occupancygroup/7"},
            ]}),
        ),
    );

    route(
        &mut routes,
        "SubscribeRequest",
        "/occupancygroup/status",
        subscribe_response(
            "/occupancygroup/status",
            "MultipleOccupancyGroupStatus",
            json!({"OccupancyGroupStatuses": [
                {
                    "OccupancyGroup": {"href": "/occupancygroup/2"},
                    "OccupancyStatus": "Occupied",
                },
            ]}),
        ),
    );

    for button in ["101", "102"] {
        let url = format!("/button/{button}/status/event");
        let response = json!({
            "CommuniqueType": "SubscribeResponse",
            "Header": {"StatusCode": "200 OK", "Url": url.clone()},
        });
        route(&mut routes, "SubscribeRequest", &url, response);
    }

    route(
        &mut routes,
        "ReadRequest",
        "/zone/1/status",
        read_response(
            "/zone/1/status",
            "OneZoneStatus",
            json!({"ZoneStatus": {"href": "/zone/1/status", "Zone": {"href": "/zone/1"}, "Level": 0}}),
        ),
    );
    route(
        &mut routes,
        "ReadRequest",
        "/zone/2/status",
        read_response(
            "/zone/2/status",
            "OneZoneStatus",
            json!({"ZoneStatus": {"href": "/zone/2/status", "Zone": {"href": "/zone/2"}, "FanSpeed": "Off"}}),
        ),
    );
    route(
        &mut routes,
        "ReadRequest",
        "/zone/3/status",
        read_response(
            "/zone/3/status",
            "OneZoneStatus",
            json!({"ZoneStatus": {"href": "/zone/3/status", "Zone": {"href": "/zone/3"}, "Level": 0, "Tilt": 0}}),
        ),
    );

    route(
        &mut routes,
        "CreateRequest",
        "/zone/1/commandprocessor",
        create_response(
            "/zone/1/commandprocessor",
            json!({"ZoneStatus": {"href": "/zone/1/status", "Zone": {"href": "/zone/1"}, "Level": 50}}),
        ),
    );
    route(
        &mut routes,
        "CreateRequest",
        "/zone/2/commandprocessor",
        create_response(
            "/zone/2/commandprocessor",
            json!({"ZoneStatus": {"href": "/zone/2/status", "Zone": {"href": "/zone/2"}, "FanSpeed": "Medium"}}),
        ),
    );
    route(
        &mut routes,
        "CreateRequest",
        "/zone/3/commandprocessor",
        create_response("/zone/3/commandprocessor", Value::Null),
    );
    route(
        &mut routes,
        "CreateRequest",
        "/virtualbutton/1/commandprocessor",
        create_response("/virtualbutton/1/commandprocessor", Value::Null),
    );
    route(
        &mut routes,
        "CreateRequest",
        "/button/101/commandprocessor",
        create_response("/button/101/commandprocessor", Value::Null),
    );

    route(
        &mut routes,
        "ReadRequest",
        "/server/1/status/ping",
        read_response(
            "/server/1/status/ping",
            "OnePingResponse",
            json!({"PingResponse": {"LEAPVersion": 1.115}}),
        ),
    );

    routes
}

/// The standard RA3 fixture: a processor, one Sunnata keypad with two
/// LED-backed buttons and one raise button, one dimmed zone and one
/// ceiling occupancy sensor.
pub fn ra3_routes() -> Routes {
    let mut routes = Routes::new();

    route(
        &mut routes,
        "ReadRequest",
        "/area",
        read_response(
            "/area",
            "MultipleAreaDefinition",
            json!({"Areas": [
                {"href": "/area/3", "Name": "Home"},
                {"href": "/area/83", "Name": "Kitchen", "Parent": {"href": "/area/3"}},
                {"href": "/area/547", "Name": "Office", "Parent": {"href": "/area/3"}},
            ]}),
        ),
    );

    route(
        &mut routes,
        "ReadRequest",
        "/project",
        read_response(
            "/project",
            "OneProjectDefinition",
            json!({"Project": {"Name": "Home", "ProductType": "Lutron RadioRA 3 Project"}}),
        ),
    );

    route(
        &mut routes,
        "ReadRequest",
        "/device?where=IsThisDevice:true",
        read_response(
            "/device",
            "MultipleDeviceDefinition",
            json!({"Devices": [{
                "href": "/device/549",
                "Name": "Enclosure Device 001",
                "FullyQualifiedName": ["Equipment Room", "Enclosure Device 001"],
                "SerialNumber": "11223344",
                "ModelNumber": "JanusProcRA3",
                "DeviceType": "RadioRa3Processor",
            }]}),
        ),
    );

    for area in ["3", "547"] {
        let url = format!("/area/{area}/associatedcontrolstation");
        route(
            &mut routes,
            "ReadRequest",
            &url,
            read_response(&url, "MultipleControlStationDefinition", json!({"ControlStations": []})),
        );
    }
    route(
        &mut routes,
        "ReadRequest",
        "/area/83/associatedcontrolstation",
        read_response(
            "/area/83/associatedcontrolstation",
            "MultipleControlStationDefinition",
            json!({"ControlStations": [{
                "href": "/controlstation/1371",
                "Name": "Entry",
                "AssociatedArea": {"href": "/area/83"},
                "AssociatedGangedDevices": [
                    {"Device": {"href": "/device/1372", "DeviceType": "SunnataKeypad", "AddressedState": "Addressed"}},
                    {"Device": {"href": "/device/1373", "DeviceType": "SunnataDimmer", "AddressedState": "Addressed"}},
                ],
            }]}),
        ),
    );

    route(
        &mut routes,
        "ReadRequest",
        "/device/1372",
        read_response(
            "/device/1372",
            "OneDeviceDefinition",
            json!({"Device": {
                "href": "/device/1372",
                "Name": "Keypad",
                "FullyQualifiedName": ["Kitchen", "Keypad"],
                "SerialNumber": "68912075",
                "ModelNumber": "RRST-W4B-XX",
                "DeviceType": "SunnataKeypad",
                "AssociatedArea": {"href": "/area/83"},
            }}),
        ),
    );

    route(
        &mut routes,
        "ReadRequest",
        "/device/1372/buttongroup/expanded",
        read_response(
            "/device/1372/buttongroup/expanded",
            "ExpandedButtonGroup",
            json!({"ButtonGroupsExpanded": [{
                "href": "/buttongroup/1402",
                "Buttons": [
                    {
                        "href": "/button/1403",
                        "Name": "Button 1",
                        "ButtonNumber": 1,
                        "Engraving": {"Text": "Kitchen\nMain"},
                        "AssociatedLED": {"href": "/led/1404"},
                    },
                    {
                        "href": "/button/1405",
                        "Name": "Button 2",
                        "ButtonNumber": 2,
                        "AssociatedLED": {"href": "/led/1406"},
                    },
                    {
                        "href": "/button/1409",
                        "Name": "Button 4",
                        "ButtonNumber": 18,
                    },
                ],
            }]}),
        ),
    );

    for led in ["1404", "1406"] {
        let url = format!("/led/{led}/status");
        route(
            &mut routes,
            "SubscribeRequest",
            &url,
            subscribe_response(
                &url,
                "OneLEDStatus",
                json!({"LEDStatus": {"href": format!("/led/{led}/status"), "LED": {"href": format!("/led/{led}")}, "State": "Off"}}),
            ),
        );
    }
    for button in ["1403", "1405", "1409"] {
        let url = format!("/button/{button}/status/event");
        let response = json!({
            "CommuniqueType": "SubscribeResponse",
            "Header": {"StatusCode": "200 OK", "Url": url.clone()},
        });
        route(&mut routes, "SubscribeRequest", &url, response);
    }

    for area in ["3", "83"] {
        let url = format!("/area/{area}/associatedzone");
        route(
            &mut routes,
            "ReadRequest",
            &url,
            read_response(&url, "MultipleZoneDefinition", json!({"Zones": []})),
        );
    }
    route(
        &mut routes,
        "ReadRequest",
        "/area/547/associatedzone",
        read_response(
            "/area/547/associatedzone",
            "MultipleZoneDefinition",
            json!({"Zones": [{
                "href": "/zone/1641",
                "Name": "Overhead",
                "ControlType": "Dimmed",
                "AssociatedArea": {"href": "/area/547"},
            }]}),
        ),
    );

    route(
        &mut routes,
        "SubscribeRequest",
        "/zone/status",
        subscribe_response(
            "/zone/status",
            "MultipleZoneStatus",
            json!({"ZoneStatuses": [
                {"href": "/zone/1641/status", "Zone": {"href": "/zone/1641"}, "Level": 45},
            ]}),
        ),
    );

    route(
        &mut routes,
        "ReadRequest",
        "/device?where=IsThisDevice:false",
        read_response(
            "/device",
            "MultipleDeviceDefinition",
            json!({"Devices": [
                {
                    "href": "/device/1372",
                    "Name": "Keypad",
                    "DeviceType": "SunnataKeypad",
                    "AssociatedArea": {"href": "/area/83"},
                },
                {
                    "href": "/device/1870",
                    "Name": "Occupancy Sensor",
                    "FullyQualifiedName": ["Kitchen", "Occupancy Sensor"],
                    "DeviceType": "RPSCeilingMountedOccSensor",
                    "AssociatedArea": {"href": "/area/83"},
                },
            ]}),
        ),
    );

    route(
        &mut routes,
        "SubscribeRequest",
        "/area/status",
        subscribe_response(
            "/area/status",
            "MultipleAreaStatus",
            json!({"AreaStatuses": [
                {"href": "/area/83/status", "OccupancyStatus": "Occupied"},
                {"href": "/area/547/status", "Level": 100},
            ]}),
        ),
    );

    route(
        &mut routes,
        "CreateRequest",
        "/button/1403/commandprocessor",
        create_response("/button/1403/commandprocessor", Value::Null),
    );
    route(
        &mut routes,
        "CreateRequest",
        "/zone/1641/commandprocessor",
        create_response(
            "/zone/1641/commandprocessor",
            json!({"ZoneStatus": {"href": "/zone/1641/status", "Zone": {"href": "/zone/1641"}, "Level": 80}}),
        ),
    );
    route(
        &mut routes,
        "UpdateRequest",
        "/led/1404/status",
        json!({
            "CommuniqueType": "UpdateResponse",
            "Header": {"StatusCode": "200 OK", "Url": "/led/1404/status"},
            "Body": {"LEDStatus": {"href": "/led/1404/status", "LED": {"href": "/led/1404"}, "State": "On"}},
        }),
    );

    route(
        &mut routes,
        "ReadRequest",
        "/server/1/status/ping",
        read_response(
            "/server/1/status/ping",
            "OnePingResponse",
            json!({"PingResponse": {"LEAPVersion": 1.115}}),
        ),
    );

    routes
}
