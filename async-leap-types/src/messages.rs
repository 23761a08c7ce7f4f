// LEAP for Rust
// SPDX-License-Identifier: MPL-2.0

//! The LEAP request/response envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::status::ResponseStatus;

/// The communique type of a client-originated LEAP message.
///
/// Responses echo the request kind with a `Response` suffix; the bridge
/// additionally uses `ExceptionResponse` for some failures. Inbound frames
/// keep their communique type as a plain string so an unknown value never
/// fails a whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommuniqueType {
    /// Read a resource.
    ReadRequest,
    /// Subscribe to changes of a resource.
    SubscribeRequest,
    /// Create a resource, also used for command processors.
    CreateRequest,
    /// Update a resource.
    UpdateRequest,
}

impl CommuniqueType {
    /// The exact string sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommuniqueType::ReadRequest => "ReadRequest",
            CommuniqueType::SubscribeRequest => "SubscribeRequest",
            CommuniqueType::CreateRequest => "CreateRequest",
            CommuniqueType::UpdateRequest => "UpdateRequest",
        }
    }
}

/// Generate a fresh client tag.
pub fn make_tag() -> String {
    Uuid::new_v4().to_string()
}

/// Header of a client-originated message.
#[derive(Debug, Clone, Serialize)]
pub struct RequestHeader {
    /// The per-request tag echoed back by the bridge.
    #[serde(rename = "ClientTag")]
    pub client_tag: String,
    /// The resource the request addresses.
    #[serde(rename = "Url")]
    pub url: String,
}

/// A complete client-originated message.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEnvelope {
    /// The request kind.
    #[serde(rename = "CommuniqueType")]
    pub communique_type: CommuniqueType,
    /// Tag and URL.
    #[serde(rename = "Header")]
    pub header: RequestHeader,
    /// Optional request body, schema depends on the URL.
    #[serde(rename = "Body", skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl RequestEnvelope {
    /// Build an envelope for the given request.
    pub fn new(
        communique_type: CommuniqueType,
        url: impl Into<String>,
        client_tag: impl Into<String>,
        body: Option<Value>,
    ) -> Self {
        Self {
            communique_type,
            header: RequestHeader {
                client_tag: client_tag.into(),
                url: url.into(),
            },
            body,
        }
    }
}

/// Header of a bridge-originated message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseHeader {
    /// The status of the request this answers, absent on event frames.
    #[serde(rename = "StatusCode", default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<ResponseStatus>,
    /// The resource the message refers to.
    #[serde(rename = "Url", default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// The schema tag of the body.
    #[serde(
        rename = "MessageBodyType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub message_body_type: Option<String>,
    /// The echoed client tag; absent on unsolicited frames.
    #[serde(rename = "ClientTag", default, skip_serializing_if = "Option::is_none")]
    pub client_tag: Option<String>,
}

/// A bridge-originated message: a response or an unsolicited event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// The message header.
    #[serde(rename = "Header", default)]
    pub header: ResponseHeader,
    /// The communique type string, kept lenient.
    #[serde(
        rename = "CommuniqueType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub communique_type: Option<String>,
    /// The raw body. `None` and JSON `null` both mean "no body".
    #[serde(rename = "Body", default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl Response {
    /// The body, with JSON `null` treated as absent.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref().filter(|body| !body.is_null())
    }

    /// Whether the header carries a 2xx status code.
    pub fn is_successful(&self) -> bool {
        self.header
            .status_code
            .as_ref()
            .is_some_and(ResponseStatus::is_successful)
    }
}
