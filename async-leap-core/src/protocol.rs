// LEAP for Rust
// SPDX-License-Identifier: MPL-2.0

//! Tag-multiplexed request/response handling on one framed stream.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use log::{debug, error};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::oneshot;
use tokio_util::codec::{FramedRead, FramedWrite};

use leap_types::{make_tag, CommuniqueType, Error, RequestEnvelope, Response, Result};

use crate::codec::LeapCodec;

type Reader = Box<dyn AsyncRead + Send + Unpin>;
type Writer = Box<dyn AsyncWrite + Send + Unpin>;

/// Callback invoked with every frame delivered to a tagged subscription.
pub type SubscriptionCallback = Arc<dyn Fn(Response) + Send + Sync>;

/// Handler invoked with every untagged (unsolicited) frame.
pub type UnsolicitedHandler = Arc<dyn Fn(&Response) + Send + Sync>;

/// Token identifying a registered unsolicited handler, used to remove it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerId(u64);

struct ProtocolState {
    in_flight: HashMap<String, oneshot::Sender<Response>>,
    tagged_subscriptions: HashMap<String, SubscriptionCallback>,
    closed: bool,
}

/// One bidirectional JSON-per-line channel with request/response
/// multiplexing.
///
/// Many logical requests may be outstanding at once; each carries a fresh
/// UUID client tag which the bridge echoes on every answering frame.
/// Constructed together with the [`LeapEventLoop`] that owns the read half
/// of the stream and must be driven for any response to arrive.
pub struct LeapProtocol {
    writer: tokio::sync::Mutex<Option<FramedWrite<Writer, LeapCodec>>>,
    state: Mutex<ProtocolState>,
    unsolicited_subs: Mutex<Vec<(u64, UnsolicitedHandler)>>,
    next_handler_id: AtomicU64,
}

/// The read loop half of a [`LeapProtocol`].
#[must_use = "the event loop must be driven for responses to arrive"]
pub struct LeapEventLoop {
    protocol: Arc<LeapProtocol>,
    reader: FramedRead<Reader, LeapCodec>,
}

// Removes the in-flight entry when a request future is dropped before its
// response arrives, so a late answer is logged and discarded instead of
// resolving a dead waiter.
struct InFlightGuard<'a> {
    protocol: &'a LeapProtocol,
    tag: &'a str,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.protocol.state.lock().in_flight.remove(self.tag);
    }
}

impl LeapProtocol {
    /// Wrap a reader and writer with the LEAP request/response protocol.
    pub fn new(
        reader: impl AsyncRead + Send + Unpin + 'static,
        writer: impl AsyncWrite + Send + Unpin + 'static,
    ) -> (Arc<Self>, LeapEventLoop) {
        let protocol = Arc::new(Self {
            writer: tokio::sync::Mutex::new(Some(FramedWrite::new(
                Box::new(writer) as Writer,
                LeapCodec::new(),
            ))),
            state: Mutex::new(ProtocolState {
                in_flight: HashMap::new(),
                tagged_subscriptions: HashMap::new(),
                closed: false,
            }),
            unsolicited_subs: Mutex::new(Vec::new()),
            next_handler_id: AtomicU64::new(0),
        });
        let event_loop = LeapEventLoop {
            protocol: protocol.clone(),
            reader: FramedRead::new(Box::new(reader) as Reader, LeapCodec::new()),
        };
        (protocol, event_loop)
    }

    /// Make a request to the bridge and await the response.
    pub async fn request(
        &self,
        communique_type: CommuniqueType,
        url: &str,
        body: Option<Value>,
    ) -> Result<Response> {
        self.request_with_tag(communique_type, url, body, make_tag())
            .await
    }

    async fn request_with_tag(
        &self,
        communique_type: CommuniqueType,
        url: &str,
        body: Option<Value>,
        tag: String,
    ) -> Result<Response> {
        let (sender, receiver) = oneshot::channel();
        {
            let mut state = self.state.lock();
            if state.closed {
                return Err(Error::Disconnected);
            }
            state.in_flight.insert(tag.clone(), sender);
        }
        let _guard = InFlightGuard {
            protocol: self,
            tag: &tag,
        };

        self.send(RequestEnvelope::new(communique_type, url, tag.clone(), body))
            .await?;

        receiver.await.map_err(|_| Error::Disconnected)
    }

    async fn send(&self, envelope: RequestEnvelope) -> Result<()> {
        debug!(
            "sending {} {}",
            envelope.communique_type.as_str(),
            envelope.header.url
        );
        let mut writer = self.writer.lock().await;
        match writer.as_mut() {
            Some(writer) => writer.send(envelope).await,
            None => Err(Error::Disconnected),
        }
    }

    /// Subscribe to events from the bridge.
    ///
    /// Like [`LeapProtocol::request`], except that on a successful response
    /// the bridge is expected to send more frames carrying the same tag
    /// later; those are delivered to `callback`. Returns the response and
    /// the tag the subscription was registered under.
    pub async fn subscribe(
        &self,
        url: &str,
        callback: SubscriptionCallback,
        body: Option<Value>,
        communique_type: CommuniqueType,
    ) -> Result<(Response, String)> {
        let tag = make_tag();
        let response = self
            .request_with_tag(communique_type, url, body, tag.clone())
            .await?;

        if response.is_successful() {
            self.state
                .lock()
                .tagged_subscriptions
                .insert(tag.clone(), callback);
            debug!("subscribed to {url} as {tag}");
        }

        Ok((response, tag))
    }

    /// Register a handler for untagged frames. Handlers are invoked in
    /// registration order.
    pub fn subscribe_unsolicited(&self, handler: UnsolicitedHandler) -> HandlerId {
        let id = self.next_handler_id.fetch_add(1, Ordering::Relaxed);
        self.unsolicited_subs.lock().push((id, handler));
        HandlerId(id)
    }

    /// Remove a previously registered unsolicited handler.
    pub fn unsubscribe_unsolicited(&self, id: HandlerId) {
        self.unsolicited_subs
            .lock()
            .retain(|(handler_id, _)| *handler_id != id.0);
    }

    /// Whether [`LeapProtocol::close`] has run.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Disconnect. Closes the writer, fails every outstanding request with
    /// a disconnected error and clears the subscription tables. Idempotent.
    pub async fn close(&self) {
        let writer = self.writer.lock().await.take();
        if let Some(mut writer) = writer {
            if let Err(e) = writer.close().await {
                debug!("error closing the stream: {e}");
            }
        }

        let waiters: Vec<(String, oneshot::Sender<Response>)> = {
            let mut state = self.state.lock();
            state.closed = true;
            state.tagged_subscriptions.clear();
            state.in_flight.drain().collect()
        };
        // Dropping the senders fails the corresponding requests.
        drop(waiters);
    }

    fn route(&self, mut response: Response) {
        match response.header.client_tag.take() {
            Some(tag) => {
                let waiter = self.state.lock().in_flight.remove(&tag);
                if let Some(waiter) = waiter {
                    debug!("received response for {tag}");
                    if waiter.send(response).is_err() {
                        debug!("discarding response for cancelled request {tag}");
                    }
                    return;
                }

                let subscription = self.state.lock().tagged_subscriptions.get(&tag).cloned();
                match subscription {
                    Some(callback) => {
                        debug!("received frame for subscription {tag}");
                        if catch_unwind(AssertUnwindSafe(|| callback(response))).is_err() {
                            error!("subscription callback for {tag} panicked");
                        }
                    }
                    None => {
                        error!("was not expecting a message with tag {tag}");
                    }
                }
            }
            None => {
                let handlers: Vec<UnsolicitedHandler> = self
                    .unsolicited_subs
                    .lock()
                    .iter()
                    .map(|(_, handler)| handler.clone())
                    .collect();
                for handler in handlers {
                    if catch_unwind(AssertUnwindSafe(|| handler(&response))).is_err() {
                        error!("unsolicited message handler panicked");
                    }
                }
            }
        }
    }
}

impl LeapEventLoop {
    /// Read frames until EOF and route them.
    ///
    /// Returns `Ok(())` when the stream ends normally; a decode failure or
    /// I/O error ends the loop with that error. Either way the session is
    /// over and the owner is expected to call [`LeapProtocol::close`].
    pub async fn run(mut self) -> Result<()> {
        loop {
            match self.reader.next().await {
                None => break Ok(()),
                Some(Ok(response)) => self.protocol.route(response),
                Some(Err(e)) => break Err(e),
            }
        }
    }
}
