// LEAP for Rust
// SPDX-License-Identifier: MPL-2.0

//! The session supervisor.
//!
//! One monitor task per bridge drives the connection through its states:
//!
//! ```text
//! Disconnected -> Connecting -> Bootstrapping -> Connected <-> (reconnect)
//! ```
//!
//! Each cycle dials the connector, builds a fresh [`LeapProtocol`], runs
//! the read loop, the topology load and the ping loop as tasks, and tears
//! everything down on the first failure. Any of the documented
//! reconnectable failures leads back to Connecting after a fixed delay;
//! only closing the bridge ends the loop.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use serde_json::Value;
use tokio::sync::watch;
use tokio::time::timeout;

use leap_core::{LeapProtocol, SubscriptionCallback};
use leap_types::{BridgeResponseError, CommuniqueType, Error, Response, Result};

use crate::bridge::BridgeInner;
use crate::{events, topology};

/// How long a connection attempt may take.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// How long any single request may take. Enforced here and in the
/// façade, not in the protocol layer.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Ping cadence, measured from the completion of the previous ping.
pub const PING_INTERVAL: Duration = Duration::from_secs(60);

/// Delay between reconnect attempts.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Issue one request with the standard timeout and raise non-2xx
/// responses as [`BridgeResponseError`].
pub(crate) async fn request(
    leap: &LeapProtocol,
    communique_type: CommuniqueType,
    url: &str,
    body: Option<Value>,
) -> Result<Response> {
    let response = timeout(REQUEST_TIMEOUT, leap.request(communique_type, url, body))
        .await
        .map_err(|_| Error::TimedOut)??;
    if response.is_successful() {
        Ok(response)
    } else {
        Err(BridgeResponseError(response).into())
    }
}

/// Subscribe with the standard timeout; non-2xx responses are an error
/// and leave no subscription behind.
pub(crate) async fn subscribe(
    leap: &LeapProtocol,
    url: &str,
    callback: SubscriptionCallback,
    body: Option<Value>,
) -> Result<(Response, String)> {
    let (response, tag) = timeout(
        REQUEST_TIMEOUT,
        leap.subscribe(url, callback, body, CommuniqueType::SubscribeRequest),
    )
    .await
    .map_err(|_| Error::TimedOut)??;
    if response.is_successful() {
        Ok((response, tag))
    } else {
        Err(BridgeResponseError(response).into())
    }
}

/// The monitor task. Runs until the bridge is closed.
pub(crate) async fn monitor(inner: Arc<BridgeInner>) {
    let mut closed = inner.closed_tx.subscribe();
    loop {
        if *closed.borrow() {
            break;
        }
        match monitor_once(&inner, &mut closed).await {
            Ok(()) => break,
            Err(e) => {
                inner.connected_tx.send_replace(false);
                if *closed.borrow() {
                    break;
                }
                warn!("lost connection to the bridge: {e}; reconnecting in {RECONNECT_DELAY:?}");
            }
        }
        tokio::select! {
            _ = tokio::time::sleep(RECONNECT_DELAY) => {}
            _ = closed.wait_for(|closed| *closed) => break,
        }
    }
    inner.connected_tx.send_replace(false);
    debug!("bridge monitor finished");
}

/// One connection lifecycle: connect, bootstrap, stay connected until
/// something fails. `Ok(())` means the bridge was closed on purpose.
async fn monitor_once(
    inner: &Arc<BridgeInner>,
    closed: &mut watch::Receiver<bool>,
) -> Result<()> {
    let stream = tokio::select! {
        connected = timeout(CONNECT_TIMEOUT, inner.connector.connect()) => {
            match connected {
                Ok(Ok(stream)) => stream,
                Ok(Err(e)) => return Err(e),
                Err(_) => return Err(Error::TimedOut),
            }
        }
        _ = closed.wait_for(|closed| *closed) => return Ok(()),
    };

    let (read, write) = tokio::io::split(stream);
    let (leap, event_loop) = LeapProtocol::new(read, write);

    let router = inner.clone();
    leap.subscribe_unsolicited(Arc::new(move |response| {
        events::handle_unsolicited(&router, response)
    }));
    inner.leap.store(Some(leap.clone()));

    let mut read_task = tokio::spawn(event_loop.run());
    let mut login_task = tokio::spawn(topology::login(inner.clone(), leap.clone()));
    let mut ping_task = tokio::spawn(ping_loop(leap.clone()));
    let mut logged_in = false;

    let result = loop {
        tokio::select! {
            read = &mut read_task => {
                break match read {
                    Ok(Ok(())) => Err(Error::Disconnected),
                    Ok(Err(e)) => Err(e),
                    Err(_) => Err(Error::Disconnected),
                };
            }
            ping = &mut ping_task => {
                break match ping {
                    Ok(Err(e)) => Err(e),
                    _ => Err(Error::Disconnected),
                };
            }
            login = &mut login_task, if !logged_in => {
                match login {
                    Ok(Ok(())) => {
                        logged_in = true;
                        info!("bridge login complete");
                        inner.connected_tx.send_replace(true);
                    }
                    Ok(Err(e)) => break Err(e),
                    Err(_) => break Err(Error::Disconnected),
                }
            }
            _ = closed.wait_for(|closed| *closed) => break Ok(()),
        }
    };

    read_task.abort();
    login_task.abort();
    ping_task.abort();
    inner.leap.store(None);
    inner.connected_tx.send_replace(false);
    leap.close().await;

    result
}

/// The keepalive loop. Returns only on failure, after closing the
/// protocol so the read loop unblocks and the monitor reconnects.
async fn ping_loop(leap: Arc<LeapProtocol>) -> Result<()> {
    loop {
        tokio::time::sleep(PING_INTERVAL).await;
        let ping = leap.request(CommuniqueType::ReadRequest, "/server/1/status/ping", None);
        match timeout(REQUEST_TIMEOUT, ping).await {
            Ok(Ok(response)) if response.is_successful() => {
                debug!("ping answered");
            }
            Ok(Ok(response)) => {
                warn!(
                    "ping returned status {:?}; closing the connection",
                    response.header.status_code
                );
                leap.close().await;
                return Err(BridgeResponseError(response).into());
            }
            Ok(Err(e)) => {
                warn!("ping failed: {e}; closing the connection");
                leap.close().await;
                return Err(e);
            }
            Err(_) => {
                warn!("ping timed out; closing the connection");
                leap.close().await;
                return Err(Error::TimedOut);
            }
        }
    }
}
