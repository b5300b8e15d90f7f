// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-process binary messenger with per-call reply correlation.
//
// Callers hold a cloneable `BinaryMessenger`; the native side runs a
// `MessengerHost` loop that owns the channel handlers. Each message carries
// its own oneshot reply slot, so a reply can only ever reach the call that
// produced it, regardless of how many calls are in flight or in which order
// the host finishes them.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, oneshot};

use sbdriver_core::error::{Result, SbDriverError};
use sbdriver_core::{MethodCall, MethodResponse};

/// Default number of messages that may queue before `send` waits.
pub const DEFAULT_CAPACITY: usize = 64;

/// Handles raw envelopes arriving on one channel.
pub trait MessageHandler: Send + Sync {
    /// Turn a call envelope into a reply envelope.
    fn on_message(&self, payload: &[u8]) -> Result<Vec<u8>>;
}

struct Envelope {
    reply_id: u64,
    channel: String,
    payload: Vec<u8>,
    reply: oneshot::Sender<Result<Vec<u8>>>,
}

/// Sending half. Cheap to clone; all clones share one reply-id sequence.
#[derive(Clone)]
pub struct BinaryMessenger {
    tx: mpsc::Sender<Envelope>,
    next_reply_id: Arc<AtomicU64>,
}

impl BinaryMessenger {
    /// Send `payload` on `channel` and wait for its reply envelope.
    ///
    /// An empty reply means no handler answered the message.
    pub async fn send(&self, channel: &str, payload: Vec<u8>) -> Result<Vec<u8>> {
        let reply_id = self.next_reply_id.fetch_add(1, Ordering::Relaxed);
        let (reply, rx) = oneshot::channel();

        self.tx
            .send(Envelope {
                reply_id,
                channel: channel.to_owned(),
                payload,
                reply,
            })
            .await
            .map_err(|_| SbDriverError::ChannelClosed)?;

        rx.await.map_err(|_| SbDriverError::ChannelClosed)?
    }
}

/// Caller-side view of one named method channel.
#[derive(Clone)]
pub struct MethodChannel {
    name: String,
    messenger: BinaryMessenger,
}

impl MethodChannel {
    pub fn new(name: impl Into<String>, messenger: BinaryMessenger) -> Self {
        Self {
            name: name.into(),
            messenger,
        }
    }

    /// Invoke `call` and decode the reply.
    pub async fn invoke(&self, call: &MethodCall) -> Result<MethodResponse> {
        let reply = self.messenger.send(&self.name, call.encode()?).await?;
        MethodResponse::decode_envelope(&reply)
    }

    /// Invoke `method` with no arguments.
    pub async fn invoke_method(&self, method: &str) -> Result<MethodResponse> {
        self.invoke(&MethodCall::new(method)).await
    }
}

/// Receiving half: owns the handlers and answers messages one at a time.
pub struct MessengerHost {
    rx: mpsc::Receiver<Envelope>,
    handlers: HashMap<String, Arc<dyn MessageHandler>>,
}

impl MessengerHost {
    /// Register `handler` for `channel`, replacing any previous handler.
    pub fn set_handler(&mut self, channel: impl Into<String>, handler: Arc<dyn MessageHandler>) {
        let channel = channel.into();
        tracing::debug!(channel = %channel, "method channel handler registered");
        self.handlers.insert(channel, handler);
    }

    /// Serve messages until every `BinaryMessenger` clone has been dropped.
    pub async fn run(mut self) {
        tracing::info!(channels = self.handlers.len(), "messenger host started");
        while let Some(envelope) = self.rx.recv().await {
            self.dispatch(envelope);
        }
        tracing::info!("messenger host stopped");
    }

    fn dispatch(&self, envelope: Envelope) {
        let Envelope {
            reply_id,
            channel,
            payload,
            reply,
        } = envelope;

        let result = match self.handlers.get(&channel) {
            Some(handler) => handler.on_message(&payload),
            None => {
                tracing::warn!(reply_id, channel = %channel, "no handler for channel");
                Ok(Vec::new())
            }
        };

        if let Err(e) = &result {
            tracing::error!(reply_id, channel = %channel, error = %e, "handler failed");
        }
        if reply.send(result).is_err() {
            tracing::debug!(reply_id, "caller went away before the reply");
        }
    }
}

/// Create a connected messenger / host pair.
pub fn messenger(capacity: usize) -> (BinaryMessenger, MessengerHost) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        BinaryMessenger {
            tx,
            next_reply_id: Arc::new(AtomicU64::new(1)),
        },
        MessengerHost {
            rx,
            handlers: HashMap::new(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_bridge::ConfigBridge;
    use crate::providers::MapConfigProvider;
    use sbdriver_core::CONFIG_CHANNEL;

    fn config_host() -> (BinaryMessenger, MessengerHost) {
        let (messenger, mut host) = messenger(DEFAULT_CAPACITY);
        let provider = MapConfigProvider::from_pairs([
            ("GOOGLE_GEO_API_KEY", "geo"),
            ("GOOGLE_MAPS_API_KEY", "AIzaXYZ"),
        ]);
        host.set_handler(CONFIG_CHANNEL, Arc::new(ConfigBridge::new(Arc::new(provider))));
        (messenger, host)
    }

    #[tokio::test]
    async fn invoke_over_channel() {
        let (messenger, host) = config_host();
        tokio::spawn(host.run());

        let channel = MethodChannel::new(CONFIG_CHANNEL, messenger);
        assert_eq!(
            channel.invoke_method("getGoogleMapsApiKey").await.unwrap(),
            MethodResponse::success("AIzaXYZ")
        );
        assert!(channel.invoke_method("getUnknownThing").await.unwrap().is_not_implemented());
        assert!(matches!(
            channel.invoke_method("getApiUrl").await.unwrap(),
            MethodResponse::Error { .. }
        ));
    }

    #[tokio::test]
    async fn concurrent_calls_get_their_own_replies() {
        let (messenger, host) = config_host();
        tokio::spawn(host.run());

        let channel = MethodChannel::new(CONFIG_CHANNEL, messenger);
        let mut tasks = Vec::new();
        for i in 0..50 {
            let channel = channel.clone();
            tasks.push(tokio::spawn(async move {
                let method = if i % 2 == 0 { "getGoogleGeoApiKey" } else { "getGoogleMapsApiKey" };
                (i, channel.invoke_method(method).await.unwrap())
            }));
        }

        for task in tasks {
            let (i, resp) = task.await.unwrap();
            let expected = if i % 2 == 0 { "geo" } else { "AIzaXYZ" };
            assert_eq!(resp, MethodResponse::success(expected), "call {i}");
        }
    }

    #[tokio::test]
    async fn unregistered_channel_reads_as_not_implemented() {
        let (messenger, host) = config_host();
        tokio::spawn(host.run());

        let channel = MethodChannel::new("com.speedbook.taxidriver/other", messenger);
        assert!(channel.invoke_method("getApiUrl").await.unwrap().is_not_implemented());
    }

    #[tokio::test]
    async fn send_after_host_stops_is_channel_closed() {
        let (messenger, host) = config_host();
        drop(host);

        let err = messenger.send(CONFIG_CHANNEL, b"{}".to_vec()).await.unwrap_err();
        assert!(matches!(err, SbDriverError::ChannelClosed));
    }

    #[tokio::test]
    async fn handler_failure_reaches_the_caller() {
        struct Failing;
        impl MessageHandler for Failing {
            fn on_message(&self, _payload: &[u8]) -> Result<Vec<u8>> {
                Err(SbDriverError::Bridge("boom".into()))
            }
        }

        let (messenger, mut host) = messenger(DEFAULT_CAPACITY);
        host.set_handler("failing", Arc::new(Failing));
        tokio::spawn(host.run());

        let err = messenger.send("failing", Vec::new()).await.unwrap_err();
        assert!(matches!(err, SbDriverError::Bridge(_)));
    }
}
