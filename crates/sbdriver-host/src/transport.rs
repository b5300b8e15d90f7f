// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JSON-lines transport: one request per input line, one reply per output
// line, matched by the caller-chosen `id`.
//
//   in   {"id": 7, "call": {"method": "getApiUrl"}}
//   in   {"id": 8, "channel": "com.speedbook.taxidriver/config", "call": {"method": "x"}}
//   out  {"id": 7, "reply": ["https://api.example"]}
//   out  {"id": 8, "reply": null}
//
// `reply` is the decoded reply envelope; `null` means not implemented.
// Requests are served concurrently, so replies may come back out of order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use sbdriver_bridge::BinaryMessenger;
use sbdriver_core::MethodCall;
use sbdriver_core::error::Result;

#[derive(Debug, Deserialize)]
struct Request {
    id: Value,
    #[serde(default)]
    channel: Option<String>,
    call: MethodCall,
}

#[derive(Debug, Serialize)]
struct Reply {
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Reply {
    fn ok(id: Value, envelope: &[u8]) -> Self {
        let reply = if envelope.is_empty() {
            Value::Null
        } else {
            match serde_json::from_slice(envelope) {
                Ok(value) => value,
                Err(e) => return Self::failed(id, format!("undecodable reply envelope: {e}")),
            }
        };
        Self {
            id,
            reply: Some(reply),
            error: None,
        }
    }

    fn failed(id: Value, error: String) -> Self {
        Self {
            id,
            reply: None,
            error: Some(error),
        }
    }
}

/// Serve requests from `reader` until it closes and every in-flight request
/// has been answered on `writer`.
pub async fn serve<R, W>(
    reader: R,
    mut writer: W,
    messenger: BinaryMessenger,
    default_channel: &str,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Reply>();
    let mut out_tx = Some(out_tx);
    let mut lines = reader.lines();

    loop {
        tokio::select! {
            line = lines.next_line(), if out_tx.is_some() => {
                let Some(line) = line? else {
                    tracing::debug!("input closed, draining in-flight requests");
                    out_tx = None;
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }
                if let Some(tx) = &out_tx {
                    spawn_request(line, tx.clone(), messenger.clone(), default_channel);
                }
            }
            Some(reply) = out_rx.recv() => {
                let mut bytes = serde_json::to_vec(&reply)?;
                bytes.push(b'\n');
                writer.write_all(&bytes).await?;
                writer.flush().await?;
            }
            else => break,
        }
    }
    Ok(())
}

fn spawn_request(
    line: String,
    out: mpsc::UnboundedSender<Reply>,
    messenger: BinaryMessenger,
    default_channel: &str,
) {
    let request: Request = match serde_json::from_str(&line) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "unparseable request line");
            let _ = out.send(Reply::failed(Value::Null, format!("invalid request: {e}")));
            return;
        }
    };

    let channel = request
        .channel
        .unwrap_or_else(|| default_channel.to_owned());
    tokio::spawn(async move {
        let id = request.id;
        let reply = match request.call.encode() {
            Ok(payload) => match messenger.send(&channel, payload).await {
                Ok(envelope) => Reply::ok(id, &envelope),
                Err(e) => Reply::failed(id, e.to_string()),
            },
            Err(e) => Reply::failed(id, e.to_string()),
        };
        let _ = out.send(reply);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sbdriver_bridge::ConfigBridge;
    use sbdriver_bridge::messenger::{DEFAULT_CAPACITY, messenger};
    use sbdriver_bridge::providers::MapConfigProvider;
    use sbdriver_core::CONFIG_CHANNEL;

    async fn run(input: &str) -> Vec<Value> {
        let (messenger, mut host) = messenger(DEFAULT_CAPACITY);
        let provider = MapConfigProvider::from_pairs([("GOOGLE_MAPS_API_KEY", "AIzaXYZ")]);
        host.set_handler(CONFIG_CHANNEL, Arc::new(ConfigBridge::new(Arc::new(provider))));
        tokio::spawn(host.run());

        let mut output = Vec::new();
        serve(input.as_bytes(), &mut output, messenger, CONFIG_CHANNEL)
            .await
            .unwrap();

        let mut replies: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        replies.sort_by_key(|r| r["id"].as_i64().unwrap_or(-1));
        replies
    }

    #[tokio::test]
    async fn replies_are_matched_by_id() {
        let input = concat!(
            r#"{"id": 1, "call": {"method": "getGoogleMapsApiKey"}}"#,
            "\n",
            r#"{"id": 2, "call": {"method": "getApiUrl"}}"#,
            "\n",
            r#"{"id": 3, "call": {"method": "getUnknownThing"}}"#,
            "\n",
        );
        let replies = run(input).await;
        assert_eq!(replies.len(), 3);

        assert_eq!(replies[0]["reply"], serde_json::json!(["AIzaXYZ"]));
        assert_eq!(replies[1]["reply"][0], "META_DATA_ERROR");
        assert!(replies[1]["reply"][1].as_str().unwrap().contains("API_URL"));
        assert_eq!(replies[2]["reply"], Value::Null);
        assert!(replies[2].get("error").is_none());
    }

    #[tokio::test]
    async fn bad_lines_are_reported_and_skipped() {
        let input = "not json\n\n{\"id\": 5, \"call\": {\"method\": \"getGoogleMapsApiKey\"}}\n";
        let replies = run(input).await;
        assert_eq!(replies.len(), 2);
        assert!(replies[0]["error"].as_str().unwrap().starts_with("invalid request"));
        assert_eq!(replies[1]["id"], 5);
    }

    #[tokio::test]
    async fn other_channels_are_not_implemented() {
        let input = r#"{"id": 9, "channel": "com.speedbook.taxidriver/other", "call": {"method": "getApiUrl"}}"#;
        let replies = run(input).await;
        assert_eq!(replies[0]["reply"], Value::Null);
    }
}
