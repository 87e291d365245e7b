//! # Realtime Channel Module
//!
//! WebSocket transport to the remote controller process.
//!
//! This module handles:
//! - Connecting to the peer's channel URL
//! - Sending named events wrapped in a JSON envelope
//! - Receiving and unwrapping inbound events
//!
//! Each text frame carries one envelope: `{"event": <name>, "data": <payload>}`.
//! The transport's reconnect and handshake internals are the library's
//! concern; this module only holds the handle. The send half is constructed
//! once per session and reused for every message.

pub mod channel_trait;

pub use channel_trait::ChannelIO;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::error::{ConsoleError, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One JSON envelope per text frame.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

/// Outbound half of the channel.
pub struct ChannelSender {
    sink: SplitSink<WsStream, Message>,
}

/// Inbound half of the channel.
pub struct ChannelReceiver {
    stream: SplitStream<WsStream>,
}

/// Connects to the peer and splits the channel into send and receive halves.
///
/// # Arguments
///
/// * `url` - WebSocket URL of the peer's channel endpoint
///
/// # Errors
///
/// Returns `Channel` error if the connection cannot be established.
///
/// # Examples
///
/// ```no_run
/// use drone_console::channel;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let (sender, receiver) = channel::connect("ws://192.168.5.198:5000/channel").await?;
///     Ok(())
/// }
/// ```
pub async fn connect(url: &str) -> Result<(ChannelSender, ChannelReceiver)> {
    debug!("Connecting to channel at {}", url);

    let (ws, _response) = tokio_tungstenite::connect_async(url)
        .await
        .map_err(|e| ConsoleError::Channel(format!("Failed to connect to {}: {}", url, e)))?;

    info!("Channel connected at {}", url);

    let (sink, stream) = ws.split();
    Ok((ChannelSender { sink }, ChannelReceiver { stream }))
}

#[async_trait]
impl ChannelIO for ChannelSender {
    async fn send_event(&mut self, event: &str, data: Value) -> io::Result<()> {
        let envelope = Envelope {
            event: event.to_string(),
            data,
        };
        let text = serde_json::to_string(&envelope)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        self.sink
            .send(Message::Text(text))
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::BrokenPipe, e))?;

        debug!("Sent {} event", event);
        Ok(())
    }
}

impl ChannelReceiver {
    /// Waits for the next inbound event.
    ///
    /// Returns `Ok(None)` when the peer closes the channel. Frames that are
    /// not valid envelopes are logged and skipped; the loop never halts on a
    /// malformed frame.
    pub async fn next_event(&mut self) -> Result<Option<(String, Value)>> {
        while let Some(frame) = self.stream.next().await {
            let message = frame
                .map_err(|e| ConsoleError::Channel(format!("Channel read failed: {}", e)))?;

            match message {
                Message::Text(text) => match serde_json::from_str::<Envelope>(&text) {
                    Ok(envelope) => return Ok(Some((envelope.event, envelope.data))),
                    Err(e) => {
                        warn!("Skipping malformed frame: {}", e);
                        continue;
                    }
                },
                Message::Close(_) => {
                    info!("Channel closed by peer");
                    return Ok(None);
                }
                // Ping/pong and binary frames are transport noise here
                _ => continue,
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ==================== Envelope Tests ====================

    #[test]
    fn test_envelope_round_trip() {
        let envelope = Envelope {
            event: "control".to_string(),
            data: json!({ "type": "keyboard", "code": "arm" }),
        };

        let text = serde_json::to_string(&envelope).unwrap();
        let parsed: Envelope = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.event, "control");
        assert_eq!(parsed.data, json!({ "type": "keyboard", "code": "arm" }));
    }

    #[test]
    fn test_envelope_missing_data_defaults_to_null() {
        let parsed: Envelope = serde_json::from_str(r#"{"event":"connect"}"#).unwrap();
        assert_eq!(parsed.event, "connect");
        assert_eq!(parsed.data, Value::Null);
    }

    #[test]
    fn test_envelope_rejects_missing_event() {
        let result = serde_json::from_str::<Envelope>(r#"{"data":{}}"#);
        assert!(result.is_err());
    }

    // ==================== Loopback Tests ====================

    /// Spins up a local WebSocket server for one connection.
    async fn loopback_server() -> (String, tokio::task::JoinHandle<Vec<String>>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();

            // Greet the client with a telemetry envelope, then collect what
            // the client sends until it disconnects
            ws.send(Message::Text(
                r#"{"event":"arm","data":false}"#.to_string(),
            ))
            .await
            .unwrap();

            let mut received = Vec::new();
            while let Some(Ok(message)) = ws.next().await {
                if let Message::Text(text) = message {
                    received.push(text);
                }
            }
            received
        });

        (format!("ws://{}", addr), handle)
    }

    #[tokio::test]
    async fn test_connect_send_and_receive() {
        let (url, server) = loopback_server().await;

        let (mut sender, mut receiver) = connect(&url).await.unwrap();

        // Inbound: the greeting envelope
        let (event, data) = receiver.next_event().await.unwrap().unwrap();
        assert_eq!(event, "arm");
        assert_eq!(data, json!(false));

        // Outbound: one control event
        sender
            .send_event("control", json!("takeoff"))
            .await
            .unwrap();
        drop(sender);
        drop(receiver);

        let received = server.await.unwrap();
        assert_eq!(received.len(), 1);
        let envelope: Envelope = serde_json::from_str(&received[0]).unwrap();
        assert_eq!(envelope.event, "control");
        assert_eq!(envelope.data, json!("takeoff"));
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Port 9 (discard) is almost certainly closed
        match connect("ws://127.0.0.1:9").await {
            Err(ConsoleError::Channel(msg)) => assert!(msg.contains("Failed to connect")),
            Err(other) => panic!("Expected Channel error, got: {:?}", other),
            Ok(_) => panic!("Connection to a closed port should fail"),
        }
    }

    #[tokio::test]
    async fn test_malformed_frames_are_skipped() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            ws.send(Message::Text("not json".to_string())).await.unwrap();
            ws.send(Message::Text(r#"{"no_event":1}"#.to_string()))
                .await
                .unwrap();
            ws.send(Message::Text(
                r#"{"event":"status","data":"Landing..."}"#.to_string(),
            ))
            .await
            .unwrap();
            ws.close(None).await.unwrap();
        });

        let (_sender, mut receiver) = connect(&format!("ws://{}", addr)).await.unwrap();

        // Both malformed frames skipped, the valid one delivered
        let (event, data) = receiver.next_event().await.unwrap().unwrap();
        assert_eq!(event, "status");
        assert_eq!(data, json!("Landing..."));

        // Close ends the stream
        assert!(receiver.next_event().await.unwrap().is_none());
    }
}
