//! Realtime change notifications.
//!
//! Joins one Phoenix channel per table on the remote's realtime socket and
//! forwards every insert, update or delete as a [`ChangeEvent`]. Events
//! carry no row data: listeners re-fetch the whole collection.

use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::client::{ContentError, RestClient};
use super::types::ContentKind;

/// Interval between channel heartbeats.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Kind of row change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Insert,
    Update,
    Delete,
}

impl ChangeAction {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "INSERT" => Some(ChangeAction::Insert),
            "UPDATE" => Some(ChangeAction::Update),
            "DELETE" => Some(ChangeAction::Delete),
            _ => None,
        }
    }
}

/// A change to one content table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ContentKind,
    pub action: ChangeAction,
}

/// Source of change notifications.
pub trait ChangeFeed: Send + Sync + 'static {
    /// Start listening for changes to one table.
    ///
    /// Dropping the receiver ends the listener.
    fn listen(
        &self,
        kind: ContentKind,
    ) -> impl Future<Output = Result<mpsc::UnboundedReceiver<ChangeEvent>, ContentError>> + Send;
}

/// Phoenix protocol frame.
#[derive(Debug, Deserialize)]
struct PhoenixMessage {
    topic: String,
    event: String,
    #[serde(default)]
    payload: serde_json::Value,
}

/// Channel topic for a table.
fn topic_for(kind: ContentKind) -> String {
    format!("realtime:public:{}", kind.table())
}

fn join_frame(kind: ContentKind, access_token: &str, msg_ref: u64) -> String {
    json!({
        "topic": topic_for(kind),
        "event": "phx_join",
        "payload": {
            "config": {
                "broadcast": { "self": false },
                "presence": { "key": "" },
                "postgres_changes": [
                    { "event": "*", "schema": "public", "table": kind.table() }
                ]
            },
            "access_token": access_token
        },
        "ref": msg_ref.to_string()
    })
    .to_string()
}

fn heartbeat_frame(msg_ref: u64) -> String {
    json!({
        "topic": "phoenix",
        "event": "heartbeat",
        "payload": {},
        "ref": msg_ref.to_string()
    })
    .to_string()
}

/// Extract a change notification for `kind` from a text frame.
fn parse_change(text: &str, kind: ContentKind) -> Option<ChangeAction> {
    let message: PhoenixMessage = serde_json::from_str(text).ok()?;
    if message.topic != topic_for(kind) {
        return None;
    }

    match message.event.as_str() {
        "postgres_changes" => message
            .payload
            .pointer("/data/type")
            .and_then(|t| t.as_str())
            .and_then(ChangeAction::parse),
        "phx_reply" => {
            if message.payload.get("status").and_then(|s| s.as_str()) == Some("error") {
                tracing::warn!("Realtime join for {} rejected: {}", kind, message.payload);
            }
            None
        }
        other => ChangeAction::parse(other),
    }
}

/// Realtime socket of the remote store.
pub struct RealtimeFeed {
    socket_url: String,
    access_token: String,
}

impl RealtimeFeed {
    /// Feed for the project at `base_url` (http or https).
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            base.to_string()
        };

        Self {
            socket_url: format!(
                "{}/realtime/v1/websocket?apikey={}&vsn=1.0.0",
                ws_base, anon_key
            ),
            access_token: anon_key.to_string(),
        }
    }

    /// Feed for the same project a REST client talks to.
    pub fn for_client(client: &RestClient) -> Self {
        let mut feed = Self::new(client.base_url(), client.anon_key());
        feed.access_token = client.access_token().to_string();
        feed
    }

    pub fn socket_url(&self) -> &str {
        &self.socket_url
    }
}

impl ChangeFeed for RealtimeFeed {
    async fn listen(
        &self,
        kind: ContentKind,
    ) -> Result<mpsc::UnboundedReceiver<ChangeEvent>, ContentError> {
        let (socket, _) = connect_async(self.socket_url.as_str())
            .await
            .map_err(|e| ContentError::Realtime(format!("connect failed: {}", e)))?;

        let (mut write, read) = socket.split();

        write
            .send(Message::Text(join_frame(kind, &self.access_token, 1)))
            .await
            .map_err(|e| ContentError::Realtime(format!("join failed: {}", e)))?;

        tracing::info!("Subscribed to {} changes", kind);

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_channel(write, read, tx, kind));

        Ok(rx)
    }
}

/// Pump frames until the socket closes or the receiver is dropped.
async fn run_channel<W, R, E>(
    mut write: W,
    mut read: R,
    tx: mpsc::UnboundedSender<ChangeEvent>,
    kind: ContentKind,
) where
    W: Sink<Message, Error = E> + Unpin,
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: std::fmt::Display,
{
    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    let mut msg_ref = 1u64;

    loop {
        tokio::select! {
            _ = tx.closed() => break,
            _ = heartbeat.tick() => {
                msg_ref += 1;
                if let Err(e) = write.send(Message::Text(heartbeat_frame(msg_ref))).await {
                    tracing::warn!("Realtime heartbeat for {} failed: {}", kind, e);
                    break;
                }
            }
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if let Some(action) = parse_change(&text, kind) {
                        tracing::debug!("{:?} on {}", action, kind);
                        if tx.send(ChangeEvent { kind, action }).is_err() {
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("Realtime socket for {} failed: {}", kind, e);
                    break;
                }
            },
        }
    }

    let _ = write.close().await;
    tracing::debug!("Realtime listener for {} stopped", kind);
}
