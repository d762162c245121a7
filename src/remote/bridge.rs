//! Message Bridge
//!
//! `BookmarkProvider` over a window-message style channel. Requests go out
//! through an `Outbox`; the host feeds every inbound message to
//! `handle_message`, which resolves waiting calls and reports readiness and
//! change broadcasts.
//!
//! Calls wait until answered. Callers bound them; dropping a call forgets
//! its request, so a late answer is ignored.

use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::domain::{DomainError, DomainResult};

use super::provider::{BookmarkProvider, MoveTarget, NodeChanges, RemoteNode, Toolbar};
use super::rpc::{CallOutcome, PendingCalls};

const REQUEST_MARKER: &str = "__ntb";
const READY_MARKER: &str = "__ntb_ready";
const BROADCAST_MARKER: &str = "__ntb_broadcast";

/// Outbound half of the channel
pub trait Outbox: Send + Sync {
    fn post(&self, message: Value) -> DomainResult<()>;
}

/// What an inbound message meant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    /// The extension announced itself; time to connect
    Ready,
    /// Bookmarks changed remotely (`created`, `removed`, `changed`, `moved`)
    Changed(String),
    /// A response arrived; `delivered` is false for late or unknown ids
    Response { delivered: bool },
    /// Not addressed to us
    Ignored,
}

#[derive(Serialize)]
struct Request<'a> {
    #[serde(rename = "__ntb")]
    marker: bool,
    id: &'a str,
    method: &'a str,
    params: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateParams<'a> {
    parent_id: &'a str,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<usize>,
}

#[derive(Serialize)]
struct UpdateParams<'a> {
    id: &'a str,
    #[serde(flatten)]
    changes: &'a NodeChanges,
}

#[derive(Serialize)]
struct MoveParams<'a> {
    id: &'a str,
    #[serde(flatten)]
    target: &'a MoveTarget,
}

pub struct MessageBridge<O: Outbox> {
    outbox: O,
    pending: PendingCalls,
}

impl<O: Outbox> MessageBridge<O> {
    pub fn new(outbox: O) -> Self {
        Self {
            outbox,
            pending: PendingCalls::new(),
        }
    }

    /// Number of requests still waiting for an answer
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Classify an inbound message and deliver responses to their callers
    pub fn handle_message(&self, message: &Value) -> BridgeEvent {
        if flag(message, READY_MARKER) {
            return BridgeEvent::Ready;
        }

        if flag(message, REQUEST_MARKER) {
            // our own requests echo back on the same channel without `ok`
            let (Some(id), Some(ok)) = (
                message.get("id").and_then(Value::as_str),
                message.get("ok").and_then(Value::as_bool),
            ) else {
                return BridgeEvent::Ignored;
            };
            let outcome: CallOutcome = if ok {
                Ok(message.get("result").cloned().unwrap_or(Value::Null))
            } else {
                Err(message
                    .get("error")
                    .and_then(Value::as_str)
                    .filter(|e| !e.is_empty())
                    .unwrap_or("bookmarks provider error")
                    .to_string())
            };
            let delivered = self.pending.resolve(id, outcome);
            if !delivered {
                debug!("ignoring response for {}, no longer pending", id);
            }
            return BridgeEvent::Response { delivered };
        }

        if flag(message, BROADCAST_MARKER) {
            let kind = message.get("type").and_then(Value::as_str).unwrap_or("changed");
            return BridgeEvent::Changed(kind.to_string());
        }

        BridgeEvent::Ignored
    }

    async fn call(&self, method: &str, params: Value) -> DomainResult<Value> {
        let id = self.pending.next_id();
        let (rx, _guard) = self.pending.register(&id)?;
        let request = Request {
            marker: true,
            id: &id,
            method,
            params,
        };
        self.outbox.post(serde_json::to_value(&request)?)?;

        match rx.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(message)) => Err(DomainError::Remote(format!("{}: {}", method, message))),
            Err(_) => Err(DomainError::Remote(format!("{}: request abandoned", method))),
        }
    }

    async fn call_as<T: DeserializeOwned, P: Serialize>(&self, method: &str, params: &P) -> DomainResult<T> {
        let params = serde_json::to_value(params)?;
        let value = self.call(method, params).await?;
        serde_json::from_value(value)
            .map_err(|e| DomainError::Remote(format!("{}: unexpected result: {}", method, e)))
    }
}

#[async_trait]
impl<O: Outbox> BookmarkProvider for MessageBridge<O> {
    async fn get_toolbar(&self) -> DomainResult<Toolbar> {
        self.call_as("getToolbar", &Value::Object(Default::default())).await
    }

    async fn create_link(
        &self,
        parent_id: &str,
        title: &str,
        url: &str,
        index: Option<usize>,
    ) -> DomainResult<RemoteNode> {
        let params = CreateParams {
            parent_id,
            title,
            url: Some(url),
            index,
        };
        self.call_as("createLink", &params).await
    }

    async fn create_folder(&self, parent_id: &str, title: &str, index: Option<usize>) -> DomainResult<RemoteNode> {
        let params = CreateParams {
            parent_id,
            title,
            url: None,
            index,
        };
        self.call_as("createFolder", &params).await
    }

    async fn update_node(&self, id: &str, changes: NodeChanges) -> DomainResult<RemoteNode> {
        self.call_as("updateNode", &UpdateParams { id, changes: &changes }).await
    }

    async fn move_node(&self, id: &str, target: MoveTarget) -> DomainResult<RemoteNode> {
        self.call_as("moveNode", &MoveParams { id, target: &target }).await
    }

    async fn remove_node(&self, id: &str) -> DomainResult<()> {
        let _: Value = self.call_as("removeNode", &serde_json::json!({ "id": id })).await?;
        Ok(())
    }
}

fn flag(message: &Value, key: &str) -> bool {
    message.get(key).and_then(Value::as_bool) == Some(true)
}
