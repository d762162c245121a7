//! Remote Provider
//!
//! Optional bookmarks source. While connected it owns the data; the
//! application mirrors its toolbar and routes every mutation through it.

mod bridge;
mod coalesce;
mod provider;
mod rpc;
mod session;


pub use bridge::{BridgeEvent, MessageBridge, Outbox};
pub use coalesce::ChangeCoalescer;
pub use provider::{BookmarkProvider, MoveTarget, NodeChanges, RemoteNode, Toolbar};
pub use rpc::{CallOutcome, PendingCalls, PendingGuard};
pub use session::connect;
