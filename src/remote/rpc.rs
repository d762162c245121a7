//! Pending Calls
//!
//! Correlates responses with outstanding requests by id. A request stays in
//! the table only while its caller is still waiting.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::domain::{DomainError, DomainResult};

/// Outcome delivered to a waiting caller: the result value or the error text
pub type CallOutcome = Result<Value, String>;

type Table = HashMap<String, oneshot::Sender<CallOutcome>>;

#[derive(Debug, Default)]
pub struct PendingCalls {
    table: Arc<Mutex<Table>>,
    seq: AtomicU64,
}

impl PendingCalls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh request id, `rpc_<unix millis>_<sequence>`
    pub fn next_id(&self) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        format!("rpc_{}_{}", Utc::now().timestamp_millis(), seq)
    }

    /// Start waiting for `id`. The entry is removed when the guard drops.
    pub fn register(&self, id: &str) -> DomainResult<(oneshot::Receiver<CallOutcome>, PendingGuard)> {
        let (tx, rx) = oneshot::channel();
        let mut table = lock(&self.table)?;
        if table.contains_key(id) {
            return Err(DomainError::Conflict(format!("request {} already pending", id)));
        }
        table.insert(id.to_string(), tx);
        Ok((
            rx,
            PendingGuard {
                id: id.to_string(),
                table: Arc::clone(&self.table),
            },
        ))
    }

    /// Hand a response to its waiter. False when nobody is waiting for `id`.
    pub fn resolve(&self, id: &str, outcome: CallOutcome) -> bool {
        let sender = match lock(&self.table) {
            Ok(mut table) => table.remove(id),
            Err(_) => None,
        };
        match sender {
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.table).map(|table| table.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Removes its request from the table when the waiting caller goes away
#[derive(Debug)]
pub struct PendingGuard {
    id: String,
    table: Arc<Mutex<Table>>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if let Ok(mut table) = self.table.lock() {
            table.remove(&self.id);
        }
    }
}

fn lock(table: &Mutex<Table>) -> DomainResult<MutexGuard<'_, Table>> {
    table
        .lock()
        .map_err(|_| DomainError::Internal("pending call table poisoned".to_string()))
}
