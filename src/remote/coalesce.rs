//! Change Coalescing
//!
//! Bursts of change broadcasts collapse into one re-fetch: each notice
//! takes a ticket, and only the newest ticket still stands after the quiet
//! period.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::timer;

#[derive(Debug, Clone)]
pub struct ChangeCoalescer {
    generation: Arc<AtomicU64>,
    quiet: Duration,
}

impl ChangeCoalescer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            quiet,
        }
    }

    /// Record a change and return its ticket
    pub fn notify(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Wait out the quiet period. True when no newer change arrived meanwhile,
    /// meaning this ticket owns the re-fetch.
    pub async fn settle(&self, ticket: u64) -> bool {
        timer::sleep(self.quiet).await;
        self.generation.load(Ordering::SeqCst) == ticket
    }
}
