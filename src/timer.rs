//! Timers
//!
//! `sleep` and `timeout` for both targets: tokio's clock natively, browser
//! timers through `gloo-timers` on wasm32.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// The deadline passed before the future finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline elapsed")]
pub struct Elapsed;

#[cfg(not(target_arch = "wasm32"))]
pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await
}

#[cfg(target_arch = "wasm32")]
pub async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await
}

/// Run `future` for at most `duration`; it is dropped on expiry
#[cfg(not(target_arch = "wasm32"))]
pub async fn timeout<F: Future>(duration: Duration, future: F) -> Result<F::Output, Elapsed> {
    tokio::time::timeout(duration, future).await.map_err(|_| Elapsed)
}

/// Run `future` for at most `duration`; it is dropped on expiry
#[cfg(target_arch = "wasm32")]
pub async fn timeout<F: Future>(duration: Duration, future: F) -> Result<F::Output, Elapsed> {
    use futures::future::{select, Either};

    let future = std::pin::pin!(future);
    let deadline = std::pin::pin!(sleep(duration));
    match select(future, deadline).await {
        Either::Left((output, _)) => Ok(output),
        Either::Right(((), _)) => Err(Elapsed),
    }
}
