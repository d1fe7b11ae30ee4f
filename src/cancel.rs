//! Deadlines and cancellation for client calls
//!
//! Every client operation is a plain future: dropping it aborts the request in
//! flight. These helpers race an operation against a deadline or a caller
//! signal and report which one won.

use crate::{Result, SwishError};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Run `future`, failing with [`SwishError::Timeout`] once `deadline` elapses
pub async fn with_deadline<F, T>(future: F, deadline: Duration) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(deadline, future).await {
        Ok(result) => result,
        Err(_) => {
            debug!(?deadline, "Deadline elapsed, request aborted");
            Err(SwishError::Timeout)
        }
    }
}

/// Run `future` until `signal` resolves, then fail with [`SwishError::Cancelled`]
pub async fn with_cancellation<F, S, T>(future: F, signal: S) -> Result<T>
where
    F: Future<Output = Result<T>>,
    S: Future<Output = ()>,
{
    tokio::select! {
        biased;
        _ = signal => {
            debug!("Cancelled by caller, request aborted");
            Err(SwishError::Cancelled)
        }
        result = future => result,
    }
}
