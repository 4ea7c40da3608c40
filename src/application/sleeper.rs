//! Injectable delay used between allocation retries.

use async_trait::async_trait;
use std::time::Duration;

/// Waits for a given duration.
///
/// The allocator sleeps through this trait so tests can observe the backoff
/// without spending wall-clock time.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
