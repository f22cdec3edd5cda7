//! Retrying executor
//!
//! Wraps one engine runner and turns its run attempts into a single
//! forward-only event stream. Engine events are forwarded unchanged; the
//! executor injects exactly two event shapes of its own: a retry notice
//! before each reattempt and a terminal failure once the budget is spent.
//!
//! The user message is submitted to the engine on the first attempt only.
//! Reattempts pass no new message and resume from the session history the
//! engine already holds, so the user turn is never duplicated.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;

use crate::domain::{Content, Event, EventStream, EventStreamSender, SessionKey};
use crate::engine::Runner;
use crate::error::CoreResult;

/// Default retry budget for newly created executors
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Snapshot of an executor's identity and retry state
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorInfo {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
    pub max_retries: u32,
    pub retry_count: u32,
}

/// Per-message execution wrapper around one engine runner
pub struct RetryingExecutor {
    runner: Arc<dyn Runner>,
    key: SessionKey,
    max_retries: u32,
    retry_count: Arc<AtomicU32>,
}

impl RetryingExecutor {
    pub fn new(runner: Arc<dyn Runner>, key: SessionKey, max_retries: u32) -> Self {
        Self {
            runner,
            key,
            max_retries,
            retry_count: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Execute the agent and stream its events.
    ///
    /// The returned stream is forward-only and non-restartable. It
    /// terminates when the underlying run completes or after the terminal
    /// failure event; engine failures never surface as stream errors.
    /// Dropping the stream cancels the run at its next suspension point,
    /// including a pending retry delay.
    pub fn run_async(&self, new_message: &str) -> EventStream {
        let (tx, stream) = EventStream::channel(32);
        let runner = self.runner.clone();
        let key = self.key.clone();
        let max_retries = self.max_retries;
        let retry_count = self.retry_count.clone();
        let message = new_message.to_string();

        tokio::spawn(async move {
            pump(runner, key, message, max_retries, retry_count, tx).await;
        });

        stream
    }

    /// Synchronous mirror of [`run_async`](Self::run_async).
    ///
    /// Blocks the calling thread between events. Must not be called from
    /// inside the async runtime; it is meant for synchronous host code
    /// running alongside one.
    pub fn run(&self, new_message: &str) -> impl Iterator<Item = Event> {
        futures::executor::block_on_stream(self.run_async(new_message))
    }

    /// Release the engine resources held by this executor.
    pub async fn cleanup(&self) -> CoreResult<()> {
        self.runner.cleanup().await?;
        self.retry_count.store(0, Ordering::Relaxed);
        Ok(())
    }

    /// Identity and retry state of this executor.
    pub fn info(&self) -> ExecutorInfo {
        ExecutorInfo {
            app_name: self.key.app_name.clone(),
            user_id: self.key.user_id.clone(),
            session_id: self.key.session_id.clone(),
            max_retries: self.max_retries,
            retry_count: self.retry_count.load(Ordering::Relaxed),
        }
    }

    /// Session triple this executor is bound to.
    pub fn session_key(&self) -> &SessionKey {
        &self.key
    }
}

/// Drives the attempt loop for one `run_async` invocation.
///
/// Returns when the run completes, the retry budget is exhausted, or the
/// consumer drops the stream.
async fn pump(
    runner: Arc<dyn Runner>,
    key: SessionKey,
    message: String,
    max_retries: u32,
    retry_count: Arc<AtomicU32>,
    tx: EventStreamSender,
) {
    let mut failures: u32 = 0;
    retry_count.store(0, Ordering::Relaxed);

    loop {
        // The user message is passed on the first attempt only; retries
        // resume from the session state the engine already holds.
        let new_message = if failures == 0 {
            Some(Content::user_text(&message))
        } else {
            None
        };

        let mut events = runner.run_async(&key.user_id, &key.session_id, new_message);

        // One failure rule for the whole attempt: a stream error fails it,
        // and so does an engine event carrying an error code. The failing
        // event itself is not forwarded.
        let failure: Option<String> = loop {
            let item = tokio::select! {
                _ = tx.closed() => return,
                item = events.next() => item,
            };
            match item {
                Some(Ok(event)) if event.is_error() => {
                    break Some(
                        event
                            .error_message
                            .unwrap_or_else(|| "engine error event".to_string()),
                    );
                }
                Some(Ok(event)) => {
                    if tx.send(event).await.is_err() {
                        return;
                    }
                }
                Some(Err(e)) => break Some(e.to_string()),
                None => break None,
            }
        };
        drop(events);

        let Some(reason) = failure else {
            return;
        };

        failures += 1;
        retry_count.store(failures, Ordering::Relaxed);

        if failures > max_retries {
            tracing::error!(
                session_id = %key.session_id,
                "Agent execution failed after {max_retries} retry attempts: {reason}"
            );
            let _ = tx.send(Event::max_retries_exceeded(max_retries)).await;
            return;
        }

        if tx.send(Event::retry_attempt(failures, max_retries)).await.is_err() {
            return;
        }

        let retry_delay = Duration::from_secs(2u64.saturating_pow(failures - 1));
        tracing::warn!(
            session_id = %key.session_id,
            "Agent execution failed, retrying in {}s (attempt {failures}/{max_retries}): {reason}",
            retry_delay.as_secs()
        );

        tokio::select! {
            _ = tx.closed() => return,
            _ = tokio::time::sleep(retry_delay) => {}
        }
    }
}
