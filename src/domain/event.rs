//! Event stream element and the channel-backed stream carrying it
//!
//! The runtime forwards engine events unchanged and injects exactly two
//! event shapes of its own: the retry notice and the terminal failure.

use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

/// Error code carried by injected retry events.
pub const RETRY_ATTEMPT_CODE: &str = "RETRY_ATTEMPT";

/// Error code carried by the terminal failure event.
pub const MAX_RETRIES_EXCEEDED_CODE: &str = "MAX_RETRIES_EXCEEDED";

/// Author of runtime-injected events.
pub const SYSTEM_AUTHOR: &str = "system";

/// One element of an agent event stream.
///
/// Engine-produced events pass through the runtime untouched; only the
/// fields below are meaningful to the core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Originator of the event (agent name or `"system"`)
    pub author: String,
    /// Message payload, absent on pure status/error events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    /// Side-effect flags attached to the event
    #[serde(default)]
    pub actions: EventActions,
    /// Machine-readable error class, absent on normal events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Human-readable error description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Event {
    /// Plain text event attributed to an author.
    pub fn text(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: Some(Content::model_text(text)),
            ..Default::default()
        }
    }

    /// Retry notice injected before reattempt `attempt` of `max_retries`.
    pub fn retry_attempt(attempt: u32, max_retries: u32) -> Self {
        let message = format!("Retry attempt {attempt}/{max_retries} for agent execution");
        Self {
            author: SYSTEM_AUTHOR.to_string(),
            content: Some(Content {
                role: SYSTEM_AUTHOR.to_string(),
                parts: vec![Part {
                    text: message.clone(),
                }],
            }),
            actions: EventActions::default(),
            error_code: Some(RETRY_ATTEMPT_CODE.to_string()),
            error_message: Some(message),
        }
    }

    /// Terminal failure event emitted once the retry budget is exhausted.
    pub fn max_retries_exceeded(max_retries: u32) -> Self {
        Self {
            author: SYSTEM_AUTHOR.to_string(),
            content: None,
            actions: EventActions { escalate: true },
            error_code: Some(MAX_RETRIES_EXCEEDED_CODE.to_string()),
            error_message: Some(format!(
                "Agent execution failed after {max_retries} retry attempts"
            )),
        }
    }

    /// True when the event carries an engine error class.
    ///
    /// Injected retry notices are not classified as errors here; the
    /// executor uses this to decide whether an engine event fails the
    /// current attempt.
    pub fn is_error(&self) -> bool {
        self.error_code
            .as_deref()
            .is_some_and(|code| !code.is_empty() && code != RETRY_ATTEMPT_CODE)
    }
}

/// Message payload of an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// User-authored text content, submitted on the first attempt of a run.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part { text: text.into() }],
        }
    }

    /// Model-authored text content.
    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: "model".to_string(),
            parts: vec![Part { text: text.into() }],
        }
    }

    /// Concatenated text of all parts.
    pub fn joined_text(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("")
    }
}

/// One piece of content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// Side-effect flags attached to an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EventActions {
    /// Escalate to the caller; set on the terminal failure event
    #[serde(default)]
    pub escalate: bool,
}

/// Forward-only event stream returned by the executor and sessions.
///
/// Dropping the stream is the cancellation signal: producers observe the
/// closed channel at their next send or sleep and stop promptly.
#[derive(Debug)]
pub struct EventStream {
    receiver: mpsc::Receiver<Event>,
}

impl EventStream {
    /// Create a sender/stream pair backed by a bounded channel.
    pub fn channel(buffer: usize) -> (EventStreamSender, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (EventStreamSender { sender: tx }, Self { receiver: rx })
    }

    /// Receive the next event, or `None` once the stream has terminated.
    pub async fn next_event(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Drain the stream to completion, collecting every event.
    pub async fn collect_all(mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some(event) = self.receiver.recv().await {
            events.push(event);
        }
        events
    }
}

impl Stream for EventStream {
    type Item = Event;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Sender half used by event producers.
#[derive(Clone)]
pub struct EventStreamSender {
    sender: mpsc::Sender<Event>,
}

impl EventStreamSender {
    /// Send one event; fails when the consumer dropped the stream.
    pub async fn send(&self, event: Event) -> Result<(), Event> {
        self.sender.send(event).await.map_err(|e| e.0)
    }

    /// Resolves once the consumer has dropped the stream.
    pub async fn closed(&self) {
        self.sender.closed().await
    }
}
