//! # Hydra - Multi-Session Agent Orchestration Runtime
//!
//! Hydra is a multi-session, multi-agent orchestration runtime layered
//! over a pluggable LLM execution engine. It owns session lifecycles,
//! per-session agent pools, typed configuration with cross-reference
//! validation, MCP tool wiring, and a retry-wrapped event-streaming
//! execution path. The engine itself (model invocation, MCP transports,
//! conversation persistence) stays behind the [`engine`] facade.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hydra::config::Settings;
//! use hydra::engine::Engine;
//! use hydra::Context;
//!
//! async fn example(engine: Arc<dyn Engine>) -> anyhow::Result<()> {
//!     let settings = Settings::new()?;
//!     let mut context = Context::new(settings, engine);
//!     context.start().await?;
//!
//!     let sessions = context.session_manager().expect("started");
//!     let session = sessions.create_session("my-app", "alice", None).await?;
//!     let mut events = session.process_message("hello", None).await?;
//!     while let Some(event) = events.next_event().await {
//!         println!("{event:?}");
//!     }
//!
//!     context.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: session identity, reserved ids, the event vocabulary
//! - **Persistence**: typed config stores (in-memory and SQL)
//! - **Managers**: model, MCP, tool, and agent config management
//! - **Execution**: the agent factory and the retrying executor
//! - **Sessions**: per-session agent pools and the global session manager
//! - **Context**: the root object wiring everything together

pub mod agent;
pub mod config;
mod context;
pub mod domain;
pub mod engine;
pub mod error;
pub mod mcp;
pub mod model;
pub mod persistence;
pub mod session;
pub mod tool;

pub use context::Context;
pub use error::{CoreError, CoreResult};
