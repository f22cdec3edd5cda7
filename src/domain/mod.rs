//! Domain types shared across the runtime
//!
//! Session identity, reserved identifiers, and the event vocabulary that
//! flows between the engine, the executor, and consumers.

mod event;

pub use event::*;

use serde::{Deserialize, Serialize};

/// Reserved model config id for the bootstrap-derived default LLM config.
pub const DEFAULT_MODEL_CONFIG_ID: &str = "__default_llm_config";

/// Synthetic app name carried by the built-in default model config.
pub const DEFAULT_MODEL_APP_NAME: &str = "__default_app";

/// Reserved agent name for the built-in default agent config.
pub const DEFAULT_AGENT_NAME: &str = "default";

/// Global identifier in the `"app_name:inner_id"` format used for tool and
/// MCP listing keys.
pub fn global_id(app_name: &str, inner_id: &str) -> String {
    format!("{app_name}:{inner_id}")
}

/// Identity of one conversation session.
///
/// All three parts are required; the triple is globally unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

impl SessionKey {
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }

    /// True when the session belongs to the given app/user pair.
    pub fn matches(&self, app_name: &str, user_id: &str) -> bool {
        self.app_name == app_name && self.user_id == user_id
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.app_name, self.user_id, self.session_id)
    }
}
