//! Agent configuration and execution
//!
//! Agent config records with cross-reference validation, the factory that
//! materializes engine runners from them, and the retrying executor that
//! wraps every run.

mod config;
mod config_manager;
mod executor;
mod factory;

#[cfg(test)]
mod config_manager_test;

pub use config::{default_agent_config, AgentConfig};
pub use config_manager::AgentConfigManager;
pub use executor::{ExecutorInfo, RetryingExecutor};
pub use factory::AgentFactory;
