pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use crate::adapters::{
    openai::OpenAiClient, postnl::PostnlClient, script::ScriptRunner, storage::LocalStorage,
};
pub use crate::config::{RunOptions, TrackingConfig};
pub use crate::core::{agent::TrackingAgent, executor::RoutingExecutor, selector::CodeSelector};
pub use crate::utils::error::{Result, TrackError};
