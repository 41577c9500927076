//! Coin Desk Service Library
//!
//! Wires persistence, market data, the selection manager, the price poller and
//! the advisor into one [`ServiceState`], and exposes the `coin-desk` command line.

use anyhow::{Context, Result};
use std::path::Path;

pub mod cli;
pub mod config;
pub mod logging;
pub mod service;
pub mod signals;


pub use cli::{Cli, CommandHandler, Commands};
pub use config::ServiceConfig;
pub use logging::initialize_logging;
pub use service::ServiceState;
pub use signals::shutdown_signal;

/// Load configuration from files and environment variables
pub fn load_configuration(path: Option<&Path>) -> Result<ServiceConfig> {
    config::load_config(path).context("Failed to load service configuration")
}
