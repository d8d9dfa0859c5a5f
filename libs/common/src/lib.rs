//! Shared foundation for WellFlow services
//!
//! Provides logging initialization and configuration loading used by every
//! service in the workspace.

pub mod config_loader;
pub mod error;
pub mod logging;

pub use config_loader::load_config;
pub use error::{Error, Result};
pub use logging::{init_logging, LoggingOptions};
