//! bsync-config
//!
//! Client settings model plus disk persistence helpers.
//! Owns the ClientConfig data structure and nothing that talks to a server.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{ClientConfig, OrderingMode};
