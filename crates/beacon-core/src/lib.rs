//! beacon-core: network keys and configuration shared by every Beacon crate.

pub mod config;
pub mod key;

pub use config::{BeaconConfig, ConfigError};
pub use key::{KeyDeriver, KeyError, NetworkKey};
