//! beacon-services: the registry of announced instances and its eviction sweep.

pub mod device_set;
pub mod instance;
pub mod registry;
pub mod sweeper;

pub use device_set::{DeviceSet, Purged, Upsert};
pub use instance::Instance;
pub use registry::Registry;
pub use sweeper::{sweep, sweep_loop, SweepReport};
