//! Service-instance lifecycle for the OpenSDS service broker.
//! - [`registry::InstanceRegistry`] keeps instance credentials in memory.
//! - [`controller::LifecycleController`] maps broker operations onto the
//!   registry and a [`backend::VolumeBackend`].
//! - Instance state does not survive a restart.

pub mod controller;
pub mod errors;
pub mod mock;
pub mod observability;
pub mod params;
pub mod registry;

pub use controller::{LifecycleController, SharedController};
pub use errors::BrokerError;
pub use registry::InstanceRegistry;
