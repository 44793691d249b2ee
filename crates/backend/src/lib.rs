//! Client for the OpenSDS storage backend REST API.
//!
//! - [`VolumeBackend`] is the narrow seam the broker controller depends on.
//! - [`HttpBackendClient`] implements it over reqwest with bounded timeouts.
//! - Every response status is run through [`status::classify`] before the
//!   body is looked at.

pub mod client;
pub mod error;
pub mod status;
pub mod types;

pub use client::{HttpBackendClient, VolumeBackend};
pub use error::ClientError;
pub use status::{classify, StatusClass};
pub use types::{BaseModel, DeletionResult, Profile, Volume, VolumeRequest};
