//! Open Service Broker API envelopes and the broker's instance record.
//!
//! These types carry no behaviour beyond (de)serialization; the lifecycle
//! rules live in the `service` crate.

pub mod broker;
pub mod instance;

pub use broker::{
    BindingRequest, BindingResponse, Catalog, CreateServiceInstanceRequest, CreateServiceInstanceResponse,
    DeleteServiceInstanceResponse, Service, ServicePlan,
};
pub use instance::{Credential, ServiceInstance};
