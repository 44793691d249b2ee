use std::future::Future;
use std::sync::Arc;

use backend::{ClientError, Profile, VolumeBackend, VolumeRequest};
use models::{
    BindingResponse, Catalog, CreateServiceInstanceRequest, CreateServiceInstanceResponse, Credential,
    DeleteServiceInstanceResponse, Service, ServicePlan, ServiceInstance,
};
use tracing::{debug, info, instrument, warn};

use crate::errors::BrokerError;
use crate::observability::{self, BACKEND_CALL_DURATION, BACKEND_FAILURES_TOTAL};
use crate::params::ProvisionParameters;
use crate::registry::InstanceRegistry;

pub const SERVICE_NAME: &str = "opensds-service";
pub const SERVICE_ID: &str = "4f6e6cf6-ffdd-425f-a2c7-3c9258ad2468";
pub const SERVICE_DESCRIPTION: &str = "Policy based storage service";

/// Controller as shared by the HTTP layer.
pub type SharedController = Arc<LifecycleController<dyn VolumeBackend>>;

/// Broker-facing state machine over the registry and the volume backend.
///
/// Provision and deprovision hold the registry's exclusive lock across the
/// backend call, so mutations are totally ordered. Bind and instance lookups
/// take the shared lock. Catalog and unbind touch no shared state.
pub struct LifecycleController<B: VolumeBackend + ?Sized> {
    backend: Arc<B>,
    registry: InstanceRegistry,
}

impl<B: VolumeBackend + ?Sized> LifecycleController<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self::with_registry(backend, InstanceRegistry::new())
    }

    pub fn with_registry(backend: Arc<B>, registry: InstanceRegistry) -> Self {
        Self { backend, registry }
    }

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    /// One service whose plans are the backend's profiles. Never partial.
    #[instrument(skip(self))]
    pub async fn catalog(&self) -> Result<Catalog, BrokerError> {
        let profiles = match backend_call("list_profiles", self.backend.list_profiles()).await {
            Ok(p) => p,
            Err(e) => return finish("catalog", Err(e.into())),
        };
        let plans = profiles.into_iter().map(plan_from_profile).collect::<Vec<_>>();
        debug!(plans = plans.len(), "catalog built");
        finish(
            "catalog",
            Ok(Catalog {
                services: vec![Service {
                    name: SERVICE_NAME.to_string(),
                    id: SERVICE_ID.to_string(),
                    description: SERVICE_DESCRIPTION.to_string(),
                    tags: Vec::new(),
                    bindable: true,
                    plans,
                }],
            }),
        )
    }

    #[instrument(skip(self, req), fields(plan_id = %req.plan_id))]
    pub async fn create_service_instance(
        &self,
        id: &str,
        req: &CreateServiceInstanceRequest,
    ) -> Result<CreateServiceInstanceResponse, BrokerError> {
        let result = self.provision(id, req).await;
        finish("provision", result)
    }

    async fn provision(
        &self,
        id: &str,
        req: &CreateServiceInstanceRequest,
    ) -> Result<CreateServiceInstanceResponse, BrokerError> {
        let params = ProvisionParameters::from_map(&req.parameters)?;

        let mut registry = self.registry.lock_exclusive().await;
        if registry.contains(id) {
            warn!(instance_id = %id, "instance already provisioned");
            return Err(BrokerError::InstanceAlreadyExists(id.to_string()));
        }

        let volume_req = VolumeRequest {
            profile_id: req.plan_id.clone(),
            name: params.name,
            description: params.description,
            size: params.capacity,
        };
        let vol = backend_call("create_volume", self.backend.create_volume(&volume_req)).await?;

        let instance = ServiceInstance { name: id.to_string(), credential: Credential::for_volume(vol.id(), &vol.name) };
        info!(instance_id = %id, volume_id = %vol.id(), size = vol.size, event = "instance_created", "created service instance");
        registry.put(id, instance);
        Ok(CreateServiceInstanceResponse::default())
    }

    #[instrument(skip(self))]
    pub async fn get_service_instance(&self, id: &str) -> Result<ServiceInstance, BrokerError> {
        let registry = self.registry.lock_shared().await;
        let result = registry.get(id).cloned().ok_or_else(|| BrokerError::NoSuchInstance(id.to_string()));
        finish("get_instance", result)
    }

    #[instrument(skip(self))]
    pub async fn remove_service_instance(&self, id: &str) -> Result<DeleteServiceInstanceResponse, BrokerError> {
        let result = self.deprovision(id).await;
        finish("deprovision", result)
    }

    async fn deprovision(&self, id: &str) -> Result<DeleteServiceInstanceResponse, BrokerError> {
        let mut registry = self.registry.lock_exclusive().await;
        let Some(instance) = registry.get(id) else {
            debug!(instance_id = %id, "instance not registered; nothing to remove");
            return Ok(DeleteServiceInstanceResponse::default());
        };
        let volume_id = instance
            .credential
            .volume_id
            .clone()
            .ok_or_else(|| BrokerError::CredentialMissingField { instance_id: id.to_string(), field: "volumeId" })?;

        let res = backend_call("delete_volume", self.backend.delete_volume(&volume_id)).await?;
        if !res.is_success() {
            let reason = if res.error.is_empty() { format!("status {:?}", res.status) } else { res.error };
            warn!(instance_id = %id, %volume_id, %reason, "backend refused volume deletion; keeping record");
            BACKEND_FAILURES_TOTAL.with_label_values(&["delete_volume", "rejected"]).inc();
            return Err(BrokerError::BackendRejected(reason));
        }

        registry.remove(id);
        info!(instance_id = %id, %volume_id, event = "instance_removed", "removed service instance");
        Ok(DeleteServiceInstanceResponse::default())
    }

    /// Hand out the instance's stored credentials. Creates no state.
    #[instrument(skip(self))]
    pub async fn bind(&self, instance_id: &str, binding_id: &str) -> Result<BindingResponse, BrokerError> {
        let registry = self.registry.lock_shared().await;
        let result = registry
            .get(instance_id)
            .map(|inst| BindingResponse { credentials: inst.credential.clone() })
            .ok_or_else(|| BrokerError::NoSuchInstance(instance_id.to_string()));
        finish("bind", result)
    }

    /// Bindings are not recorded, so there is nothing to undo.
    pub async fn unbind(&self, instance_id: &str, binding_id: &str) -> Result<(), BrokerError> {
        debug!(%instance_id, %binding_id, "unbind is a no-op");
        finish("unbind", Ok(()))
    }
}

fn plan_from_profile(profile: Profile) -> ServicePlan {
    ServicePlan {
        name: profile.name,
        id: profile.base.id,
        description: profile.description,
        metadata: profile.storage_tags,
        free: true,
    }
}

async fn backend_call<T>(
    operation: &'static str,
    call: impl Future<Output = Result<T, ClientError>>,
) -> Result<T, ClientError> {
    let timer = BACKEND_CALL_DURATION.with_label_values(&[operation]).start_timer();
    let result = call.await;
    timer.observe_duration();
    if let Err(e) = &result {
        BACKEND_FAILURES_TOTAL.with_label_values(&[operation, e.kind()]).inc();
    }
    result
}

fn finish<T>(operation: &'static str, result: Result<T, BrokerError>) -> Result<T, BrokerError> {
    observability::record_operation(operation, result.is_ok());
    if let Err(e) = &result {
        warn!(operation, kind = e.kind(), error = %e, "broker operation failed");
    }
    result
}
