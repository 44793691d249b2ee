use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Credentials handed to bind callers. The known fields are typed; anything
/// else the backend or operator attaches rides along in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(rename = "volumeId", default, skip_serializing_if = "Option::is_none")]
    pub volume_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Credential {
    pub const DEFAULT_POOL: &'static str = "rbd";

    /// Credential for a freshly created backend volume.
    pub fn for_volume(volume_id: &str, volume_name: &str) -> Self {
        Self {
            volume_id: Some(volume_id.to_string()),
            pool: Some(Self::DEFAULT_POOL.to_string()),
            image: Some(format!("OPENSDS:{volume_name}:{volume_id}")),
            extra: BTreeMap::new(),
        }
    }
}

/// One provisioned volume as the broker tracks it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInstance {
    pub name: String,
    pub credential: Credential,
}
