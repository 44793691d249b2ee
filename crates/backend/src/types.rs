//! Wire DTOs of the backend API. Field names follow the backend's JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseModel {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "createAt")]
    pub created_at: String,
    #[serde(default, rename = "updateAt")]
    pub updated_at: String,
}

/// A storage policy offered by the backend, listed as a catalog plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(flatten)]
    pub base: BaseModel,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "storageTags")]
    pub storage_tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeRequest {
    #[serde(rename = "profileId")]
    pub profile_id: String,
    pub name: String,
    pub description: String,
    pub size: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    #[serde(flatten)]
    pub base: BaseModel,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default, rename = "profileId")]
    pub profile_id: String,
}

impl Volume {
    pub fn id(&self) -> &str {
        &self.base.id
    }
}

/// Envelope returned by volume deletion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeletionResult {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub error: String,
}

impl DeletionResult {
    pub const SUCCESS: &'static str = "Success";

    pub fn is_success(&self) -> bool {
        self.status == Self::SUCCESS
    }
}
