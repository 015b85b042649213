use async_trait::async_trait;
use bitflags::bitflags;
use contracts::query::{QueryMapFeaturesRequest, QueryMapFeaturesResponse};
use contracts::runtime_map::RuntimeMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;

bitflags! {
    /// Optional parts of a `CREATERUNTIMEMAP` response.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct RuntimeMapFeatureFlags: u32 {
        const LAYERS_AND_GROUPS = 1;
        const LAYER_ICONS = 2;
        const LAYER_FEATURE_SOURCES = 4;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRuntimeMapRequest {
    pub map_definition: String,
    pub session: String,
    pub requested_features: RuntimeMapFeatureFlags,
    pub target_map_name: String,
}

/// Operations the viewer core needs from the map server.
#[async_trait(?Send)]
pub trait MapAgent {
    /// Base URL of the agent endpoint, used by image overlay sources.
    fn agent_url(&self) -> &str;

    async fn create_session(&self, username: &str, password: &str)
    -> Result<String, ClientError>;

    async fn create_runtime_map(
        &self,
        request: &CreateRuntimeMapRequest,
    ) -> Result<RuntimeMap, ClientError>;

    /// Resource document content as JSON, with the root element unwrapped.
    async fn get_resource_json(&self, resource_id: &str, session: &str)
    -> Result<Value, ClientError>;

    async fn query_map_features(
        &self,
        request: &QueryMapFeaturesRequest,
    ) -> Result<QueryMapFeaturesResponse, ClientError>;

    /// Tile URL with the given placeholder tokens left in place of the tile
    /// column, row and scale index.
    fn tile_template_url(
        &self,
        resource_id: &str,
        group_name: &str,
        x_token: &str,
        y_token: &str,
        z_token: &str,
    ) -> String;

    /// String bundle for `locale`, or `None` when the server has none.
    async fn fetch_string_bundle(&self, locale: &str) -> Result<Option<Value>, ClientError>;
}

/// Fetches a resource document and decodes it into `T`.
pub async fn get_resource<T: DeserializeOwned>(
    agent: &dyn MapAgent,
    resource_id: &str,
    session: &str,
) -> Result<T, ClientError> {
    let json = agent.get_resource_json(resource_id, session).await?;
    serde_json::from_value(json).map_err(|e| ClientError::decode(resource_id, e))
}

/// Server documents wrap their content in a single root element named after
/// the resource type.
pub fn unwrap_root(value: Value) -> Value {
    match value {
        Value::Object(map) if map.len() == 1 => match map.into_iter().next() {
            Some((_, inner)) => inner,
            None => Value::Null,
        },
        other => other,
    }
}
