//! In-memory server fakes and sample documents.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use async_trait::async_trait;
use client::{ClientError, CreateRuntimeMapRequest, MapAgent, ProjectionResolver};
use contracts::query::{QueryMapFeaturesRequest, QueryMapFeaturesResponse};
use contracts::runtime_map::RuntimeMap;
use serde_json::Value;

pub use contracts::fusion::fixtures::app_def_json;
pub use contracts::weblayout::fixtures::web_layout_json;

pub const SESSION: &str = "session-1";

/// Sample runtime map bound to [`SESSION`].
pub fn runtime_map(name: &str, map_def: &str, epsg: &str) -> RuntimeMap {
    let mut map = contracts::runtime_map::fixtures::runtime_map(name, map_def, epsg);
    map.session_id = SESSION.to_string();
    map
}

#[derive(Default)]
pub struct FakeAgent {
    resources: HashMap<String, Value>,
    bundles: HashMap<String, Value>,
    epsg: String,
    sessions: Cell<usize>,
    maps: Cell<usize>,
}

impl FakeAgent {
    pub fn with_resource(mut self, id: &str, doc: Value) -> Self {
        self.resources.insert(id.to_string(), doc);
        self
    }

    pub fn with_bundle(mut self, locale: &str, bundle: Value) -> Self {
        self.bundles.insert(locale.to_string(), bundle);
        self
    }

    /// EPSG code reported by every created runtime map.
    pub fn with_epsg(mut self, epsg: &str) -> Self {
        self.epsg = epsg.to_string();
        self
    }

    pub fn sessions_created(&self) -> usize {
        self.sessions.get()
    }

    pub fn maps_created(&self) -> usize {
        self.maps.get()
    }
}

#[async_trait(?Send)]
impl MapAgent for FakeAgent {
    fn agent_url(&self) -> &str {
        "http://fake/mapguide/mapagent/mapagent.fcgi"
    }

    async fn create_session(&self, _username: &str, _password: &str) -> Result<String, ClientError> {
        self.sessions.set(self.sessions.get() + 1);
        Ok(format!("session-{}", self.sessions.get()))
    }

    async fn create_runtime_map(
        &self,
        request: &CreateRuntimeMapRequest,
    ) -> Result<RuntimeMap, ClientError> {
        self.maps.set(self.maps.get() + 1);
        let mut map = runtime_map(&request.target_map_name, &request.map_definition, &self.epsg);
        map.session_id = request.session.clone();
        Ok(map)
    }

    async fn get_resource_json(&self, resource_id: &str, _session: &str) -> Result<Value, ClientError> {
        self.resources
            .get(resource_id)
            .cloned()
            .ok_or_else(|| ClientError::Server(format!("resource not found: {resource_id}")))
    }

    async fn query_map_features(
        &self,
        _request: &QueryMapFeaturesRequest,
    ) -> Result<QueryMapFeaturesResponse, ClientError> {
        Ok(QueryMapFeaturesResponse::default())
    }

    fn tile_template_url(
        &self,
        resource_id: &str,
        group_name: &str,
        x_token: &str,
        y_token: &str,
        z_token: &str,
    ) -> String {
        format!("tile/{resource_id}/{group_name}/{z_token}/{x_token}/{y_token}")
    }

    async fn fetch_string_bundle(&self, locale: &str) -> Result<Option<Value>, ClientError> {
        Ok(self.bundles.get(locale).cloned())
    }
}

#[derive(Default)]
pub struct FakeResolver {
    defs: HashMap<String, String>,
    lookups: RefCell<Vec<String>>,
}

impl FakeResolver {
    pub fn with(mut self, epsg: &str, proj4: &str) -> Self {
        self.defs.insert(epsg.to_string(), proj4.to_string());
        self
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.borrow().clone()
    }
}

#[async_trait(?Send)]
impl ProjectionResolver for FakeResolver {
    async fn resolve(&self, epsg: &str) -> Result<Option<String>, ClientError> {
        self.lookups.borrow_mut().push(epsg.to_string());
        Ok(self.defs.get(epsg).cloned())
    }
}
