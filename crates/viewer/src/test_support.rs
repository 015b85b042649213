//! Recording engine and agent fakes.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};

use async_trait::async_trait;
use client::{ClientError, CreateRuntimeMapRequest, MapAgent};
use contracts::query::{QueryMapFeaturesRequest, QueryMapFeaturesResponse};
use contracts::runtime_map::RuntimeMap;
use foundation::Bounds;
use geo::Coord;
use serde_json::Value;

use crate::engine::{
    DrawSpec, Gestures, InteractionId, LayerId, LayerSpec, MapEngine, OverlayChange, OverlayId,
    OverlaySpec, ViewConfig,
};

pub fn sample_map() -> RuntimeMap {
    contracts::runtime_map::fixtures::runtime_map(
        "Sheboygan",
        "Library://Samples/Sheboygan.MapDefinition",
        "3857",
    )
}

#[derive(Debug)]
pub struct FakeLayer {
    pub id: LayerId,
    pub spec: LayerSpec,
    pub visible: bool,
    pub params: BTreeMap<String, String>,
    pub cleared: usize,
}

#[derive(Debug)]
pub struct FakeOverlay {
    pub spec: OverlaySpec,
    pub html: String,
    pub position: Option<Coord<f64>>,
    pub visible: bool,
}

/// Engine with an 800x600 viewport centered on the origin at resolution 1.
#[derive(Debug)]
pub struct FakeEngine {
    next_id: u64,
    pub size: (f64, f64),
    pub view_config: Option<ViewConfig>,
    pub center: Option<Coord<f64>>,
    pub resolution: Option<f64>,
    pub fitted: Vec<Bounds>,
    pub layers: Vec<FakeLayer>,
    pub overlays: BTreeMap<OverlayId, FakeOverlay>,
    pub interactions: Vec<(InteractionId, DrawSpec)>,
    pub removed_interactions: Vec<InteractionId>,
    pub gestures: Gestures,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            size: (800.0, 600.0),
            view_config: None,
            center: Some(Coord { x: 0.0, y: 0.0 }),
            resolution: Some(1.0),
            fitted: Vec::new(),
            layers: Vec::new(),
            overlays: BTreeMap::new(),
            interactions: Vec::new(),
            removed_interactions: Vec::new(),
            gestures: Gestures::empty(),
        }
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn layer(&self, name: &str) -> &FakeLayer {
        self.layers
            .iter()
            .find(|l| l.spec.name() == name)
            .unwrap_or_else(|| panic!("no layer named {name}"))
    }

    fn layer_mut(&mut self, id: LayerId) -> Option<&mut FakeLayer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub fn overlay(&self, id: OverlayId) -> &FakeOverlay {
        &self.overlays[&id]
    }

    pub fn overlays_with_class(&self, class: &str) -> Vec<&FakeOverlay> {
        self.overlays
            .values()
            .filter(|o| o.spec.class == class)
            .collect()
    }

    pub fn overlay_html_contains(&self, text: &str) -> bool {
        self.overlays.values().any(|o| o.html.contains(text))
    }
}

impl MapEngine for FakeEngine {
    fn size(&self) -> (f64, f64) {
        self.size
    }

    fn configure_view(&mut self, config: &ViewConfig) {
        self.view_config = Some(config.clone());
    }

    fn center(&self) -> Option<Coord<f64>> {
        self.center
    }

    fn resolution(&self) -> Option<f64> {
        self.resolution
    }

    fn set_center(&mut self, center: Coord<f64>) {
        self.center = Some(center);
    }

    fn set_resolution(&mut self, resolution: f64) {
        self.resolution = Some(resolution);
    }

    fn fit(&mut self, extent: &Bounds) {
        self.fitted.push(*extent);
        self.center = Some(extent.center());
        self.resolution = Some((extent.width() / self.size.0).max(extent.height() / self.size.1));
    }

    fn coordinate_from_pixel(&self, pixel: [f64; 2]) -> Option<Coord<f64>> {
        let center = self.center?;
        let res = self.resolution?;
        Some(Coord {
            x: center.x + (pixel[0] - self.size.0 / 2.0) * res,
            y: center.y - (pixel[1] - self.size.1 / 2.0) * res,
        })
    }

    fn add_layer(&mut self, spec: LayerSpec) -> LayerId {
        let id = LayerId(self.next());
        let (visible, params) = match &spec {
            LayerSpec::External { visible, .. } => (*visible, BTreeMap::new()),
            LayerSpec::Image { source, .. } => (true, source.params.clone()),
            _ => (true, BTreeMap::new()),
        };
        self.layers.push(FakeLayer {
            id,
            spec,
            visible,
            params,
            cleared: 0,
        });
        id
    }

    fn set_layer_visible(&mut self, id: LayerId, visible: bool) {
        if let Some(layer) = self.layer_mut(id) {
            layer.visible = visible;
        }
    }

    fn update_params(&mut self, id: LayerId, params: &[(&str, String)]) {
        if let Some(layer) = self.layer_mut(id) {
            for (k, v) in params {
                layer.params.insert(k.to_string(), v.clone());
            }
        }
    }

    fn clear_features(&mut self, id: LayerId) {
        if let Some(layer) = self.layer_mut(id) {
            layer.cleared += 1;
        }
    }

    fn add_overlay(&mut self, spec: OverlaySpec) -> OverlayId {
        let id = OverlayId(self.next());
        self.overlays.insert(
            id,
            FakeOverlay {
                spec,
                html: String::new(),
                position: None,
                visible: true,
            },
        );
        id
    }

    fn update_overlay(&mut self, id: OverlayId, change: OverlayChange) {
        let Some(overlay) = self.overlays.get_mut(&id) else {
            return;
        };
        match change {
            OverlayChange::Html(html) => overlay.html = html,
            OverlayChange::Position(c) => overlay.position = Some(c),
            OverlayChange::Visible(v) => overlay.visible = v,
            OverlayChange::Class(class) => overlay.spec.class = class,
            OverlayChange::Offset(offset) => overlay.spec.offset = offset,
        }
    }

    fn remove_overlay(&mut self, id: OverlayId) {
        self.overlays.remove(&id);
    }

    fn add_interaction(&mut self, spec: DrawSpec) -> InteractionId {
        let id = InteractionId(self.next());
        self.interactions.push((id, spec));
        id
    }

    fn remove_interaction(&mut self, id: InteractionId) {
        self.interactions.retain(|(i, _)| *i != id);
        self.removed_interactions.push(id);
    }

    fn set_gestures(&mut self, gestures: Gestures) {
        self.gestures = gestures;
    }
}

/// Agent that records feature queries and answers them from a queue.
/// Once the queue runs dry every query gets an empty response.
#[derive(Default)]
pub struct FakeAgent {
    requests: RefCell<Vec<QueryMapFeaturesRequest>>,
    responses: RefCell<VecDeque<Result<QueryMapFeaturesResponse, String>>>,
    repeat: Option<QueryMapFeaturesResponse>,
}

impl FakeAgent {
    /// Answers every query with `response`.
    pub fn with_response(mut self, response: QueryMapFeaturesResponse) -> Self {
        self.repeat = Some(response);
        self
    }

    /// Fails the next query.
    pub fn with_failure(self, message: &str) -> Self {
        self.responses.borrow_mut().push_back(Err(message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<QueryMapFeaturesRequest> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl MapAgent for FakeAgent {
    fn agent_url(&self) -> &str {
        "http://fake/mapguide/mapagent/mapagent.fcgi"
    }

    async fn create_session(&self, _username: &str, _password: &str) -> Result<String, ClientError> {
        Ok("session-1".to_string())
    }

    async fn create_runtime_map(
        &self,
        _request: &CreateRuntimeMapRequest,
    ) -> Result<RuntimeMap, ClientError> {
        Ok(sample_map())
    }

    async fn get_resource_json(&self, resource_id: &str, _session: &str) -> Result<Value, ClientError> {
        Err(ClientError::Server(format!("resource not found: {resource_id}")))
    }

    async fn query_map_features(
        &self,
        request: &QueryMapFeaturesRequest,
    ) -> Result<QueryMapFeaturesResponse, ClientError> {
        self.requests.borrow_mut().push(request.clone());
        let queued = self.responses.borrow_mut().pop_front();
        match queued {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(ClientError::Server(message)),
            None => Ok(self.repeat.clone().unwrap_or_default()),
        }
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

    async fn fetch_string_bundle(&self, _locale: &str) -> Result<Option<Value>, ClientError> {
        Ok(None)
    }
}
