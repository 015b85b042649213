//! Actions dispatched into application state.
//!
//! Serialized as `{ "type": ..., "payload": ... }`.

use std::collections::BTreeMap;

use contracts::runtime_map::RuntimeMap;
use foundation::view::MapView;
use serde::{Deserialize, Serialize};

use crate::toolbar::PreparedToolbars;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Action {
    #[serde(rename = "INIT_APP")]
    InitApp(Box<InitAppPayload>),
    #[serde(rename = "INIT_ERROR")]
    InitError(InitErrorAction),
    #[serde(rename = "TASK_INVOKE_URL")]
    TaskInvokeUrl { url: String },
    #[serde(rename = "MODAL_SHOW_URL")]
    ModalShowUrl {
        modal: ModalOptions,
        name: String,
        url: String,
    },
    #[serde(rename = "MAP_SET_MAPTIP")]
    SetMapTip(bool),
    #[serde(rename = "MAP_SET_ACTIVE_MAP")]
    SetActiveMap(String),
}

impl Action {
    pub fn type_name(&self) -> &'static str {
        match self {
            Action::InitApp(_) => "INIT_APP",
            Action::InitError(_) => "INIT_ERROR",
            Action::TaskInvokeUrl { .. } => "TASK_INVOKE_URL",
            Action::ModalShowUrl { .. } => "MODAL_SHOW_URL",
            Action::SetMapTip(_) => "MAP_SET_MAPTIP",
            Action::SetActiveMap(_) => "MAP_SET_ACTIVE_MAP",
        }
    }
}

/// Sink for actions.
pub trait Dispatcher {
    fn dispatch(&mut self, action: Action);
}

impl Dispatcher for Vec<Action> {
    fn dispatch(&mut self, action: Action) {
        self.push(action);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalOptions {
    pub title: String,
    pub backdrop: bool,
    pub size: [u32; 2],
}

/// Which chrome the layout asks the host to render.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub has_task_pane: bool,
    pub has_task_bar: bool,
    pub has_status_bar: bool,
    pub has_navigator: bool,
    pub has_selection_panel: bool,
    pub has_legend: bool,
    pub has_toolbar: bool,
}

/// A third-party tile layer shown beneath the server layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalBaseLayer {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

impl ExternalBaseLayer {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            visible: false,
            options: BTreeMap::new(),
        }
    }

    pub fn with_option(mut self, key: &str, value: impl Into<String>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }
}

/// Marks the first layer visible and the rest hidden.
pub fn default_base_layer_visibility(layers: &mut [ExternalBaseLayer]) {
    for (i, layer) in layers.iter_mut().enumerate() {
        layer.visible = i == 0;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapInfo {
    /// Runtime map name.
    pub name: String,
    pub map_group_id: String,
    pub map: RuntimeMap,
    pub initial_view: Option<MapView>,
    pub external_base_layers: Vec<ExternalBaseLayer>,
}

/// Viewer settings a layout may override. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerConfigOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_image_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_selection_buffer: Option<u32>,
}

impl ViewerConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitAppPayload {
    pub active_map_name: String,
    pub initial_url: String,
    pub locale: String,
    /// In runtime map creation order.
    pub maps: Vec<MapInfo>,
    pub config: ViewerConfigOverrides,
    pub capabilities: Capabilities,
    pub toolbars: PreparedToolbars,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitErrorPayload {
    pub message: String,
    pub stack: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitErrorAction {
    pub error: InitErrorPayload,
    pub include_stack: bool,
    pub options: InitOptions,
}

pub const DEFAULT_LOCALE: &str = "en";

/// Startup options read from the page query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitOptions {
    pub resource_id: Option<String>,
    pub locale: String,
    pub session: Option<String>,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            resource_id: None,
            locale: DEFAULT_LOCALE.to_string(),
            session: None,
        }
    }
}

impl InitOptions {
    /// Parses `resource`, `locale` and `session` from a query string, with or
    /// without the leading `?`. Empty values count as absent.
    pub fn from_query(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        let mut opts = Self::default();
        for (k, v) in url::form_urlencoded::parse(query.as_bytes()) {
            if v.is_empty() {
                continue;
            }
            match k.as_ref() {
                "resource" => opts.resource_id = Some(v.into_owned()),
                "locale" => opts.locale = v.into_owned(),
                "session" => opts.session = Some(v.into_owned()),
                _ => {}
            }
        }
        opts
    }

    /// Uses `resource_id` when the query string named none.
    pub fn or_resource(mut self, resource_id: Option<&str>) -> Self {
        if self.resource_id.is_none() {
            self.resource_id = resource_id.map(str::to_string);
        }
        self
    }
}
