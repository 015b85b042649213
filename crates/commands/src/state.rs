//! Application state snapshot read by command predicates, and the reductions
//! of the startup actions into it.

use std::collections::BTreeMap;

use contracts::query::QueryMapFeaturesResponse;
use foundation::view::MapView;
use serde::{Deserialize, Serialize};

use crate::action::{
    Action, Capabilities, DEFAULT_LOCALE, InitErrorPayload, InitOptions, ViewerConfigOverrides,
};

/// Image formats and selection styling used by the map viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerConfig {
    pub image_format: String,
    pub selection_image_format: String,
    pub selection_color: String,
    pub point_selection_buffer: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            image_format: "PNG".into(),
            selection_image_format: "PNG8".into(),
            selection_color: "0x0000FFAA".into(),
            point_selection_buffer: 2,
        }
    }
}

impl ViewerConfig {
    pub fn apply_overrides(&mut self, overrides: &ViewerConfigOverrides) {
        if let Some(v) = &overrides.image_format {
            self.image_format = v.clone();
        }
        if let Some(v) = &overrides.selection_image_format {
            self.selection_image_format = v.clone();
        }
        if let Some(v) = &overrides.selection_color {
            self.selection_color = v.clone();
        }
        if let Some(v) = overrides.point_selection_buffer {
            self.point_selection_buffer = v;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableMap {
    /// Map group id shown to the user.
    pub name: String,
    /// Runtime map name.
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    pub locale: String,
    pub active_map_name: Option<String>,
    pub available_maps: Vec<AvailableMap>,
    pub viewer: ViewerConfig,
    pub capabilities: Capabilities,
}

impl Default for ConfigState {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            active_map_name: None,
            available_maps: Vec::new(),
            viewer: ViewerConfig::default(),
            capabilities: Capabilities::default(),
        }
    }
}

impl ConfigState {
    pub fn reduce(&mut self, action: &Action) {
        match action {
            Action::InitApp(payload) => {
                self.locale = if payload.locale.is_empty() {
                    DEFAULT_LOCALE.to_string()
                } else {
                    payload.locale.clone()
                };
                self.capabilities = payload.capabilities;
                self.active_map_name = Some(payload.active_map_name.clone());
                self.available_maps = payload
                    .maps
                    .iter()
                    .map(|m| AvailableMap {
                        name: m.map_group_id.clone(),
                        value: m.name.clone(),
                    })
                    .collect();
                if !payload.config.is_empty() {
                    self.viewer.apply_overrides(&payload.config);
                }
            }
            Action::SetActiveMap(name) if !name.is_empty() => {
                self.active_map_name = Some(name.clone());
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitErrorState {
    pub error: Option<InitErrorPayload>,
    pub options: Option<InitOptions>,
    pub include_stack: bool,
}

impl Default for InitErrorState {
    fn default() -> Self {
        Self {
            error: None,
            options: None,
            include_stack: true,
        }
    }
}

impl InitErrorState {
    pub fn reduce(&mut self, action: &Action) {
        if let Action::InitError(e) = action {
            self.error = Some(e.error.clone());
            self.options = Some(e.options.clone());
            self.include_stack = e.include_stack;
        }
    }
}

/// Per-map state tracked by the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapState {
    pub map_name: String,
    pub session_id: String,
    pub history: Vec<MapView>,
    pub history_index: usize,
    pub selection: Option<QueryMapFeaturesResponse>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub config: ConfigState,
    pub init_error: InitErrorState,
    pub maps: BTreeMap<String, MapState>,
    pub busy_count: usize,
    pub feature_tooltips_enabled: bool,
}

impl AppState {
    pub fn active_map(&self) -> Option<&MapState> {
        self.config
            .active_map_name
            .as_deref()
            .and_then(|name| self.maps.get(name))
    }

    pub fn active_map_mut(&mut self) -> Option<&mut MapState> {
        let name = self.config.active_map_name.clone()?;
        self.maps.get_mut(&name)
    }

    pub fn reduce(&mut self, action: &Action) {
        self.config.reduce(action);
        self.init_error.reduce(action);
        match action {
            Action::InitApp(payload) => {
                for info in &payload.maps {
                    self.maps.insert(
                        info.name.clone(),
                        MapState {
                            map_name: info.map.name.clone(),
                            session_id: info.map.session_id.clone(),
                            ..MapState::default()
                        },
                    );
                }
            }
            Action::SetMapTip(enabled) => self.feature_tooltips_enabled = *enabled,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{InitAppPayload, InitErrorAction, MapInfo};
    use crate::toolbar::PreparedToolbars;

    fn runtime_map(name: &str) -> contracts::runtime_map::RuntimeMap {
        serde_json::from_value(serde_json::json!({
            "Name": name,
            "MapDefinition": "Library://M.MapDefinition",
            "SessionId": "sess",
            "CoordinateSystem": { "EpsgCode": "3857", "MetersPerUnit": 1.0 },
            "Extents": {
                "LowerLeftCoordinate": { "X": 0.0, "Y": 0.0 },
                "UpperRightCoordinate": { "X": 1.0, "Y": 1.0 }
            }
        }))
        .unwrap()
    }

    fn init_app(config: ViewerConfigOverrides) -> Action {
        Action::InitApp(Box::new(InitAppPayload {
            active_map_name: "M_1".into(),
            initial_url: "server/TaskPane.html".into(),
            locale: "de".into(),
            maps: vec![MapInfo {
                name: "M_1".into(),
                map_group_id: "Group".into(),
                map: runtime_map("M_1"),
                initial_view: None,
                external_base_layers: vec![],
            }],
            config,
            capabilities: Capabilities {
                has_legend: true,
                ..Capabilities::default()
            },
            toolbars: PreparedToolbars::default(),
            title: None,
        }))
    }

    #[test]
    fn init_app_populates_config_and_maps() {
        let mut state = AppState::default();
        state.reduce(&init_app(ViewerConfigOverrides {
            selection_color: Some("0xFF0000FF".into()),
            ..Default::default()
        }));
        assert_eq!(state.config.locale, "de");
        assert!(state.config.capabilities.has_legend);
        assert_eq!(
            state.config.available_maps,
            vec![AvailableMap {
                name: "Group".into(),
                value: "M_1".into()
            }]
        );
        assert_eq!(state.config.viewer.selection_color, "0xFF0000FF");
        assert_eq!(state.config.viewer.image_format, "PNG");
        assert_eq!(state.active_map().unwrap().session_id, "sess");
    }

    #[test]
    fn set_active_map_replaces_name() {
        let mut state = AppState::default();
        state.reduce(&init_app(ViewerConfigOverrides::default()));
        state.reduce(&Action::SetActiveMap("Other".into()));
        assert_eq!(state.config.active_map_name.as_deref(), Some("Other"));
        assert!(state.active_map().is_none());
    }

    #[test]
    fn init_error_is_stored() {
        let mut state = AppState::default();
        state.reduce(&Action::InitError(InitErrorAction {
            error: InitErrorPayload {
                message: "boom".into(),
                stack: vec!["boom".into()],
            },
            include_stack: false,
            options: InitOptions::default(),
        }));
        assert_eq!(state.init_error.error.as_ref().unwrap().message, "boom");
        assert!(!state.init_error.include_stack);
    }
}
