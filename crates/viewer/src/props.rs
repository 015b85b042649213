//! Declarative viewer inputs.

use std::time::Duration;

use bitflags::bitflags;
use commands::{ExternalBaseLayer, ViewerConfig};
use contracts::query::QueryMapFeaturesResponse;
use foundation::ViewTarget;
use geo::Coord;

/// Debounce window for layer and group visibility refreshes.
pub const DEFAULT_STATE_CHANGE_DEBOUNCE: Duration = Duration::from_millis(500);
/// Quiet period before a hover tooltip query is sent.
pub const FEATURE_TOOLTIP_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Which pointer interactions are live. Exactly one at a time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ActiveTool {
    Zoom,
    Select,
    #[default]
    Pan,
    None,
}

bitflags! {
    /// Overlays forced to reload by a refresh.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct RefreshMode: u32 {
        const LAYERS_ONLY = 1;
        const SELECTION_ONLY = 2;
    }
}

/// Layers and groups whose visibility differs from the runtime map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerGroupVisibility {
    pub show_layers: Vec<String>,
    pub show_groups: Vec<String>,
    pub hide_layers: Vec<String>,
    pub hide_groups: Vec<String>,
}

impl LayerGroupVisibility {
    /// Dynamic overlay params for this visibility state.
    pub fn to_params(&self) -> [(&'static str, String); 4] {
        [
            ("showlayers", self.show_layers.join(",")),
            ("showgroups", self.show_groups.join(",")),
            ("hidelayers", self.hide_layers.join(",")),
            ("hidegroups", self.hide_groups.join(",")),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerProps {
    pub tool: ActiveTool,
    /// Requested view. Applying it does not echo a view request back.
    pub view: Option<ViewTarget>,
    pub feature_tooltips_enabled: bool,
    pub image_format: String,
    /// Format requested for inline selection images in queries.
    pub selection_image_format: String,
    pub selection_color: String,
    /// Half size in pixels of the box queried by a select click.
    pub point_selection_buffer: u32,
    pub state_change_debounce: Duration,
    pub external_base_layers: Vec<ExternalBaseLayer>,
    pub layer_group_visibility: Option<LayerGroupVisibility>,
}

impl Default for ViewerProps {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}

impl ViewerProps {
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            tool: ActiveTool::default(),
            view: None,
            feature_tooltips_enabled: true,
            image_format: config.image_format.clone(),
            selection_image_format: config.selection_image_format.clone(),
            selection_color: config.selection_color.clone(),
            point_selection_buffer: config.point_selection_buffer,
            state_change_debounce: DEFAULT_STATE_CHANGE_DEBOUNCE,
            external_base_layers: Vec::new(),
            layer_group_visibility: None,
        }
    }

    pub fn with_external_base_layers(mut self, layers: Vec<ExternalBaseLayer>) -> Self {
        self.external_base_layers = layers;
        self
    }
}

/// Notifications for the host application.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    ZoomToViewRequested(ViewTarget),
    SelectionChanged(Box<QueryMapFeaturesResponse>),
    MouseCoordinateChanged(Coord<f64>),
    BusyChanged(usize),
}
