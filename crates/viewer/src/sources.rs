//! Layer sources derived from a runtime map.

use std::collections::BTreeMap;

use commands::ExternalBaseLayer;
use contracts::runtime_map::RuntimeMap;
use foundation::ScaleConverter;
use strum::EnumString;

use crate::error::ViewerError;

const X_TOKEN: &str = "{x}";
const Y_TOKEN: &str = "{y}";
const Z_TOKEN: &str = "{z}";

/// Image format of the selection overlay. The overlay is always rendered as
/// full PNG regardless of the map image format.
pub const SELECTION_OVERLAY_FORMAT: &str = "PNG";
/// Render the map layers only.
pub const BEHAVIOR_LAYERS: u32 = 2;
/// Selected features, including those outside the current scale range.
pub const BEHAVIOR_SELECTION: u32 = 1 | 4;

/// Server tile URL with placeholders for the tile coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct TileUrlTemplate {
    template: String,
    z_origin: i64,
}

impl TileUrlTemplate {
    pub fn new(template: String, z_origin: i64) -> Self {
        Self { template, z_origin }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// URL of the tile at grid coordinate `(z, x, y)`.
    ///
    /// The server counts scale indices from the other end of the resolution
    /// list and rows downward from the grid origin.
    pub fn url(&self, z: i64, x: i64, y: i64) -> String {
        self.template
            .replace(Z_TOKEN, &(self.z_origin - z).to_string())
            .replace(X_TOKEN, &x.to_string())
            .replace(Y_TOKEN, &(-y - 1).to_string())
    }
}

pub fn tile_url_template(
    agent: &dyn client::MapAgent,
    map: &RuntimeMap,
    group_name: &str,
    z_origin: i64,
) -> TileUrlTemplate {
    let template = agent.tile_template_url(
        map.tile_resource_id(),
        group_name,
        X_TOKEN,
        Y_TOKEN,
        Z_TOKEN,
    );
    TileUrlTemplate::new(template, z_origin)
}

/// Tile grid resolutions, largest first.
pub fn resolutions(map: &RuntimeMap, scales: &ScaleConverter) -> Vec<f64> {
    map.finite_display_scale
        .iter()
        .rev()
        .map(|s| scales.to_resolution(*s))
        .collect()
}

/// Resolution reached by zooming `delta` steps from `current`.
///
/// With a resolution list the result snaps to the nearest allowed
/// resolution and is clamped to the list. Without one each step halves or
/// doubles the resolution.
pub fn constrain_resolution(resolutions: &[f64], current: f64, delta: f64) -> f64 {
    if resolutions.is_empty() {
        return current / 2f64.powf(delta);
    }
    let nearest = resolutions
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - current).abs().total_cmp(&(*b - current).abs()))
        .map(|(i, _)| i as i64)
        .unwrap_or(0);
    let last = resolutions.len() as i64 - 1;
    let index = (nearest + delta.round() as i64).clamp(0, last);
    resolutions[index as usize]
}

pub fn projection(map: &RuntimeMap) -> Option<String> {
    let code = map.epsg_code();
    (!code.is_empty()).then(|| format!("EPSG:{code}"))
}

pub fn dynamic_overlay_params(map: &RuntimeMap, image_format: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("MAPNAME".to_string(), map.name.clone()),
        ("FORMAT".to_string(), image_format.to_string()),
        ("SESSION".to_string(), map.session_id.clone()),
        ("BEHAVIOR".to_string(), BEHAVIOR_LAYERS.to_string()),
    ])
}

pub fn selection_overlay_params(
    map: &RuntimeMap,
    selection_color: &str,
) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("MAPNAME".to_string(), map.name.clone()),
        ("FORMAT".to_string(), SELECTION_OVERLAY_FORMAT.to_string()),
        ("SESSION".to_string(), map.session_id.clone()),
        ("SELECTIONCOLOR".to_string(), selection_color.to_string()),
        ("BEHAVIOR".to_string(), BEHAVIOR_SELECTION.to_string()),
    ])
}

/// Tile providers an external base layer may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, strum::Display)]
pub enum ExternalSourceKind {
    #[strum(serialize = "OSM")]
    Osm,
    Stamen,
    #[strum(serialize = "XYZ")]
    Xyz,
    BingMaps,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExternalSource {
    pub kind: ExternalSourceKind,
    pub options: BTreeMap<String, String>,
}

impl ExternalSource {
    pub fn from_layer(layer: &ExternalBaseLayer) -> Result<Self, ViewerError> {
        let kind = layer
            .kind
            .parse()
            .map_err(|_| ViewerError::UnknownExternalBaseLayer(layer.kind.clone()))?;
        Ok(Self {
            kind,
            options: layer.options.clone(),
        })
    }
}
