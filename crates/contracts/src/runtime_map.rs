//! Runtime map session handle returned by `CREATERUNTIMEMAP`.

use foundation::bounds::Bounds;
use serde::{Deserialize, Serialize};

/// Group types that are rendered from server tile caches.
pub const GROUP_TYPE_BASE_MAP: i32 = 2;
pub const GROUP_TYPE_LINKED_TILE_SET: i32 = 3;

/// Tile size assumed when the server does not report one.
pub const DEFAULT_TILE_SIZE: u32 = 300;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RuntimeMap {
    pub name: String,
    pub map_definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_set_definition: Option<String>,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default = "default_dpi")]
    pub display_dpi: f64,
    pub coordinate_system: CoordinateSystem,
    pub extents: Envelope,
    #[serde(default)]
    pub group: Vec<MapGroup>,
    #[serde(default)]
    pub layer: Vec<MapLayer>,
    #[serde(default)]
    pub finite_display_scale: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_height: Option<u32>,
}

fn default_dpi() -> f64 {
    96.0
}

impl RuntimeMap {
    pub fn extent(&self) -> Bounds {
        self.extents.to_bounds()
    }

    /// Resource used for tile requests: the tile set when present, otherwise
    /// the map definition.
    pub fn tile_resource_id(&self) -> &str {
        self.tile_set_definition
            .as_deref()
            .unwrap_or(&self.map_definition)
    }

    pub fn tile_size(&self) -> (u32, u32) {
        (
            self.tile_width.unwrap_or(DEFAULT_TILE_SIZE),
            self.tile_height.unwrap_or(DEFAULT_TILE_SIZE),
        )
    }

    pub fn tiled_groups(&self) -> impl Iterator<Item = &MapGroup> {
        self.group.iter().filter(|g| g.is_tiled())
    }

    pub fn epsg_code(&self) -> &str {
        &self.coordinate_system.epsg_code
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CoordinateSystem {
    #[serde(default)]
    pub wkt: String,
    #[serde(default)]
    pub mentor_code: String,
    pub epsg_code: String,
    pub meters_per_unit: f64,
}

impl CoordinateSystem {
    /// EPSG code "0" (or empty) means the server could not map the
    /// coordinate system to an EPSG code.
    pub fn is_supported(&self) -> bool {
        let code = self.epsg_code.trim();
        !code.is_empty() && code != "0"
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Envelope {
    pub lower_left_coordinate: Coordinate,
    pub upper_right_coordinate: Coordinate,
}

impl Envelope {
    pub fn to_bounds(&self) -> Bounds {
        Bounds::new(
            self.lower_left_coordinate.x,
            self.lower_left_coordinate.y,
            self.upper_right_coordinate.x,
            self.upper_right_coordinate.y,
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MapGroup {
    pub name: String,
    #[serde(rename = "Type")]
    pub group_type: i32,
    #[serde(default)]
    pub legend_label: String,
    #[serde(default)]
    pub object_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub display_in_legend: bool,
    #[serde(default)]
    pub expand_in_legend: bool,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub actually_visible: bool,
}

impl MapGroup {
    pub fn is_tiled(&self) -> bool {
        self.group_type == GROUP_TYPE_BASE_MAP || self.group_type == GROUP_TYPE_LINKED_TILE_SET
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MapLayer {
    pub name: String,
    #[serde(rename = "Type", default)]
    pub layer_type: i32,
    #[serde(default)]
    pub legend_label: String,
    #[serde(default)]
    pub object_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub selectable: bool,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub actually_visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_definition: Option<String>,
}

/// Sample documents for tests in this and dependent crates.
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures {
    use super::RuntimeMap;

    pub fn runtime_map_json(name: &str, map_def: &str, epsg: &str) -> serde_json::Value {
        serde_json::json!({
            "Name": name,
            "MapDefinition": map_def,
            "SessionId": "abc123",
            "DisplayDpi": 96,
            "CoordinateSystem": {
                "Wkt": "",
                "MentorCode": "",
                "EpsgCode": epsg,
                "MetersPerUnit": 1.0
            },
            "Extents": {
                "LowerLeftCoordinate": { "X": -10.0, "Y": -5.0 },
                "UpperRightCoordinate": { "X": 10.0, "Y": 5.0 }
            },
            "Group": [
                { "Name": "Base", "Type": 2 },
                { "Name": "Dynamic", "Type": 1 },
                { "Name": "Linked", "Type": 3 }
            ],
            "FiniteDisplayScale": [1000.0, 5000.0, 25000.0]
        })
    }

    pub fn runtime_map(name: &str, map_def: &str, epsg: &str) -> RuntimeMap {
        serde_json::from_value(runtime_map_json(name, map_def, epsg)).expect("fixture runtime map")
    }
}
