//! Flexible layout `ApplicationDefinition` document.
//!
//! Widget and map extensions are free-form server elements, so they are kept
//! as JSON values and read through [`extension_str`], which tolerates the
//! single-element arrays some servers emit for repeated elements.

use serde::Deserialize;
use serde_json::Value;

use crate::weblayout::InitialView;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApplicationDefinition {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub map_set: Option<MapSet>,
    #[serde(default)]
    pub widget_set: Vec<WidgetSet>,
}

impl ApplicationDefinition {
    /// All map configurations served by the MapGuide provider, in document
    /// order, paired with the id of their map group.
    pub fn mapguide_maps(&self) -> impl Iterator<Item = (&MapGroup, &MapConfiguration)> {
        self.map_set
            .iter()
            .flat_map(|set| set.map_group.iter())
            .flat_map(|group| group.map.iter().map(move |m| (group, m)))
            .filter(|(_, m)| m.provider() == MapProvider::MapGuide)
    }

    pub fn widgets(&self) -> impl Iterator<Item = &Widget> {
        self.widget_set.iter().flat_map(|s| s.widget.iter())
    }

    pub fn containers(&self) -> impl Iterator<Item = &Container> {
        self.widget_set.iter().flat_map(|s| s.container.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MapSet {
    #[serde(default)]
    pub map_group: Vec<MapGroup>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MapGroup {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(default)]
    pub initial_view: Option<InitialView>,
    #[serde(default)]
    pub map: Vec<MapConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapProvider {
    MapGuide,
    OpenStreetMap,
    Stamen,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MapConfiguration {
    #[serde(rename = "Type")]
    pub map_type: String,
    #[serde(default)]
    pub extension: Value,
}

impl MapConfiguration {
    pub fn provider(&self) -> MapProvider {
        match self.map_type.as_str() {
            "MapGuide" => MapProvider::MapGuide,
            "OpenStreetMap" => MapProvider::OpenStreetMap,
            "Stamen" => MapProvider::Stamen,
            other => MapProvider::Other(other.to_string()),
        }
    }

    pub fn resource_id(&self) -> Option<String> {
        extension_str(&self.extension, "ResourceId")
    }

    pub fn selection_color(&self) -> Option<String> {
        extension_str(&self.extension, "SelectionColor")
    }

    pub fn image_format(&self) -> Option<String> {
        extension_str(&self.extension, "ImageFormat")
    }

    pub fn selection_format(&self) -> Option<String> {
        extension_str(&self.extension, "SelectionFormat")
    }

    /// `Options.name` of an external provider map.
    pub fn option_name(&self) -> Option<String> {
        self.extension
            .get("Options")
            .and_then(|o| extension_str(o, "name"))
    }

    /// `Options.type` of an external provider map.
    pub fn option_type(&self) -> Option<String> {
        self.extension
            .get("Options")
            .and_then(|o| extension_str(o, "type"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WidgetSet {
    #[serde(default)]
    pub container: Vec<Container>,
    #[serde(default)]
    pub widget: Vec<Widget>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Container {
    pub name: String,
    #[serde(default)]
    pub item: Vec<ContainerItem>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "Function")]
pub enum ContainerItem {
    Widget {
        #[serde(rename = "Widget")]
        widget: String,
    },
    Separator,
    Flyout {
        #[serde(rename = "Label", default)]
        label: Option<String>,
        #[serde(rename = "Tooltip", default)]
        tooltip: Option<String>,
        #[serde(rename = "Item", default)]
        item: Vec<ContainerItem>,
    },
}

pub const UI_WIDGET_TYPE: &str = "UiWidgetType";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Widget {
    #[serde(rename = "@xsi:type", alias = "WidgetType", default)]
    pub widget_type: Option<String>,
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub tooltip: Option<String>,
    #[serde(default)]
    pub extension: Value,
}

impl Widget {
    pub fn is_ui_widget(&self) -> bool {
        self.widget_type.as_deref() == Some(UI_WIDGET_TYPE)
    }

    pub fn ext(&self, key: &str) -> Option<String> {
        extension_str(&self.extension, key)
    }

    pub fn ext_bool(&self, key: &str) -> bool {
        self.ext(key)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// `[{Key, Value}]` pairs under `key`.
    pub fn ext_pairs(&self, key: &str) -> Vec<(String, String)> {
        let items = match self.extension.get(key) {
            Some(Value::Array(items)) => items.iter().collect::<Vec<_>>(),
            Some(v @ Value::Object(_)) => vec![v],
            _ => Vec::new(),
        };
        items
            .into_iter()
            .filter_map(|p| {
                let k = extension_str(p, "Key")?;
                Some((k, extension_str(p, "Value").unwrap_or_default()))
            })
            .collect()
    }
}

/// Reads a scalar extension element as a string.
///
/// Strings, numbers and booleans are accepted; an array yields its first
/// element.
pub fn extension_str(ext: &Value, key: &str) -> Option<String> {
    scalar(ext.get(key)?)
}

fn scalar(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => items.first().and_then(scalar),
        Value::Null | Value::Object(_) => None,
    }
}

/// Sample documents for tests in this and dependent crates.
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures {
    pub fn app_def_json() -> serde_json::Value {
        serde_json::json!({
            "Title": "Fusion Sheboygan",
            "MapSet": {
                "MapGroup": [
                    {
                        "@id": "Sheboygan",
                        "InitialView": { "CenterX": -87.7, "CenterY": 43.7, "Scale": 5000.0 },
                        "Map": [
                            { "Type": "MapGuide", "Extension": {
                                "ResourceId": "Library://Samples/Sheboygan.MapDefinition",
                                "SelectionColor": "0xFF000080",
                                "ImageFormat": "PNG8"
                            }},
                            { "Type": "OpenStreetMap", "Extension": { "Options": { "name": ["Cycle"], "type": ["CycleMap"] } } },
                            { "Type": "Stamen", "Extension": { "Options": { "name": ["Toner"], "type": ["toner"] } } }
                        ]
                    },
                    {
                        "@id": "SheboyganAgain",
                        "Map": [
                            { "Type": "MapGuide", "Extension": {
                                "ResourceId": "Library://Samples/Sheboygan.MapDefinition",
                                "SelectionColor": "0x00FF0080",
                                "SelectionFormat": "GIF"
                            }}
                        ]
                    }
                ]
            },
            "WidgetSet": [{
                "Container": [
                    { "Name": "Toolbar", "Item": [
                        { "Function": "Widget", "Widget": "Pan" },
                        { "Function": "Widget", "Widget": "ZoomIn" },
                        { "Function": "Widget", "Widget": "ZoomOut" },
                        { "Function": "Separator" },
                        { "Function": "Widget", "Widget": "Previous" },
                        { "Function": "Widget", "Widget": "Mystery" },
                        { "Function": "Widget", "Widget": "MapSwitcher" },
                        { "Function": "Flyout", "Label": "More", "Item": [
                            { "Function": "Widget", "Widget": "Report" },
                            { "Function": "Widget", "Widget": "Find" }
                        ]}
                    ]},
                    { "Name": "MapContextMenu", "Item": [
                        { "Function": "Widget", "Widget": "Pan" },
                        { "Function": "Flyout", "Label": "Zoom", "Item": [
                            { "Function": "Widget", "Widget": "ZoomIn" }
                        ]}
                    ]},
                    { "Name": "TaskMenu", "Item": [
                        { "Function": "Widget", "Widget": "Find" }
                    ]}
                ],
                "Widget": [
                    { "WidgetType": "UiWidgetType", "Name": "Pan", "Type": "Pan", "Label": "Pan", "Tooltip": "Drag to pan" },
                    { "WidgetType": "UiWidgetType", "Name": "ZoomIn", "Type": "ZoomOnClick", "Label": "In", "Extension": { "Factor": "2" } },
                    { "WidgetType": "UiWidgetType", "Name": "ZoomOut", "Type": "ZoomOnClick", "Label": "Out", "Extension": { "Factor": "0.5" } },
                    { "WidgetType": "UiWidgetType", "Name": "Previous", "Type": "ExtentHistory", "Extension": { "Direction": "previous" } },
                    { "WidgetType": "UiWidgetType", "Name": "Mystery", "Type": "Teleport" },
                    { "WidgetType": "UiWidgetType", "Name": "MapSwitcher", "Type": "MapMenu", "Label": "Maps" },
                    { "WidgetType": "UiWidgetType", "Name": "Report", "Type": "InvokeURL", "Label": "Report", "Extension": {
                        "Url": "http://server/report.php", "Target": "TaskPane", "DisableIfSelectionEmpty": "true",
                        "AdditionalParameter": [{ "Key": "FORMAT", "Value": "pdf" }]
                    }},
                    { "WidgetType": "UiWidgetType", "Name": "Find", "Type": "Search", "Label": "Find", "Extension": {
                        "Title": "Find parcels", "Layer": "Parcels", "Prompt": "Owner", "MatchLimit": "25",
                        "ResultColumns": { "Column": [{ "Name": "Owner", "Property": "RNAME" }] }
                    }},
                    { "Name": "TaskPane", "Type": "TaskPane", "Extension": { "InitialTask": "http://server/welcome.html" } },
                    { "Name": "Legend", "Type": "Legend" },
                    { "Name": "CursorPosition", "Type": "CursorPosition" }
                ]
            }]
        })
    }
}
