//! WebLayout resource document (flat command set + toolbar/menu references).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WebLayout {
    #[serde(default)]
    pub title: String,
    pub map: WebLayoutMap,
    #[serde(default)]
    pub selection_color: Option<String>,
    #[serde(default)]
    pub point_selection_buffer: Option<u32>,
    #[serde(default)]
    pub map_image_format: Option<String>,
    #[serde(default)]
    pub selection_image_format: Option<String>,
    pub tool_bar: ToolBar,
    pub information_pane: InformationPane,
    pub context_menu: ContextMenu,
    pub task_pane: TaskPane,
    pub status_bar: Visibility,
    pub zoom_control: Visibility,
    pub command_set: CommandSet,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WebLayoutMap {
    pub resource_id: String,
    #[serde(default)]
    pub initial_view: Option<InitialView>,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InitialView {
    pub center_x: f64,
    pub center_y: f64,
    pub scale: f64,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Visibility {
    pub visible: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ToolBar {
    pub visible: bool,
    #[serde(default)]
    pub button: Vec<UiItem>,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InformationPane {
    pub visible: bool,
    #[serde(default)]
    pub legend_visible: bool,
    #[serde(default)]
    pub properties_visible: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContextMenu {
    pub visible: bool,
    #[serde(default)]
    pub menu_item: Vec<UiItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskPane {
    pub visible: bool,
    #[serde(default)]
    pub initial_task: Option<String>,
    pub task_bar: TaskBar,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskBar {
    pub visible: bool,
    #[serde(default)]
    pub menu_button: Vec<UiItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CommandSet {
    #[serde(default)]
    pub command: Vec<CommandDef>,
}

/// A toolbar or menu entry referencing the command set.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "Function")]
pub enum UiItem {
    Command {
        #[serde(rename = "Command")]
        command: String,
    },
    Separator,
    Flyout {
        #[serde(rename = "Label", default)]
        label: Option<String>,
        #[serde(rename = "Tooltip", default)]
        tooltip: Option<String>,
        #[serde(rename = "SubItem", default)]
        sub_item: Vec<UiItem>,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TargetViewer {
    All,
    Ajax,
    Dwf,
}

impl TargetViewer {
    fn parse(s: Option<&str>) -> Self {
        match s {
            Some("Dwf") => TargetViewer::Dwf,
            Some("Ajax") => TargetViewer::Ajax,
            _ => TargetViewer::All,
        }
    }
}

/// Where an invoked URL is shown.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandTarget {
    TaskPane,
    NewWindow,
    SpecifiedFrame,
}

impl CommandTarget {
    /// Unknown or missing targets fall back to the task pane.
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("NewWindow") => CommandTarget::NewWindow,
            Some("SpecifiedFrame") => CommandTarget::SpecifiedFrame,
            _ => CommandTarget::TaskPane,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlParameter {
    #[serde(rename = "Key")]
    pub name: String,
    #[serde(rename = "Value", default)]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultColumn {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Property")]
    pub property: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeUrlCommand {
    pub url: String,
    pub target: CommandTarget,
    pub disable_if_selection_empty: bool,
    pub parameters: Vec<UrlParameter>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCommand {
    pub title: String,
    pub layer: String,
    pub prompt: String,
    pub result_columns: Vec<ResultColumn>,
    pub filter: Option<String>,
    pub match_limit: u32,
    pub icon: Option<String>,
}

/// Command behaviour, discriminated by `@xsi:type` or by which fields are
/// present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    Basic { action: String },
    InvokeUrl(InvokeUrlCommand),
    Search(SearchCommand),
    ViewOptions,
    Measure,
    Help,
    Buffer,
    SelectWithin,
    GetPrintablePage,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawCommandDef")]
pub struct CommandDef {
    pub name: String,
    pub label: Option<String>,
    pub tooltip: Option<String>,
    pub target_viewer: TargetViewer,
    pub kind: CommandKind,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawCommandDef {
    #[serde(rename = "@xsi:type", default)]
    xsi_type: Option<String>,
    name: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    tooltip: Option<String>,
    #[serde(rename = "ImageURL", default)]
    image_url: Option<String>,
    #[serde(default)]
    target_viewer: Option<String>,
    #[serde(default)]
    action: Option<String>,
    #[serde(rename = "URL", default)]
    url: Option<String>,
    #[serde(default)]
    disable_if_selection_empty: Option<bool>,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    additional_parameter: Vec<UrlParameter>,
    #[serde(default)]
    layer: Option<String>,
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    result_columns: Option<ResultColumnSet>,
    #[serde(default)]
    filter: Option<String>,
    #[serde(default)]
    match_limit: Option<u32>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
struct ResultColumnSet {
    #[serde(default)]
    column: Vec<ResultColumn>,
}

impl From<RawCommandDef> for CommandDef {
    fn from(raw: RawCommandDef) -> Self {
        let xsi = raw.xsi_type.as_deref().unwrap_or_default();
        let kind = match xsi {
            "BasicCommandType" => CommandKind::Basic {
                action: raw.action.clone().unwrap_or_default(),
            },
            "InvokeURLCommandType" => invoke_url(&raw),
            "SearchCommandType" => search(&raw),
            "ViewOptionsCommandType" => CommandKind::ViewOptions,
            "MeasureCommandType" => CommandKind::Measure,
            "HelpCommandType" => CommandKind::Help,
            "BufferCommandType" => CommandKind::Buffer,
            "SelectWithinCommandType" => CommandKind::SelectWithin,
            "GetPrintablePageCommandType" => CommandKind::GetPrintablePage,
            "" if raw.action.is_some() => CommandKind::Basic {
                action: raw.action.clone().unwrap_or_default(),
            },
            "" if raw.url.is_some() => invoke_url(&raw),
            "" if raw.layer.is_some() && raw.prompt.is_some() => search(&raw),
            other => CommandKind::Other(other.to_string()),
        };
        CommandDef {
            target_viewer: TargetViewer::parse(raw.target_viewer.as_deref()),
            name: raw.name,
            label: raw.label,
            tooltip: raw.tooltip,
            kind,
        }
    }
}

fn invoke_url(raw: &RawCommandDef) -> CommandKind {
    CommandKind::InvokeUrl(InvokeUrlCommand {
        url: raw.url.clone().unwrap_or_default(),
        target: CommandTarget::parse(raw.target.as_deref()),
        disable_if_selection_empty: raw.disable_if_selection_empty.unwrap_or(false),
        parameters: raw.additional_parameter.clone(),
        icon: raw.image_url.clone(),
    })
}

fn search(raw: &RawCommandDef) -> CommandKind {
    CommandKind::Search(SearchCommand {
        title: raw.label.clone().unwrap_or_default(),
        layer: raw.layer.clone().unwrap_or_default(),
        prompt: raw.prompt.clone().unwrap_or_default(),
        result_columns: raw
            .result_columns
            .as_ref()
            .map(|c| c.column.clone())
            .unwrap_or_default(),
        filter: raw.filter.clone().filter(|f| !f.is_empty()),
        match_limit: raw.match_limit.unwrap_or(100),
        icon: raw.image_url.clone(),
    })
}

/// Sample documents for tests in this and dependent crates.
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures {
    pub fn web_layout_json() -> serde_json::Value {
        serde_json::json!({
            "Title": "Sheboygan",
            "Map": {
                "ResourceId": "Library://Samples/Sheboygan/Maps/Sheboygan.MapDefinition",
                "InitialView": { "CenterX": -87.7, "CenterY": 43.7, "Scale": 8000.0 }
            },
            "SelectionColor": "0xFF0000FF",
            "PointSelectionBuffer": 3,
            "ToolBar": {
                "Visible": true,
                "Button": [
                    { "Function": "Command", "Command": "Pan" },
                    { "Function": "Command", "Command": "Zoom Rectangle" },
                    { "Function": "Separator" },
                    { "Function": "Command", "Command": "Missing" },
                    { "Function": "Flyout", "Label": "Tools", "Tooltip": "More tools", "SubItem": [
                        { "Function": "Command", "Command": "Measure" },
                        { "Function": "Command", "Command": "Parcel Report" }
                    ]}
                ]
            },
            "InformationPane": { "Visible": true, "LegendVisible": true, "PropertiesVisible": false },
            "ContextMenu": {
                "Visible": true,
                "MenuItem": [
                    { "Function": "Command", "Command": "Refresh Map" },
                    { "Function": "Flyout", "Label": "Zoom", "SubItem": [
                        { "Function": "Command", "Command": "Zoom Extents" }
                    ]}
                ]
            },
            "TaskPane": {
                "Visible": true,
                "InitialTask": null,
                "TaskBar": {
                    "Visible": true,
                    "MenuButton": [
                        { "Function": "Command", "Command": "Find Address" },
                        { "Function": "Command", "Command": "DWF Only" }
                    ]
                }
            },
            "StatusBar": { "Visible": true },
            "ZoomControl": { "Visible": false },
            "CommandSet": {
                "Command": [
                    { "@xsi:type": "BasicCommandType", "Name": "Pan", "Label": "Pan", "Tooltip": "Pan the map", "TargetViewer": "All", "Action": "Pan" },
                    { "@xsi:type": "BasicCommandType", "Name": "Zoom Rectangle", "Label": "Zoom", "TargetViewer": "All", "Action": "ZoomRectangle" },
                    { "@xsi:type": "BasicCommandType", "Name": "Zoom Extents", "Label": "Zoom Extents", "TargetViewer": "All", "Action": "FitToWindow" },
                    { "@xsi:type": "BasicCommandType", "Name": "Refresh Map", "Label": "Refresh", "TargetViewer": "All", "Action": "Refresh" },
                    { "@xsi:type": "MeasureCommandType", "Name": "Measure", "Label": "Measure", "Tooltip": "Measure distances", "TargetViewer": "All" },
                    { "@xsi:type": "InvokeURLCommandType", "Name": "Parcel Report", "Label": "Report", "TargetViewer": "All",
                      "URL": "http://server/report.php", "DisableIfSelectionEmpty": true, "Target": "TaskPane",
                      "AdditionalParameter": [{ "Key": "FORMAT", "Value": "pdf" }] },
                    { "@xsi:type": "InvokeURLCommandType", "Name": "Framed", "TargetViewer": "All",
                      "URL": "http://server/frame.php", "DisableIfSelectionEmpty": false, "Target": "SpecifiedFrame" },
                    { "@xsi:type": "SearchCommandType", "Name": "Find Address", "Label": "Find Address", "TargetViewer": "All",
                      "Layer": "Parcels", "Prompt": "Enter owner name", "Filter": "RNAME LIKE '%$USER_VARIABLE%'",
                      "MatchLimit": 50, "ResultColumns": { "Column": [
                          { "Name": "Owner", "Property": "RNAME" },
                          { "Name": "Address", "Property": "RPROPAD" }
                      ]} },
                    { "@xsi:type": "BasicCommandType", "Name": "DWF Only", "TargetViewer": "Dwf", "Action": "Print" }
                ]
            }
        })
    }
}
