//! Flexible layout (ApplicationDefinition) normalization.

use std::collections::{BTreeMap, HashMap};

use commands::{
    Capabilities, CommandRegistry, DefaultCommand, DefaultComponent, InitAppPayload, InitOptions,
    MapContext, ToolbarItem, ViewerConfigOverrides, ensure_parameters,
};
use contracts::fusion::{ApplicationDefinition, ContainerItem, Widget};
use contracts::runtime_map::RuntimeMap;
use foundation::unique_name;
use i18n::StringBundles;
use strum::EnumString;

use crate::DEFAULT_INITIAL_TASK;
use crate::maps::setup_maps;
use crate::register::{invoke_url_from_widget, register_invoke_url, register_search, search_from_widget};
use crate::submenu::{CONTEXT_MENU_TOOLBAR, TASK_PANE_TOOLBAR, prepare_sub_menus};

/// Widget types understood by the viewer.
#[derive(Debug, Clone, PartialEq, Eq, EnumString)]
pub enum WidgetKind {
    Select,
    Pan,
    Zoom,
    ZoomOnClick,
    InitialMapView,
    ZoomToSelection,
    ExtentHistory,
    About,
    BufferPanel,
    ClearSelection,
    FeatureInfo,
    Geolocation,
    Help,
    Maptip,
    MapMenu,
    Query,
    QuickPlot,
    Redline,
    RefreshMap,
    #[strum(serialize = "InvokeURL")]
    InvokeUrl,
    Search,
    SelectPolygon,
    SelectRadius,
    SelectWithin,
    Theme,
    ViewOptions,
    Measure,
    BasemapSwitcher,
    TaskPane,
    Legend,
    SelectionPanel,
    CursorPosition,
    SelectionInfo,
    Navigator,
    #[strum(default)]
    Unknown(String),
}

impl WidgetKind {
    pub fn of(widget: &Widget) -> Self {
        widget
            .kind
            .parse()
            .unwrap_or_else(|_| WidgetKind::Unknown(widget.kind.clone()))
    }
}

enum Mapped {
    Command(String),
    Component(DefaultComponent),
    Unsupported,
}

fn map_widget(widget: &Widget) -> Mapped {
    use DefaultCommand as C;
    let cmd = |c: DefaultCommand| Mapped::Command(c.name().to_string());
    match WidgetKind::of(widget) {
        WidgetKind::Select => cmd(C::Select),
        WidgetKind::Pan => cmd(C::Pan),
        WidgetKind::Zoom => cmd(C::Zoom),
        WidgetKind::ZoomOnClick => {
            let factor: f64 = widget
                .ext("Factor")
                .and_then(|f| f.trim().parse().ok())
                .unwrap_or(f64::NAN);
            if factor >= 1.0 {
                cmd(C::ZoomIn)
            } else {
                cmd(C::ZoomOut)
            }
        }
        WidgetKind::InitialMapView => cmd(C::ZoomExtents),
        WidgetKind::ZoomToSelection => cmd(C::ZoomToSelection),
        WidgetKind::ExtentHistory => {
            if widget.ext("Direction").as_deref() == Some("previous") {
                cmd(C::PreviousView)
            } else {
                cmd(C::NextView)
            }
        }
        WidgetKind::About => cmd(C::About),
        WidgetKind::BufferPanel => cmd(C::Buffer),
        WidgetKind::ClearSelection => cmd(C::ClearSelection),
        WidgetKind::FeatureInfo => cmd(C::FeatureInfo),
        WidgetKind::Geolocation => cmd(C::Geolocation),
        WidgetKind::Help => cmd(C::Help),
        WidgetKind::Maptip => cmd(C::MapTip),
        WidgetKind::MapMenu => Mapped::Component(DefaultComponent::MapMenu),
        WidgetKind::Query => cmd(C::Query),
        WidgetKind::QuickPlot => cmd(C::QuickPlot),
        WidgetKind::Redline => cmd(C::Redline),
        WidgetKind::RefreshMap => cmd(C::RefreshMap),
        WidgetKind::InvokeUrl | WidgetKind::Search => Mapped::Command(widget.name.clone()),
        WidgetKind::SelectPolygon => cmd(C::SelectPolygon),
        WidgetKind::SelectRadius => cmd(C::SelectRadius),
        WidgetKind::SelectWithin => cmd(C::SelectWithin),
        WidgetKind::Theme => cmd(C::Theme),
        WidgetKind::ViewOptions => cmd(C::ViewerOptions),
        WidgetKind::Measure => cmd(C::Measure),
        WidgetKind::BasemapSwitcher => Mapped::Component(DefaultComponent::BaseMapSwitcher),
        WidgetKind::TaskPane
        | WidgetKind::Legend
        | WidgetKind::SelectionPanel
        | WidgetKind::CursorPosition
        | WidgetKind::SelectionInfo
        | WidgetKind::Navigator
        | WidgetKind::Unknown(_) => Mapped::Unsupported,
    }
}

pub type WidgetTable<'a> = HashMap<&'a str, &'a Widget>;

pub fn widget_table(app_def: &ApplicationDefinition) -> WidgetTable<'_> {
    app_def.widgets().map(|w| (w.name.as_str(), w)).collect()
}

/// Converts container items into toolbar items.
///
/// References to unknown widget names or to non-UI widgets yield nothing.
/// Unsupported widget types become error items.
pub fn convert_flex_layout_ui_items(
    items: &[ContainerItem],
    widgets: &WidgetTable<'_>,
    strings: &StringBundles,
    locale: &str,
    no_toolbar_labels: bool,
) -> Vec<ToolbarItem> {
    items
        .iter()
        .filter_map(|item| match item {
            ContainerItem::Widget { widget } => {
                let widget = widgets.get(widget.as_str()).filter(|w| w.is_ui_widget())?;
                let label = if no_toolbar_labels {
                    None
                } else {
                    widget.label.clone()
                };
                let tooltip = widget.tooltip.clone();
                Some(match map_widget(widget) {
                    Mapped::Command(command) => ToolbarItem::Command {
                        command,
                        label,
                        tooltip,
                    },
                    Mapped::Component(component) => ToolbarItem::Component {
                        label,
                        tooltip,
                        component: component.name().to_string(),
                        flyout_id: unique_name(component.name()),
                    },
                    Mapped::Unsupported => ToolbarItem::Error {
                        message: strings.tr("UNKNOWN_WIDGET", locale, &[("widget", widget.kind.as_str())]),
                    },
                })
            }
            ContainerItem::Separator => Some(ToolbarItem::Separator),
            ContainerItem::Flyout {
                label,
                tooltip,
                item,
            } => Some(ToolbarItem::Flyout {
                label: label.clone(),
                tooltip: tooltip.clone(),
                children: convert_flex_layout_ui_items(item, widgets, strings, locale, false),
            }),
        })
        .collect()
}

/// Capabilities implied by the widgets present, plus the task pane's
/// initial task when one is declared.
pub fn flex_capabilities(app_def: &ApplicationDefinition) -> (Capabilities, Option<String>) {
    let mut caps = Capabilities::default();
    let mut initial_task = None;
    for widget in app_def.widgets() {
        match WidgetKind::of(widget) {
            WidgetKind::TaskPane => {
                caps.has_task_pane = true;
                caps.has_task_bar = true;
                initial_task = widget.ext("InitialTask").filter(|t| !t.is_empty());
            }
            WidgetKind::Legend => caps.has_legend = true,
            WidgetKind::SelectionPanel => caps.has_selection_panel = true,
            WidgetKind::CursorPosition | WidgetKind::SelectionInfo => caps.has_status_bar = true,
            WidgetKind::Navigator => caps.has_navigator = true,
            _ => {}
        }
    }
    caps.has_toolbar = app_def.containers().next().is_some();
    (caps, initial_task)
}

pub fn register_flex_commands(
    app_def: &ApplicationDefinition,
    registry: &mut CommandRegistry,
    strings: &StringBundles,
    locale: &str,
) {
    for widget in app_def.widgets() {
        match WidgetKind::of(widget) {
            WidgetKind::InvokeUrl => {
                register_invoke_url(
                    registry,
                    &widget.name,
                    &invoke_url_from_widget(widget),
                    strings,
                    locale,
                );
            }
            WidgetKind::Search => register_search(registry, &widget.name, &search_from_widget(widget)),
            _ => {}
        }
    }
}

/// Host toolbar name for a container.
fn toolbar_name(container: &str) -> &str {
    match container {
        "MapContextMenu" => CONTEXT_MENU_TOOLBAR,
        "TaskMenu" => TASK_PANE_TOOLBAR,
        other => other,
    }
}

pub fn flex_toolbars(
    app_def: &ApplicationDefinition,
    strings: &StringBundles,
    locale: &str,
) -> BTreeMap<String, Vec<ToolbarItem>> {
    let widgets = widget_table(app_def);
    app_def
        .containers()
        .map(|c| {
            (
                toolbar_name(&c.name).to_string(),
                convert_flex_layout_ui_items(&c.item, &widgets, strings, locale, false),
            )
        })
        .collect()
}

/// Builds the INIT_APP payload for an ApplicationDefinition. The first
/// runtime map created is the active one.
pub fn normalize_flex_layout(
    app_def: &ApplicationDefinition,
    runtime_maps: &[RuntimeMap],
    options: &InitOptions,
    registry: &mut CommandRegistry,
    strings: &StringBundles,
) -> InitAppPayload {
    let locale = options.locale.as_str();
    register_flex_commands(app_def, registry, strings, locale);
    let toolbars = flex_toolbars(app_def, strings, locale);
    let (capabilities, initial_task) = flex_capabilities(app_def);

    let mut config = ViewerConfigOverrides::default();
    let maps = setup_maps(app_def, runtime_maps, &mut config);

    let first = runtime_maps.first();
    let map_name = first.map(|m| m.name.clone()).unwrap_or_default();
    let session = first.map(|m| m.session_id.clone()).unwrap_or_default();
    let initial_task = initial_task.as_deref().unwrap_or(DEFAULT_INITIAL_TASK);

    InitAppPayload {
        initial_url: ensure_parameters(
            initial_task,
            MapContext {
                map_name: &map_name,
                session: &session,
                locale,
            },
            true,
            &[],
        ),
        active_map_name: map_name,
        locale: locale.to_string(),
        maps,
        config,
        capabilities,
        toolbars: prepare_sub_menus(toolbars),
        title: app_def.title.clone().filter(|t| !t.is_empty()),
    }
}
