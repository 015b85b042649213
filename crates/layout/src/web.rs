//! WebLayout normalization.

use std::collections::{BTreeMap, HashMap};

use commands::{
    Capabilities, CommandRegistry, DefaultCommand, ExternalBaseLayer, InitAppPayload,
    InitOptions, MapContext, MapInfo, ToolbarItem, ViewerConfigOverrides, ensure_parameters,
};
use contracts::runtime_map::RuntimeMap;
use contracts::weblayout::{CommandDef, CommandKind, TargetViewer, UiItem, WebLayout};
use i18n::StringBundles;
use tracing::warn;

use crate::maps::to_map_view;
use crate::register::{register_invoke_url, register_search};
use crate::submenu::{CONTEXT_MENU_TOOLBAR, MAIN_TOOLBAR, TASK_PANE_TOOLBAR, prepare_sub_menus};
use crate::DEFAULT_INITIAL_TASK;

/// Command definitions by name. Later definitions shadow earlier ones.
pub type CommandTable<'a> = HashMap<&'a str, &'a CommandDef>;

pub fn command_table(layout: &WebLayout) -> CommandTable<'_> {
    layout
        .command_set
        .command
        .iter()
        .map(|c| (c.name.as_str(), c))
        .collect()
}

/// Registers the InvokeURL and Search commands of the command set.
pub fn register_web_layout_commands(
    layout: &WebLayout,
    registry: &mut CommandRegistry,
    strings: &StringBundles,
    locale: &str,
) {
    for cmd in &layout.command_set.command {
        match &cmd.kind {
            CommandKind::InvokeUrl(invoke) => {
                register_invoke_url(registry, &cmd.name, invoke, strings, locale);
            }
            CommandKind::Search(search) => {
                register_search(registry, &cmd.name, search);
            }
            _ => {}
        }
    }
}

/// Converts toolbar or menu references into toolbar items.
///
/// Unknown references become error items. Commands aimed only at the DWF
/// viewer yield nothing. Flyout children always carry labels.
pub fn convert_web_layout_ui_items(
    items: &[UiItem],
    commands: &CommandTable<'_>,
    strings: &StringBundles,
    locale: &str,
    no_toolbar_labels: bool,
) -> Vec<ToolbarItem> {
    items
        .iter()
        .filter_map(|item| match item {
            UiItem::Command { command } => {
                let Some(def) = commands.get(command.as_str()) else {
                    warn!("Invalid reference to command: {command}");
                    return Some(ToolbarItem::Error {
                        message: strings.tr(
                            "UNKNOWN_COMMAND_REFERENCE",
                            locale,
                            &[("command", command.as_str())],
                        ),
                    });
                };
                if def.target_viewer == TargetViewer::Dwf {
                    return None;
                }
                let label = if no_toolbar_labels {
                    None
                } else {
                    def.label.clone()
                };
                Some(ToolbarItem::command(
                    command_name(def),
                    label,
                    def.tooltip.clone(),
                ))
            }
            UiItem::Separator => Some(ToolbarItem::Separator),
            UiItem::Flyout {
                label,
                tooltip,
                sub_item,
            } => Some(ToolbarItem::Flyout {
                label: label.clone(),
                tooltip: tooltip.clone(),
                children: convert_web_layout_ui_items(sub_item, commands, strings, locale, false),
            }),
        })
        .collect()
}

/// Viewer command a definition maps to.
fn command_name(def: &CommandDef) -> String {
    let builtin = match &def.kind {
        CommandKind::Basic { action } => match action.as_str() {
            "ZoomRectangle" => DefaultCommand::Zoom,
            "FitToWindow" => DefaultCommand::ZoomExtents,
            "Refresh" => DefaultCommand::RefreshMap,
            other => return other.to_string(),
        },
        CommandKind::ViewOptions => DefaultCommand::ViewerOptions,
        CommandKind::Measure => DefaultCommand::Measure,
        CommandKind::Help => DefaultCommand::Help,
        CommandKind::Buffer => DefaultCommand::Buffer,
        CommandKind::SelectWithin => DefaultCommand::SelectWithin,
        CommandKind::GetPrintablePage => DefaultCommand::QuickPlot,
        CommandKind::InvokeUrl(_) | CommandKind::Search(_) | CommandKind::Other(_) => {
            return def.name.clone();
        }
    };
    builtin.name().to_string()
}

pub fn web_layout_capabilities(layout: &WebLayout) -> Capabilities {
    let info = &layout.information_pane;
    Capabilities {
        has_task_pane: layout.task_pane.visible,
        has_task_bar: layout.task_pane.task_bar.visible,
        has_status_bar: layout.status_bar.visible,
        has_navigator: layout.zoom_control.visible,
        has_selection_panel: info.visible && info.properties_visible,
        has_legend: info.visible && info.legend_visible,
        has_toolbar: layout.tool_bar.visible,
    }
}

pub fn web_layout_config(layout: &WebLayout) -> ViewerConfigOverrides {
    ViewerConfigOverrides {
        image_format: layout.map_image_format.clone(),
        selection_image_format: layout.selection_image_format.clone(),
        selection_color: layout.selection_color.clone(),
        point_selection_buffer: layout.point_selection_buffer,
    }
}

/// Main toolbar, task bar and context menu, each empty when hidden.
pub fn web_layout_toolbars(
    layout: &WebLayout,
    strings: &StringBundles,
    locale: &str,
) -> BTreeMap<String, Vec<ToolbarItem>> {
    let commands = command_table(layout);
    let section = |visible: bool, items: &[UiItem], no_labels: bool| {
        if visible {
            convert_web_layout_ui_items(items, &commands, strings, locale, no_labels)
        } else {
            Vec::new()
        }
    };
    BTreeMap::from([
        (
            MAIN_TOOLBAR.to_string(),
            section(layout.tool_bar.visible, &layout.tool_bar.button, true),
        ),
        (
            TASK_PANE_TOOLBAR.to_string(),
            section(
                layout.task_pane.task_bar.visible,
                &layout.task_pane.task_bar.menu_button,
                false,
            ),
        ),
        (
            CONTEXT_MENU_TOOLBAR.to_string(),
            section(layout.context_menu.visible, &layout.context_menu.menu_item, false),
        ),
    ])
}

/// Builds the INIT_APP payload for a WebLayout. Only the first runtime map is
/// used and it carries the caller's external base layers.
pub fn normalize_web_layout(
    layout: &WebLayout,
    maps: &[RuntimeMap],
    options: &InitOptions,
    external_base_layers: &[ExternalBaseLayer],
    registry: &mut CommandRegistry,
    strings: &StringBundles,
) -> InitAppPayload {
    let locale = options.locale.as_str();
    register_web_layout_commands(layout, registry, strings, locale);
    let toolbars = web_layout_toolbars(layout, strings, locale);

    let initial_view = layout.map.initial_view.as_ref().and_then(to_map_view);
    let first = maps.first();
    let map_name = first.map(|m| m.name.clone()).unwrap_or_default();
    let session = first.map(|m| m.session_id.clone()).unwrap_or_default();
    let map_infos = first
        .map(|m| MapInfo {
            name: m.name.clone(),
            map_group_id: m.name.clone(),
            map: m.clone(),
            initial_view,
            external_base_layers: external_base_layers.to_vec(),
        })
        .into_iter()
        .collect();

    let initial_task = layout
        .task_pane
        .initial_task
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_INITIAL_TASK);

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
        maps: map_infos,
        config: web_layout_config(layout),
        capabilities: web_layout_capabilities(layout),
        toolbars: prepare_sub_menus(toolbars),
        title: Some(layout.title.clone()).filter(|t| !t.is_empty()),
    }
}
