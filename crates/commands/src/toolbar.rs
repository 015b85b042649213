//! Normalized toolbar model and its resolution against the command registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use i18n::StringBundles;
use serde::{Deserialize, Serialize};

use crate::registry::{CommandDescriptor, CommandRegistry};
use crate::state::AppState;

pub const ERROR_ICON: &str = "error.png";

/// One entry of a toolbar, menu or flyout as produced by layout conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ToolbarItem {
    #[serde(rename_all = "camelCase")]
    Command {
        command: String,
        label: Option<String>,
        tooltip: Option<String>,
    },
    Separator,
    /// Nested children; flattened into a [`ToolbarItem::FlyoutRef`] before
    /// reaching the presentation layer, except in the context menu.
    #[serde(rename_all = "camelCase")]
    Flyout {
        label: Option<String>,
        tooltip: Option<String>,
        children: Vec<ToolbarItem>,
    },
    #[serde(rename_all = "camelCase")]
    FlyoutRef {
        label: Option<String>,
        tooltip: Option<String>,
        flyout_id: String,
    },
    /// Placeholder for a host-provided UI component shown in a flyout.
    #[serde(rename_all = "camelCase")]
    Component {
        label: Option<String>,
        tooltip: Option<String>,
        component: String,
        flyout_id: String,
    },
    Error {
        message: String,
    },
}

impl ToolbarItem {
    pub fn command(command: impl Into<String>, label: Option<String>, tooltip: Option<String>) -> Self {
        ToolbarItem::Command {
            command: command.into(),
            label,
            tooltip,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            ToolbarItem::Command { label, .. }
            | ToolbarItem::Flyout { label, .. }
            | ToolbarItem::FlyoutRef { label, .. }
            | ToolbarItem::Component { label, .. } => label.as_deref(),
            ToolbarItem::Separator | ToolbarItem::Error { .. } => None,
        }
    }
}

/// Flat toolbars plus the flyouts they reference by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreparedToolbars {
    pub toolbars: BTreeMap<String, Vec<ToolbarItem>>,
    pub flyouts: BTreeMap<String, Vec<ToolbarItem>>,
}

/// A toolbar item bound to its behaviour, ready for presentation.
#[derive(Clone)]
pub enum ResolvedItem {
    Command {
        icon: String,
        label: Option<String>,
        tooltip: Option<String>,
        descriptor: Arc<CommandDescriptor>,
    },
    Error {
        icon: &'static str,
        label: String,
        tooltip: String,
    },
    Separator,
    Menu {
        label: Option<String>,
        tooltip: Option<String>,
        children: Vec<ResolvedItem>,
    },
    FlyoutRef {
        label: Option<String>,
        tooltip: Option<String>,
        flyout_id: String,
    },
    ComponentFlyout {
        label: Option<String>,
        tooltip: Option<String>,
        component: String,
        flyout_id: String,
    },
}

impl ResolvedItem {
    pub fn is_enabled(&self, state: &AppState) -> bool {
        match self {
            ResolvedItem::Command { descriptor, .. } => descriptor.is_enabled(state),
            ResolvedItem::Error { .. } | ResolvedItem::Separator => false,
            _ => true,
        }
    }

    pub fn is_selected(&self, state: &AppState) -> bool {
        match self {
            ResolvedItem::Command { descriptor, .. } => descriptor.is_selected(state),
            _ => false,
        }
    }
}

/// Binds a toolbar item to the registry. Commands that are not registered
/// resolve to nothing and are dropped from menus.
pub fn resolve_toolbar_item(
    item: &ToolbarItem,
    registry: &CommandRegistry,
    strings: &StringBundles,
    locale: &str,
) -> Option<ResolvedItem> {
    match item {
        ToolbarItem::Error { message } => Some(ResolvedItem::Error {
            icon: ERROR_ICON,
            label: strings.tr("ERROR", locale, &[]),
            tooltip: message.clone(),
        }),
        ToolbarItem::Component {
            label,
            tooltip,
            component,
            flyout_id,
        } => Some(ResolvedItem::ComponentFlyout {
            label: label.clone(),
            tooltip: tooltip.clone(),
            component: component.clone(),
            flyout_id: flyout_id.clone(),
        }),
        ToolbarItem::Separator => Some(ResolvedItem::Separator),
        ToolbarItem::Command {
            command,
            label,
            tooltip,
        } => registry.get(command).map(|descriptor| ResolvedItem::Command {
            icon: descriptor.icon().to_string(),
            label: label.clone(),
            tooltip: tooltip.clone(),
            descriptor,
        }),
        ToolbarItem::Flyout {
            label,
            tooltip,
            children,
        } => Some(ResolvedItem::Menu {
            label: label.clone(),
            tooltip: tooltip.clone(),
            children: children
                .iter()
                .filter_map(|c| resolve_toolbar_item(c, registry, strings, locale))
                .collect(),
        }),
        ToolbarItem::FlyoutRef {
            label,
            tooltip,
            flyout_id,
        } => Some(ResolvedItem::FlyoutRef {
            label: label.clone(),
            tooltip: tooltip.clone(),
            flyout_id: flyout_id.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CommandDescriptor;

    fn registry() -> CommandRegistry {
        let mut reg = CommandRegistry::new();
        reg.register("Pan", CommandDescriptor::new("pan.png", |_, _, _| {}));
        reg
    }

    #[test]
    fn resolves_nested_menus_and_drops_unknown_commands() {
        let reg = registry();
        let strings = StringBundles::new();
        let item = ToolbarItem::Flyout {
            label: Some("Nav".into()),
            tooltip: None,
            children: vec![
                ToolbarItem::command("Pan", None, None),
                ToolbarItem::command("Nope", None, None),
                ToolbarItem::Separator,
            ],
        };
        let Some(ResolvedItem::Menu { children, .. }) =
            resolve_toolbar_item(&item, &reg, &strings, "en")
        else {
            panic!("expected menu");
        };
        assert_eq!(children.len(), 2);
        assert!(matches!(&children[0], ResolvedItem::Command { icon, .. } if icon == "pan.png"));
    }

    #[test]
    fn error_items_are_disabled() {
        let reg = registry();
        let strings = StringBundles::new();
        let item = ToolbarItem::Error {
            message: "bad".into(),
        };
        let resolved = resolve_toolbar_item(&item, &reg, &strings, "en").unwrap();
        let ResolvedItem::Error { icon, label, tooltip } = &resolved else {
            panic!("expected error item");
        };
        assert_eq!((*icon, label.as_str(), tooltip.as_str()), ("error.png", "Error", "bad"));
        assert!(!resolved.is_enabled(&AppState::default()));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let item = ToolbarItem::FlyoutRef {
            label: Some("Tools".into()),
            tooltip: None,
            flyout_id: "Tools_x".into(),
        };
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            serde_json::json!({ "kind": "flyoutRef", "label": "Tools", "tooltip": null, "flyoutId": "Tools_x" })
        );
    }
}
