use std::collections::BTreeMap;

use commands::{PreparedToolbars, ToolbarItem};
use foundation::unique_name;

pub const TASK_PANE_TOOLBAR: &str = "taskpane";
pub const CONTEXT_MENU_TOOLBAR: &str = "contextmenu";
pub const MAIN_TOOLBAR: &str = "main";

/// Flattens nested toolbar items into flat toolbars plus a flyout registry.
///
/// The task pane toolbar becomes the `taskpane` flyout as a whole. The
/// context menu keeps its nesting. Any other item with children is replaced
/// by a [`ToolbarItem::FlyoutRef`] to a new flyout named `<label>_<id>`.
pub fn prepare_sub_menus(toolbars: BTreeMap<String, Vec<ToolbarItem>>) -> PreparedToolbars {
    let mut prepared = PreparedToolbars::default();
    for (key, items) in toolbars {
        if key == TASK_PANE_TOOLBAR {
            prepared.flyouts.insert(key, items);
            continue;
        }
        if key == CONTEXT_MENU_TOOLBAR {
            prepared.toolbars.insert(key, items);
            continue;
        }
        let mut flat = Vec::with_capacity(items.len());
        for item in items {
            match item {
                ToolbarItem::Flyout {
                    label,
                    tooltip,
                    children,
                } => {
                    let flyout_id = unique_name(label.as_deref().unwrap_or_default());
                    prepared.flyouts.insert(flyout_id.clone(), children);
                    flat.push(ToolbarItem::FlyoutRef {
                        label,
                        tooltip,
                        flyout_id,
                    });
                }
                other => flat.push(other),
            }
        }
        prepared.toolbars.insert(key, flat);
    }
    prepared
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flyout(label: &str) -> ToolbarItem {
        ToolbarItem::Flyout {
            label: Some(label.into()),
            tooltip: Some("tip".into()),
            children: vec![ToolbarItem::command("Measure", Some("Measure".into()), None)],
        }
    }

    #[test]
    fn flattens_all_but_context_menu() {
        let mut toolbars = BTreeMap::new();
        toolbars.insert(
            MAIN_TOOLBAR.to_string(),
            vec![ToolbarItem::command("Pan", None, None), flyout("Tools")],
        );
        toolbars.insert(CONTEXT_MENU_TOOLBAR.to_string(), vec![flyout("Zoom")]);
        toolbars.insert(
            TASK_PANE_TOOLBAR.to_string(),
            vec![ToolbarItem::command("Find", Some("Find".into()), None)],
        );

        let prepared = prepare_sub_menus(toolbars);

        assert_eq!(prepared.toolbars.len(), 2);
        assert!(!prepared.toolbars.contains_key(TASK_PANE_TOOLBAR));
        assert_eq!(prepared.flyouts[TASK_PANE_TOOLBAR].len(), 1);

        let main = &prepared.toolbars[MAIN_TOOLBAR];
        let ToolbarItem::FlyoutRef {
            label, flyout_id, ..
        } = &main[1]
        else {
            panic!("expected flyout reference");
        };
        assert_eq!(label.as_deref(), Some("Tools"));
        assert!(flyout_id.starts_with("Tools_"));
        assert_eq!(prepared.flyouts[flyout_id].len(), 1);

        assert!(matches!(
            prepared.toolbars[CONTEXT_MENU_TOOLBAR][0],
            ToolbarItem::Flyout { .. }
        ));
    }

    #[test]
    fn flyout_ids_are_fresh_per_item() {
        let mut toolbars = BTreeMap::new();
        toolbars.insert(MAIN_TOOLBAR.to_string(), vec![flyout("Tools"), flyout("Tools")]);
        let prepared = prepare_sub_menus(toolbars);
        // Two "Tools" flyouts plus nothing else.
        assert_eq!(prepared.flyouts.len(), 2);
    }
}
