//! Registration of server-declared InvokeURL and Search commands.

use commands::CommandRegistry;
use contracts::fusion::Widget;
use contracts::weblayout::{
    CommandTarget, InvokeUrlCommand, ResultColumn, SearchCommand, UrlParameter,
};
use i18n::StringBundles;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

const DEFAULT_MATCH_LIMIT: u32 = 100;

/// Registers an InvokeURL command unless it targets a named frame, which the
/// viewer cannot address.
pub fn register_invoke_url(
    registry: &mut CommandRegistry,
    name: &str,
    cmd: &InvokeUrlCommand,
    strings: &StringBundles,
    locale: &str,
) -> bool {
    if cmd.target == CommandTarget::SpecifiedFrame {
        warn!("Command {name} targets a specific frame which is not supported");
        return false;
    }
    registry.register_invoke_url(name, cmd, strings.tr(name, locale, &[]));
    true
}

pub fn register_search(registry: &mut CommandRegistry, name: &str, cmd: &SearchCommand) {
    registry.register_search(name, cmd);
}

pub fn invoke_url_from_widget(widget: &Widget) -> InvokeUrlCommand {
    InvokeUrlCommand {
        url: widget.ext("Url").unwrap_or_default(),
        target: CommandTarget::parse(widget.ext("Target").as_deref()),
        disable_if_selection_empty: widget.ext_bool("DisableIfSelectionEmpty"),
        parameters: widget
            .ext_pairs("AdditionalParameter")
            .into_iter()
            .map(|(name, value)| UrlParameter { name, value })
            .collect(),
        icon: widget.ext("ImageUrl"),
    }
}

pub fn search_from_widget(widget: &Widget) -> SearchCommand {
    SearchCommand {
        title: widget.ext("Title").unwrap_or_default(),
        layer: widget.ext("Layer").unwrap_or_default(),
        prompt: widget.ext("Prompt").unwrap_or_default(),
        result_columns: widget
            .extension
            .get("ResultColumns")
            .map(result_columns)
            .unwrap_or_default(),
        filter: widget.ext("Filter").filter(|f| !f.is_empty()),
        match_limit: widget
            .ext("MatchLimit")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_MATCH_LIMIT),
        icon: widget.ext("ImageUrl"),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<ResultColumn>),
    One(ResultColumn),
}

/// `ResultColumns.Column`, which servers emit as an object or an array.
fn result_columns(value: &Value) -> Vec<ResultColumn> {
    let Some(column) = value.get("Column") else {
        return Vec::new();
    };
    match serde_json::from_value::<OneOrMany>(column.clone()) {
        Ok(OneOrMany::Many(columns)) => columns,
        Ok(OneOrMany::One(column)) => vec![column],
        Err(e) => {
            warn!("ignoring malformed search result columns: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(json: serde_json::Value) -> Widget {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn reads_search_widget_extension() {
        let w = widget(serde_json::json!({
            "WidgetType": "UiWidgetType", "Name": "Find", "Type": "Search",
            "Extension": {
                "Title": ["Find parcels"], "Layer": "Parcels", "Prompt": "Owner",
                "MatchLimit": "25", "Filter": "",
                "ResultColumns": { "Column": { "Name": "Owner", "Property": "RNAME" } }
            }
        }));
        let cmd = search_from_widget(&w);
        assert_eq!(cmd.title, "Find parcels");
        assert_eq!(cmd.match_limit, 25);
        assert_eq!(cmd.filter, None);
        assert_eq!(cmd.result_columns.len(), 1);
        assert_eq!(cmd.result_columns[0].property, "RNAME");
    }

    #[test]
    fn specified_frame_is_not_registered() {
        let w = widget(serde_json::json!({
            "WidgetType": "UiWidgetType", "Name": "Frame", "Type": "InvokeURL",
            "Extension": { "Url": "http://x", "Target": "SpecifiedFrame" }
        }));
        let cmd = invoke_url_from_widget(&w);
        let mut registry = CommandRegistry::new();
        let strings = StringBundles::new();
        assert!(!register_invoke_url(&mut registry, "Frame", &cmd, &strings, "en"));
        assert!(registry.is_empty());

        let w = widget(serde_json::json!({
            "WidgetType": "UiWidgetType", "Name": "Report", "Type": "InvokeURL",
            "Extension": {
                "Url": "http://x", "DisableIfSelectionEmpty": "true",
                "AdditionalParameter": [{ "Key": "A", "Value": "1" }]
            }
        }));
        let cmd = invoke_url_from_widget(&w);
        assert_eq!(cmd.target, CommandTarget::TaskPane);
        assert!(cmd.disable_if_selection_empty);
        assert_eq!(cmd.parameters[0].name, "A");
        assert!(register_invoke_url(&mut registry, "Report", &cmd, &strings, "en"));
        assert!(registry.contains("Report"));
    }
}
