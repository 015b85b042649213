use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use contracts::weblayout::{CommandTarget, InvokeUrlCommand, SearchCommand};
use tracing::debug;

use crate::action::{Action, Dispatcher, ModalOptions};
use crate::conditions;
use crate::params::{MapContext, encode_uri_component, ensure_parameters};
use crate::state::AppState;

pub const INVOKE_URL_ICON: &str = "invoke-url.png";
pub const SEARCH_ICON: &str = "search.png";
pub const SEARCH_PROMPT_URL: &str = "server/Search/SearchPrompt.php";
pub const MODAL_SIZE: [u32; 2] = [300, 500];

/// Viewer operations available to command invocations.
pub trait ViewerHandle {
    fn zoom_delta(&self, delta: f64);
    fn initial_view(&self);
    fn clear_selection(&self);
    fn refresh_map(&self);
    fn is_digitizing(&self) -> bool;
}

type Predicate = Box<dyn Fn(&AppState) -> bool + Send + Sync>;
type Invoke = Box<dyn Fn(&mut dyn Dispatcher, &AppState, Option<&dyn ViewerHandle>) + Send + Sync>;

/// Behaviour bound to a command name.
pub struct CommandDescriptor {
    icon: String,
    enabled: Predicate,
    selected: Predicate,
    invoke: Invoke,
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("icon", &self.icon)
            .finish_non_exhaustive()
    }
}

impl CommandDescriptor {
    /// Always enabled, never selected.
    pub fn new<F>(icon: impl Into<String>, invoke: F) -> Self
    where
        F: Fn(&mut dyn Dispatcher, &AppState, Option<&dyn ViewerHandle>) + Send + Sync + 'static,
    {
        Self {
            icon: icon.into(),
            enabled: Box::new(|_| true),
            selected: Box::new(|_| false),
            invoke: Box::new(invoke),
        }
    }

    pub fn with_enabled(mut self, f: impl Fn(&AppState) -> bool + Send + Sync + 'static) -> Self {
        self.enabled = Box::new(f);
        self
    }

    pub fn with_selected(mut self, f: impl Fn(&AppState) -> bool + Send + Sync + 'static) -> Self {
        self.selected = Box::new(f);
        self
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn is_enabled(&self, state: &AppState) -> bool {
        (self.enabled)(state)
    }

    pub fn is_selected(&self, state: &AppState) -> bool {
        (self.selected)(state)
    }

    pub fn invoke(
        &self,
        dispatcher: &mut dyn Dispatcher,
        state: &AppState,
        viewer: Option<&dyn ViewerHandle>,
    ) {
        (self.invoke)(dispatcher, state, viewer)
    }

    /// Opens a server URL in the task pane or in a modal dialog.
    pub fn invoke_url(name: &str, cmd: &InvokeUrlCommand, modal_title: String) -> Self {
        let disable_if_empty = cmd.disable_if_selection_empty;
        let cmd_for_invoke = cmd.clone();
        let name = name.to_string();
        Self::new(
            cmd.icon.clone().unwrap_or_else(|| INVOKE_URL_ICON.to_string()),
            move |dispatcher, state, _viewer| {
                let Some(map) = state.active_map() else {
                    return;
                };
                let url = ensure_parameters(
                    &cmd_for_invoke.url,
                    MapContext {
                        map_name: &map.map_name,
                        session: &map.session_id,
                        locale: &state.config.locale,
                    },
                    true,
                    &cmd_for_invoke.parameters,
                );
                match cmd_for_invoke.target {
                    CommandTarget::TaskPane => dispatcher.dispatch(Action::TaskInvokeUrl { url }),
                    CommandTarget::NewWindow | CommandTarget::SpecifiedFrame => {
                        dispatcher.dispatch(Action::ModalShowUrl {
                            modal: ModalOptions {
                                title: modal_title.clone(),
                                backdrop: false,
                                size: MODAL_SIZE,
                            },
                            name: name.clone(),
                            url,
                        })
                    }
                }
            },
        )
        .with_enabled(move |state| !disable_if_empty || conditions::has_selection(state))
    }

    /// Opens the server search prompt in the task pane.
    pub fn search(cmd: &SearchCommand) -> Self {
        let cmd_for_invoke = cmd.clone();
        Self::new(
            cmd.icon.clone().unwrap_or_else(|| SEARCH_ICON.to_string()),
            move |dispatcher, state, _viewer| {
                let Some(map) = state.active_map() else {
                    return;
                };
                let url = search_url(
                    &cmd_for_invoke,
                    MapContext {
                        map_name: &map.map_name,
                        session: &map.session_id,
                        locale: &state.config.locale,
                    },
                );
                dispatcher.dispatch(Action::TaskInvokeUrl { url });
            },
        )
    }
}

pub fn search_url(cmd: &SearchCommand, ctx: MapContext<'_>) -> String {
    let mut url = ensure_parameters(SEARCH_PROMPT_URL, ctx, false, &[]);
    url.push_str("&popup=0&target=TaskPane");
    url.push_str(&format!("&title={}", encode_uri_component(&cmd.title)));
    url.push_str(&format!("&prompt={}", encode_uri_component(&cmd.prompt)));
    url.push_str(&format!("&layer={}", encode_uri_component(&cmd.layer)));
    if let Some(filter) = cmd.filter.as_deref().filter(|f| !f.is_empty()) {
        url.push_str(&format!("&filter={}", encode_uri_component(filter)));
    }
    url.push_str(&format!("&limit={}", cmd.match_limit));
    let properties: Vec<&str> = cmd.result_columns.iter().map(|c| c.property.as_str()).collect();
    let names: Vec<&str> = cmd.result_columns.iter().map(|c| c.name.as_str()).collect();
    url.push_str(&format!("&properties={}", properties.join(",")));
    url.push_str(&format!("&propNames={}", names.join(",")));
    url
}

/// Command name to descriptor table.
///
/// Built once during startup and shared read-only afterwards. Entries are
/// replaced on re-registration and never removed.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Arc<CommandDescriptor>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the descriptor for `name` and returns the stored
    /// handle.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        descriptor: impl Into<Arc<CommandDescriptor>>,
    ) -> Arc<CommandDescriptor> {
        let name = name.into();
        let descriptor = descriptor.into();
        if self.commands.insert(name.clone(), descriptor.clone()).is_some() {
            debug!("replaced command descriptor: {name}");
        }
        descriptor
    }

    pub fn register_invoke_url(
        &mut self,
        name: &str,
        cmd: &InvokeUrlCommand,
        modal_title: String,
    ) -> Arc<CommandDescriptor> {
        self.register(name, CommandDescriptor::invoke_url(name, cmd, modal_title))
    }

    pub fn register_search(&mut self, name: &str, cmd: &SearchCommand) -> Arc<CommandDescriptor> {
        self.register(name, CommandDescriptor::search(cmd))
    }

    pub fn get(&self, name: &str) -> Option<Arc<CommandDescriptor>> {
        self.commands.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
