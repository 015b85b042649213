//! Command registry, toolbar model and the application actions and state that
//! commands read and dispatch.

pub mod action;
pub mod conditions;
pub mod names;
pub mod params;
pub mod registry;
pub mod state;
pub mod toolbar;

pub use action::*;
pub use names::{DefaultCommand, DefaultComponent};
pub use params::{MapContext, encode_uri_component, ensure_parameters};
pub use registry::{CommandDescriptor, CommandRegistry, ViewerHandle};
pub use state::*;
pub use toolbar::{ERROR_ICON, PreparedToolbars, ResolvedItem, ToolbarItem, resolve_toolbar_item};
