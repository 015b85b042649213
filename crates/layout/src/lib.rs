//! Layout normalization and viewer startup.
//!
//! Both layout schemas end up as one [`commands::InitAppPayload`]: toolbars
//! and flyouts, capabilities, viewer settings and the runtime maps to show.
//! InvokeURL and Search commands found along the way are registered into the
//! [`commands::CommandRegistry`].

pub mod error;
pub mod flex;
pub mod init;
pub mod maps;
pub mod provision;
pub mod register;
pub mod submenu;
pub mod web;

#[cfg(test)]
mod test_support;

pub use commands::{PreparedToolbars, ToolbarItem, ViewerConfig};
pub use error::{InitError, error_chain};
pub use flex::{WidgetKind, convert_flex_layout_ui_items, normalize_flex_layout};
pub use init::{AppContext, Initializer, LayoutKind};
pub use maps::{setup_maps, target_map_name};
pub use submenu::prepare_sub_menus;
pub use web::{convert_web_layout_ui_items, normalize_web_layout};

/// Task pane page shown when the layout names none.
pub const DEFAULT_INITIAL_TASK: &str = "server/TaskPane.html";
