//! Data contracts exchanged with the map server.
//!
//! - [`runtime_map`]: the live map handle returned by `CREATERUNTIMEMAP`
//! - [`query`]: `QUERYMAPFEATURES` parameters and responses
//! - [`weblayout`] and [`fusion`]: the two layout document schemas

pub mod fusion;
pub mod query;
pub mod runtime_map;
pub mod weblayout;

pub use fusion::{ApplicationDefinition, ContainerItem, MapProvider, Widget};
pub use query::*;
pub use runtime_map::*;
pub use weblayout::{
    CommandDef, CommandKind, CommandTarget, InitialView, InvokeUrlCommand, ResultColumn,
    SearchCommand, TargetViewer, UiItem, UrlParameter, WebLayout,
};
