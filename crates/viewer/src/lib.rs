//! Map viewer core: one runtime map on one [`MapEngine`], driven by props and
//! engine events, plus the measurement mode layered on top of it.

pub mod digitizer;
pub mod engine;
pub mod error;
pub mod measure;
pub mod props;
pub mod sources;
pub mod tooltip;
pub mod viewer;

#[cfg(test)]
mod test_support;

pub use commands::ViewerHandle;
pub use digitizer::{DigitizeKind, Digitizer, PromptTooltip, rectangle_from_corners};
pub use engine::{
    DrawSpec, DrawType, EngineEvent, Gestures, InteractionId, Key, LayerId, LayerSpec, MapEngine,
    OverlayChange, OverlayId, OverlaySpec, Positioning, Sketch,
};
pub use error::ViewerError;
pub use measure::{MeasureComponent, MeasureContext, MeasureKind, format_area, format_length};
pub use props::{ActiveTool, LayerGroupVisibility, RefreshMode, ViewerEvent, ViewerProps};
pub use viewer::MapViewer;
