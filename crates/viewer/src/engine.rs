//! Rendering engine abstraction.
//!
//! The viewer never draws anything itself. It describes layers, overlays and
//! interactions to a [`MapEngine`] and reacts to the [`EngineEvent`]s the
//! engine reports back.

use std::collections::BTreeMap;

use bitflags::bitflags;
use foundation::{Bounds, Circle};
use geo::{Coord, Geometry, LineString, Point, Polygon};

use crate::sources::{ExternalSource, TileUrlTemplate};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InteractionId(pub u64);

bitflags! {
    /// Pointer gestures the engine should arm.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct Gestures: u32 {
        const DRAG_PAN = 1;
        const DRAG_BOX = 2;
    }
}

/// View constraints applied once at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    /// `EPSG:<code>`, when the map has one.
    pub projection: Option<String>,
    /// Allowed resolutions, largest first. Empty means unconstrained.
    pub resolutions: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    pub origin: Coord<f64>,
    pub resolutions: Vec<f64>,
    pub tile_size: (u32, u32),
}

/// A mapagent rendered image, re-requested whenever the view or its params
/// change.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSource {
    pub url: String,
    pub extent: Bounds,
    pub projection: Option<String>,
    pub meters_per_unit: f64,
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerSpec {
    Tile {
        name: String,
        grid: TileGrid,
        url: TileUrlTemplate,
        projection: Option<String>,
    },
    Image {
        name: String,
        source: ImageSource,
    },
    External {
        title: String,
        source: ExternalSource,
        visible: bool,
    },
    /// Client side vector features, e.g. measurement sketches.
    Vector { name: String },
}

impl LayerSpec {
    pub fn name(&self) -> &str {
        match self {
            LayerSpec::Tile { name, .. }
            | LayerSpec::Image { name, .. }
            | LayerSpec::Vector { name } => name,
            LayerSpec::External { title, .. } => title,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Positioning {
    CenterLeft,
    BottomCenter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySpec {
    /// CSS class list of the overlay element.
    pub class: String,
    pub offset: [f64; 2],
    pub positioning: Positioning,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayChange {
    Html(String),
    Position(Coord<f64>),
    Visible(bool),
    Class(String),
    Offset([f64; 2]),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DrawType {
    Point,
    LineString,
    Circle,
    Polygon,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawSpec {
    pub draw_type: DrawType,
    pub min_points: Option<u32>,
    pub max_points: Option<u32>,
    /// Vector layer that keeps finished sketches, if any.
    pub target: Option<LayerId>,
}

/// Geometry produced by a draw interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Sketch {
    Point(Coord<f64>),
    LineString(LineString<f64>),
    Polygon(Polygon<f64>),
    Circle(Circle),
}

/// Sides used when a circle has to be sent to the server as a polygon.
pub const CIRCLE_SEGMENTS: usize = 64;

impl Sketch {
    pub fn to_geometry(&self) -> Geometry<f64> {
        match self {
            Sketch::Point(c) => Geometry::Point(Point(*c)),
            Sketch::LineString(l) => Geometry::LineString(l.clone()),
            Sketch::Polygon(p) => Geometry::Polygon(p.clone()),
            Sketch::Circle(c) => Geometry::Polygon(c.to_polygon(CIRCLE_SEGMENTS)),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other(u32),
}

/// Everything the engine reports back to the viewer.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    PointerMove {
        coordinate: Coord<f64>,
        pixel: [f64; 2],
        dragging: bool,
    },
    MouseOut,
    Click {
        coordinate: Coord<f64>,
        pixel: [f64; 2],
    },
    /// A drag box gesture finished.
    BoxEnd { extent: Bounds },
    MoveEnd,
    KeyDown(Key),
    ImageLoadStart(LayerId),
    ImageLoadEnd(LayerId),
    ImageLoadError(LayerId),
    DrawStart {
        interaction: InteractionId,
        coordinate: Coord<f64>,
    },
    DrawChange {
        interaction: InteractionId,
        sketch: Sketch,
    },
    DrawEnd {
        interaction: InteractionId,
        sketch: Sketch,
    },
}

/// Imperative surface of a map rendering engine.
///
/// Layers are stacked in the order they are added, last on top.
pub trait MapEngine {
    /// Viewport size in pixels.
    fn size(&self) -> (f64, f64);
    fn configure_view(&mut self, config: &ViewConfig);
    fn center(&self) -> Option<Coord<f64>>;
    fn resolution(&self) -> Option<f64>;
    fn set_center(&mut self, center: Coord<f64>);
    fn set_resolution(&mut self, resolution: f64);
    fn fit(&mut self, extent: &Bounds);
    fn coordinate_from_pixel(&self, pixel: [f64; 2]) -> Option<Coord<f64>>;

    fn add_layer(&mut self, spec: LayerSpec) -> LayerId;
    fn set_layer_visible(&mut self, id: LayerId, visible: bool);
    /// Merges `params` into an image source and re-requests it.
    fn update_params(&mut self, id: LayerId, params: &[(&str, String)]);
    fn clear_features(&mut self, id: LayerId);

    fn add_overlay(&mut self, spec: OverlaySpec) -> OverlayId;
    fn update_overlay(&mut self, id: OverlayId, change: OverlayChange);
    fn remove_overlay(&mut self, id: OverlayId);

    fn add_interaction(&mut self, spec: DrawSpec) -> InteractionId;
    fn remove_interaction(&mut self, id: InteractionId);
    fn set_gestures(&mut self, gestures: Gestures);
}
