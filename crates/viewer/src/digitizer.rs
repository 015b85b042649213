//! Interactive sketching of a single geometry.

use geo::{Coord, LineString, Polygon};
use tracing::debug;

use crate::engine::{
    DrawSpec, DrawType, InteractionId, MapEngine, OverlayChange, OverlayId, OverlaySpec,
    Positioning, Sketch,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DigitizeKind {
    Point,
    /// Exactly two vertices.
    Line,
    LineString,
    Circle,
    Rectangle,
    Polygon,
}

impl DigitizeKind {
    pub fn draw_spec(self) -> DrawSpec {
        let (draw_type, min_points, max_points) = match self {
            DigitizeKind::Point => (DrawType::Point, None, None),
            DigitizeKind::Line => (DrawType::LineString, Some(2), Some(2)),
            DigitizeKind::LineString => (DrawType::LineString, Some(2), None),
            DigitizeKind::Circle => (DrawType::Circle, None, None),
            DigitizeKind::Rectangle => (DrawType::LineString, None, Some(2)),
            DigitizeKind::Polygon => (DrawType::Polygon, None, None),
        };
        DrawSpec {
            draw_type,
            min_points,
            max_points,
            target: None,
        }
    }

    pub fn default_prompt(self) -> &'static str {
        match self {
            DigitizeKind::Point => {
                "Click to finish and draw a point at this location<br/><br/>Press ESC to cancel"
            }
            DigitizeKind::Line => {
                "Click to set this position as the start.<br/>Click again to finish the line at this position<br/><br/>Press ESC to cancel"
            }
            DigitizeKind::LineString => {
                "Click to set this position as the start.<br/>Click again to add a vertex at this position.<br/>Hold SHIFT and drag while digitizing to draw in freehand mode<br/><br/>Double click to finish<br/>Press ESC to cancel"
            }
            DigitizeKind::Circle => {
                "Click to set this position as the center.<br/>Move out to the desired radius and click again to finish<br/><br/>Press ESC to cancel"
            }
            DigitizeKind::Rectangle => {
                "Click to set this position as one corner.<br/>Click again to finish and set this position as the other corner<br/><br/>Press ESC to cancel"
            }
            DigitizeKind::Polygon => {
                "Click to set this position as the start.<br/>Click again to add a vertex at this position.<br/>Hold SHIFT and drag while digitizing to draw in freehand mode<br/><br/>Double click to finish and close the polygon<br/>Press ESC to cancel"
            }
        }
    }

    /// Final geometry for a finished sketch. Rectangles are drawn as a two
    /// point line and closed into a polygon here.
    fn finish(self, sketch: Sketch) -> Sketch {
        match (self, sketch) {
            (DigitizeKind::Rectangle, Sketch::LineString(line)) if line.0.len() >= 2 => {
                Sketch::Polygon(rectangle_from_corners(line.0[0], line.0[1]))
            }
            (_, sketch) => sketch,
        }
    }
}

/// Axis-aligned ring through both corners, starting and ending at `start`.
pub fn rectangle_from_corners(start: Coord<f64>, end: Coord<f64>) -> Polygon<f64> {
    Polygon::new(
        LineString::new(vec![
            start,
            Coord {
                x: start.x,
                y: end.y,
            },
            end,
            Coord {
                x: end.x,
                y: start.y,
            },
            start,
        ]),
        vec![],
    )
}

pub type DigitizerCallback = Box<dyn FnOnce(Sketch)>;

struct ActiveDraw {
    interaction: InteractionId,
    kind: DigitizeKind,
    callback: DigitizerCallback,
}

/// At most one draw interaction at a time.
#[derive(Default)]
pub struct Digitizer {
    active: Option<ActiveDraw>,
}

impl Digitizer {
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn interaction(&self) -> Option<InteractionId> {
        self.active.as_ref().map(|a| a.interaction)
    }

    /// Installs a new draw interaction, replacing any in progress.
    pub fn begin(
        &mut self,
        engine: &mut dyn MapEngine,
        kind: DigitizeKind,
        callback: DigitizerCallback,
    ) -> InteractionId {
        self.cancel(engine);
        let interaction = engine.add_interaction(kind.draw_spec());
        self.active = Some(ActiveDraw {
            interaction,
            kind,
            callback,
        });
        interaction
    }

    /// Removes the active interaction without running its callback.
    pub fn cancel(&mut self, engine: &mut dyn MapEngine) -> bool {
        match self.active.take() {
            Some(active) => {
                engine.remove_interaction(active.interaction);
                debug!(kind = ?active.kind, "digitizing cancelled");
                true
            }
            None => false,
        }
    }

    /// Ends the session if `interaction` is the active one, returning the
    /// callback and the finished geometry for the caller to run.
    pub fn finish(
        &mut self,
        engine: &mut dyn MapEngine,
        interaction: InteractionId,
        sketch: Sketch,
    ) -> Option<(DigitizerCallback, Sketch)> {
        if self.interaction() != Some(interaction) {
            return None;
        }
        let active = self.active.take()?;
        engine.remove_interaction(active.interaction);
        Some((active.callback, active.kind.finish(sketch)))
    }
}

/// Instruction text that follows the pointer while a prompt is set.
pub struct PromptTooltip {
    overlay: OverlayId,
    text: Option<String>,
}

impl PromptTooltip {
    pub fn new(engine: &mut dyn MapEngine) -> Self {
        let overlay = engine.add_overlay(OverlaySpec {
            class: "tooltip".into(),
            offset: [15.0, 0.0],
            positioning: Positioning::CenterLeft,
        });
        engine.update_overlay(overlay, OverlayChange::Visible(false));
        Self {
            overlay,
            text: None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, engine: &mut dyn MapEngine, text: &str) {
        self.text = Some(text.to_string());
        engine.update_overlay(self.overlay, OverlayChange::Html(text.to_string()));
    }

    pub fn clear(&mut self, engine: &mut dyn MapEngine) {
        self.text = None;
        engine.update_overlay(self.overlay, OverlayChange::Html(String::new()));
        engine.update_overlay(self.overlay, OverlayChange::Visible(false));
    }

    pub fn on_pointer_move(&self, engine: &mut dyn MapEngine, coordinate: Coord<f64>) {
        engine.update_overlay(self.overlay, OverlayChange::Position(coordinate));
        engine.update_overlay(self.overlay, OverlayChange::Visible(self.text.is_some()));
    }

    pub fn on_mouse_out(&self, engine: &mut dyn MapEngine) {
        engine.update_overlay(self.overlay, OverlayChange::Visible(false));
    }
}
