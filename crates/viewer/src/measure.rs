//! Line and area measurement on top of the viewer's overlay and draw
//! primitives.

use std::rc::Rc;

use foundation::math::{ProjectionTable, WGS84_A, haversine_length, spherical_ring_area};
use foundation::{interior_point, last_coordinate, planar_area, planar_length};
use geo::{Coord, LineString, Polygon};
use i18n::StringBundles;
use tracing::{debug, warn};

use crate::engine::{
    DrawSpec, DrawType, EngineEvent, InteractionId, LayerId, LayerSpec, MapEngine, OverlayChange,
    OverlayId, OverlaySpec, Positioning, Sketch,
};
use crate::viewer::MapViewer;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MeasureKind {
    Line,
    Area,
}

impl MeasureKind {
    fn draw_type(self) -> DrawType {
        match self {
            MeasureKind::Line => DrawType::LineString,
            MeasureKind::Area => DrawType::Polygon,
        }
    }
}

/// The measuring UI that owns a [`MeasureContext`]. Consulted on every
/// measurement, so changes take effect immediately.
pub trait MeasureComponent {
    /// Geometry type to draw, or `None` when no measurement type is chosen.
    fn draw_type(&self) -> Option<MeasureKind>;
    fn locale(&self) -> &str;
    fn is_geodesic(&self) -> bool;
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn format_length(meters: f64) -> String {
    if meters > 100.0 {
        format!("{} km", round2(meters / 1000.0))
    } else {
        format!("{} m", round2(meters))
    }
}

pub fn format_area(square_meters: f64) -> String {
    if square_meters > 10000.0 {
        format!("{} km<sup>2</sup>", round2(square_meters / 1_000_000.0))
    } else {
        format!("{} m<sup>2</sup>", round2(square_meters))
    }
}

pub struct MeasureContext<P: MeasureComponent> {
    layer_name: String,
    parent: P,
    strings: Rc<StringBundles>,
    projections: Rc<ProjectionTable>,
    layer: Option<LayerId>,
    active: bool,
    draw: Option<InteractionId>,
    listening: bool,
    /// Kind of the sketch in progress, between draw start and draw end.
    sketching: Option<MeasureKind>,
    help_tooltip: Option<OverlayId>,
    measure_tooltip: Option<OverlayId>,
    frozen: Vec<OverlayId>,
}

impl<P: MeasureComponent> MeasureContext<P> {
    pub fn new(
        map_name: &str,
        parent: P,
        strings: Rc<StringBundles>,
        projections: Rc<ProjectionTable>,
    ) -> Self {
        Self {
            layer_name: format!("measure-layer-{map_name}"),
            parent,
            strings,
            projections,
            layer: None,
            active: false,
            draw: None,
            listening: false,
            sketching: None,
            help_tooltip: None,
            measure_tooltip: None,
            frozen: Vec::new(),
        }
    }

    pub fn layer_name(&self) -> &str {
        &self.layer_name
    }

    pub fn parent(&self) -> &P {
        &self.parent
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_measuring(&self) -> bool {
        self.draw.is_some()
    }

    /// Number of finished measurements still labelled on the map.
    pub fn measurement_count(&self) -> usize {
        self.frozen.len()
    }

    /// Shows the measurement layer and its labels.
    pub fn activate<E: MapEngine>(&mut self, viewer: &MapViewer<E>) {
        match self.layer {
            Some(id) => viewer.set_layer_visible(id, true),
            None => {
                self.layer = Some(viewer.add_layer(LayerSpec::Vector {
                    name: self.layer_name.clone(),
                }))
            }
        }
        for id in &self.frozen {
            viewer.update_overlay(*id, OverlayChange::Visible(true));
        }
        self.active = true;
    }

    /// Ends any measurement and hides the layer and its labels. Finished
    /// measurements are kept for the next activation.
    pub fn deactivate<E: MapEngine>(&mut self, viewer: &MapViewer<E>) {
        self.end_measure(viewer);
        for id in &self.frozen {
            viewer.update_overlay(*id, OverlayChange::Visible(false));
        }
        if let Some(id) = self.layer {
            viewer.set_layer_visible(id, false);
        }
        self.active = false;
    }

    pub fn start_measure<E: MapEngine>(&mut self, viewer: &MapViewer<E>) {
        let Some(kind) = self.parent.draw_type() else {
            debug!("no measurement type chosen");
            return;
        };
        self.create_measure_tooltip(viewer);
        self.create_help_tooltip(viewer);
        self.install_draw(viewer, kind);
        self.listening = true;
    }

    pub fn end_measure<E: MapEngine>(&mut self, viewer: &MapViewer<E>) {
        self.listening = false;
        self.sketching = None;
        if let Some(id) = self.draw.take() {
            viewer.remove_interaction(id);
        }
        if let Some(id) = self.help_tooltip.take() {
            viewer.remove_overlay(id);
        }
    }

    pub fn clear_measurements<E: MapEngine>(&mut self, viewer: &MapViewer<E>) {
        if let Some(id) = self.layer {
            viewer.clear_features(id);
        }
        for id in self.frozen.drain(..) {
            viewer.remove_overlay(id);
        }
    }

    /// Swaps the draw interaction for the component's current type.
    pub fn handle_draw_type_change<E: MapEngine>(&mut self, viewer: &MapViewer<E>) {
        if self.draw.is_none() {
            return;
        }
        match self.parent.draw_type() {
            Some(kind) => self.install_draw(viewer, kind),
            None => self.end_measure(viewer),
        }
    }

    pub fn handle_event<E: MapEngine>(&mut self, viewer: &MapViewer<E>, event: &EngineEvent) {
        match event {
            EngineEvent::DrawStart { interaction, .. } if self.draw == Some(*interaction) => {
                self.sketching = self.parent.draw_type();
            }
            EngineEvent::DrawChange {
                interaction,
                sketch,
            } if self.draw == Some(*interaction) => {
                let epsg = viewer.map().epsg_code();
                let label = match sketch {
                    Sketch::LineString(line) => last_coordinate(line)
                        .map(|at| (format_length(self.line_length(epsg, line)), at)),
                    Sketch::Polygon(polygon) => interior_point(polygon)
                        .map(|at| (format_area(self.polygon_area(epsg, polygon)), at)),
                    _ => None,
                };
                if let (Some((html, at)), Some(tooltip)) = (label, self.measure_tooltip) {
                    viewer.update_overlay(tooltip, OverlayChange::Html(html));
                    viewer.update_overlay(tooltip, OverlayChange::Position(at));
                }
            }
            EngineEvent::DrawEnd { interaction, .. } if self.draw == Some(*interaction) => {
                if let Some(tooltip) = self.measure_tooltip.take() {
                    viewer.update_overlay(
                        tooltip,
                        OverlayChange::Class("tooltip tooltip-static".into()),
                    );
                    viewer.update_overlay(tooltip, OverlayChange::Offset([0.0, -7.0]));
                    self.frozen.push(tooltip);
                }
                self.sketching = None;
                self.create_measure_tooltip(viewer);
            }
            EngineEvent::PointerMove {
                coordinate,
                dragging: false,
                ..
            } if self.listening => self.show_help(viewer, *coordinate),
            _ => {}
        }
    }

    /// Length of `line` in meters, or in map units when the map projection
    /// cannot be inverted.
    pub fn line_length(&self, epsg: &str, line: &LineString<f64>) -> f64 {
        if self.parent.is_geodesic() {
            if let Some(coords) = self.geographic(epsg, &line.0) {
                return haversine_length(&coords, WGS84_A);
            }
            warn!(epsg, "cannot measure geodesically in this projection; using planar length");
        }
        round2(planar_length(line))
    }

    pub fn polygon_area(&self, epsg: &str, polygon: &Polygon<f64>) -> f64 {
        if self.parent.is_geodesic() {
            if let Some(ring) = self.geographic(epsg, &polygon.exterior().0) {
                return spherical_ring_area(&ring, WGS84_A).abs();
            }
            warn!(epsg, "cannot measure geodesically in this projection; using planar area");
        }
        planar_area(polygon)
    }

    fn geographic(&self, epsg: &str, coords: &[Coord<f64>]) -> Option<Vec<Coord<f64>>> {
        coords
            .iter()
            .map(|c| self.projections.to_geographic(epsg, *c))
            .collect()
    }

    fn show_help<E: MapEngine>(&self, viewer: &MapViewer<E>, at: Coord<f64>) {
        let Some(tooltip) = self.help_tooltip else {
            return;
        };
        let key = match self.sketching {
            Some(MeasureKind::Area) => "MEASUREMENT_CONTINUE_POLYGON",
            Some(MeasureKind::Line) => "MEASUREMENT_CONTINUE_LINE",
            None => "MEASUREMENT_START_DRAWING",
        };
        let text = self.strings.tr(key, self.parent.locale(), &[]);
        viewer.update_overlay(tooltip, OverlayChange::Html(text));
        viewer.update_overlay(tooltip, OverlayChange::Position(at));
        viewer.update_overlay(tooltip, OverlayChange::Visible(true));
    }

    fn install_draw<E: MapEngine>(&mut self, viewer: &MapViewer<E>, kind: MeasureKind) {
        if let Some(id) = self.draw.take() {
            viewer.remove_interaction(id);
        }
        self.sketching = None;
        self.draw = Some(viewer.add_interaction(DrawSpec {
            draw_type: kind.draw_type(),
            min_points: None,
            max_points: None,
            target: self.layer,
        }));
    }

    fn create_help_tooltip<E: MapEngine>(&mut self, viewer: &MapViewer<E>) {
        if let Some(id) = self.help_tooltip.take() {
            viewer.remove_overlay(id);
        }
        let id = viewer.add_overlay(OverlaySpec {
            class: "tooltip hidden".into(),
            offset: [15.0, 0.0],
            positioning: Positioning::CenterLeft,
        });
        viewer.update_overlay(id, OverlayChange::Visible(false));
        self.help_tooltip = Some(id);
    }

    /// Replaces the live (unfrozen) measure tooltip with a fresh one.
    fn create_measure_tooltip<E: MapEngine>(&mut self, viewer: &MapViewer<E>) {
        if let Some(id) = self.measure_tooltip.take() {
            viewer.remove_overlay(id);
        }
        self.measure_tooltip = Some(viewer.add_overlay(OverlaySpec {
            class: "tooltip tooltip-measure".into(),
            offset: [0.0, -15.0],
            positioning: Positioning::BottomCenter,
        }));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use foundation::math::ProjectionTable;
    use geo::{Coord, LineString, Polygon};
    use i18n::StringBundles;
    use pretty_assertions::assert_eq;

    use super::{MeasureComponent, MeasureContext, MeasureKind, format_area, format_length};
    use crate::engine::{DrawType, EngineEvent, LayerSpec, Sketch};
    use crate::props::ViewerProps;
    use crate::test_support::{FakeAgent, FakeEngine, sample_map};
    use crate::viewer::MapViewer;

    struct Panel {
        kind: Cell<Option<MeasureKind>>,
        geodesic: bool,
    }

    impl MeasureComponent for Panel {
        fn draw_type(&self) -> Option<MeasureKind> {
            self.kind.get()
        }

        fn locale(&self) -> &str {
            "en"
        }

        fn is_geodesic(&self) -> bool {
            self.geodesic
        }
    }

    fn context(kind: Option<MeasureKind>, geodesic: bool) -> MeasureContext<Panel> {
        MeasureContext::new(
            "Sheboygan",
            Panel {
                kind: Cell::new(kind),
                geodesic,
            },
            Rc::new(StringBundles::new()),
            Rc::new(ProjectionTable::new()),
        )
    }

    fn viewer() -> MapViewer<FakeEngine> {
        MapViewer::new(
            FakeEngine::new(),
            Rc::new(FakeAgent::default()),
            sample_map(),
            ViewerProps::default(),
        )
        .unwrap()
    }

    fn line(coords: Vec<(f64, f64)>) -> LineString<f64> {
        LineString::from(coords)
    }

    #[test]
    fn formats_units_by_magnitude() {
        assert_eq!(format_length(50.123), "50.12 m");
        assert_eq!(format_length(100.0), "100 m");
        assert_eq!(format_length(1234.5), "1.23 km");
        assert_eq!(format_area(2500.0), "2500 m<sup>2</sup>");
        assert_eq!(format_area(2_500_000.0), "2.5 km<sup>2</sup>");
    }

    #[test]
    fn geodesic_degree_at_equator() {
        let ctx = context(Some(MeasureKind::Line), true);
        let meters = ctx.line_length("4326", &line(vec![(0.0, 0.0), (1.0, 0.0)]));
        assert!((meters - 111_195.0).abs() < 300.0, "got {meters}");
        assert_eq!(format_length(meters), "111.32 km");
    }

    #[test]
    fn unknown_projection_falls_back_to_planar() {
        let ctx = context(Some(MeasureKind::Line), true);
        assert_eq!(ctx.line_length("27700", &line(vec![(0.0, 0.0), (3.0, 4.0)])), 5.0);

        let square = Polygon::new(
            line(vec![(0.0, 0.0), (200.0, 0.0), (200.0, 100.0), (0.0, 100.0), (0.0, 0.0)]),
            vec![],
        );
        assert_eq!(format_area(ctx.polygon_area("27700", &square)), "0.02 km<sup>2</sup>");
    }

    #[test]
    fn geodesic_area_is_positive_for_either_winding() {
        let ctx = context(Some(MeasureKind::Area), true);
        let ring = vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)];
        let ccw = Polygon::new(line(ring.clone()), vec![]);
        let cw = Polygon::new(line(ring.into_iter().rev().collect()), vec![]);
        let a = ctx.polygon_area("4326", &ccw);
        assert!(a > 1.2e10 && a < 1.3e10, "got {a}");
        assert!((ctx.polygon_area("4326", &cw) - a).abs() < 1.0);
    }

    #[test]
    fn measures_a_line_sketch() {
        let viewer = viewer();
        let mut ctx = context(Some(MeasureKind::Line), false);
        ctx.activate(&viewer);
        ctx.start_measure(&viewer);

        let (id, layer) = {
            let engine = viewer.engine();
            let layer = engine.layer("measure-layer-Sheboygan").id;
            assert!(matches!(engine.layer("measure-layer-Sheboygan").spec, LayerSpec::Vector { .. }));
            let (id, spec) = engine.interactions[0].clone();
            assert_eq!(spec.draw_type, DrawType::LineString);
            assert_eq!(spec.target, Some(layer));
            (id, layer)
        };

        let pointer = |dragging| EngineEvent::PointerMove {
            coordinate: Coord { x: 1.0, y: 1.0 },
            pixel: [0.0, 0.0],
            dragging,
        };
        ctx.handle_event(&viewer, &pointer(false));
        assert_eq!(viewer.engine().overlays_with_class("tooltip hidden")[0].html, "Click to start drawing");

        ctx.handle_event(
            &viewer,
            &EngineEvent::DrawStart {
                interaction: id,
                coordinate: Coord { x: 0.0, y: 0.0 },
            },
        );
        ctx.handle_event(&viewer, &pointer(false));
        assert_eq!(
            viewer.engine().overlays_with_class("tooltip hidden")[0].html,
            "Click to continue drawing the line. Double-click to finish."
        );

        let sketch = Sketch::LineString(line(vec![(0.0, 0.0), (3.0, 4.0)]));
        ctx.handle_event(
            &viewer,
            &EngineEvent::DrawChange {
                interaction: id,
                sketch: sketch.clone(),
            },
        );
        {
            let engine = viewer.engine();
            let live = engine.overlays_with_class("tooltip tooltip-measure");
            assert_eq!(live[0].html, "5 m");
            assert_eq!(live[0].position, Some(Coord { x: 3.0, y: 4.0 }));
        }

        ctx.handle_event(&viewer, &EngineEvent::DrawEnd { interaction: id, sketch });
        {
            let engine = viewer.engine();
            let frozen = engine.overlays_with_class("tooltip tooltip-static");
            assert_eq!(frozen.len(), 1);
            assert_eq!(frozen[0].spec.offset, [0.0, -7.0]);
            assert_eq!(frozen[0].html, "5 m");
            assert_eq!(engine.overlays_with_class("tooltip tooltip-measure").len(), 1);
        }
        assert_eq!(ctx.measurement_count(), 1);

        ctx.clear_measurements(&viewer);
        assert_eq!(ctx.measurement_count(), 0);
        {
            let engine = viewer.engine();
            assert!(engine.overlays_with_class("tooltip tooltip-static").is_empty());
            assert_eq!(engine.layer("measure-layer-Sheboygan").cleared, 1);
            assert_eq!(engine.layers.iter().filter(|l| l.id == layer).count(), 1);
        }

        ctx.end_measure(&viewer);
        let engine = viewer.engine();
        assert!(engine.interactions.is_empty());
        assert!(engine.overlays_with_class("tooltip hidden").is_empty());
    }

    #[test]
    fn dragging_does_not_update_help() {
        let viewer = viewer();
        let mut ctx = context(Some(MeasureKind::Area), false);
        ctx.activate(&viewer);
        ctx.start_measure(&viewer);
        ctx.handle_event(
            &viewer,
            &EngineEvent::PointerMove {
                coordinate: Coord { x: 1.0, y: 1.0 },
                pixel: [0.0, 0.0],
                dragging: true,
            },
        );
        let engine = viewer.engine();
        let help = engine.overlays_with_class("tooltip hidden");
        assert_eq!(help[0].html, "");
        assert!(!help[0].visible);
    }

    #[test]
    fn draw_type_change_swaps_interaction() {
        let viewer = viewer();
        let mut ctx = context(Some(MeasureKind::Line), false);
        ctx.activate(&viewer);
        ctx.start_measure(&viewer);
        ctx.parent().kind.set(Some(MeasureKind::Area));
        ctx.handle_draw_type_change(&viewer);

        let engine = viewer.engine();
        assert_eq!(engine.interactions.len(), 1);
        assert_eq!(engine.interactions[0].1.draw_type, DrawType::Polygon);
    }

    #[test]
    fn no_draw_type_means_no_session() {
        let viewer = viewer();
        let mut ctx = context(None, false);
        ctx.start_measure(&viewer);
        assert!(!ctx.is_measuring());
        assert!(viewer.engine().interactions.is_empty());
    }

    #[test]
    fn deactivate_hides_layer_and_ends_session() {
        let viewer = viewer();
        let mut ctx = context(Some(MeasureKind::Line), false);
        ctx.activate(&viewer);
        ctx.start_measure(&viewer);
        ctx.deactivate(&viewer);
        assert!(!ctx.is_active());
        assert!(!ctx.is_measuring());
        assert!(!viewer.engine().layer("measure-layer-Sheboygan").visible);

        ctx.activate(&viewer);
        let engine = viewer.engine();
        assert!(engine.layer("measure-layer-Sheboygan").visible);
        assert_eq!(
            engine.layers.iter().filter(|l| l.spec.name() == "measure-layer-Sheboygan").count(),
            1
        );
    }
}
