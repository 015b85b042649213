//! The map viewer core.
//!
//! [`MapViewer`] owns one engine bound to one runtime map. Props flow in
//! through [`MapViewer::update_props`], engine input through
//! [`MapViewer::handle_event`], and the host collects [`ViewerEvent`]s with
//! [`MapViewer::drain_events`]. Timed and network work runs in
//! [`MapViewer::tick`].
//!
//! The viewer is single threaded: state lives in `RefCell`s and no borrow is
//! held across an `.await`.

use std::cell::{Cell, Ref, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use client::MapAgent;
use commands::ViewerHandle;
use contracts::query::{QueryFeatureFlags, QueryMapFeaturesRequest, SelectionVariant};
use contracts::runtime_map::RuntimeMap;
use foundation::{
    Bounds, Circle, MapView, ScaleConverter, Time, ViewTarget, are_views_close_to_equal,
    point_wkt, to_wkt,
};
use geo::{Coord, Geometry, LineString, Point, Polygon};
use runtime::{BusyCounter, Debouncer, EventBus, RequestSequence};
use tracing::{debug, info, warn};

use crate::digitizer::{DigitizeKind, Digitizer, PromptTooltip};
use crate::engine::{
    DrawSpec, EngineEvent, Gestures, ImageSource, InteractionId, Key, LayerId, LayerSpec,
    MapEngine, OverlayChange, OverlayId, OverlaySpec, Sketch, TileGrid, ViewConfig,
};
use crate::error::ViewerError;
use crate::props::{ActiveTool, RefreshMode, ViewerEvent, ViewerProps};
use crate::sources::{
    self, ExternalSource, dynamic_overlay_params, selection_overlay_params, tile_url_template,
};
use crate::tooltip::FeatureTooltip;

pub const DYNAMIC_OVERLAY_NAME: &str = "MapGuide Dynamic Overlay";
pub const SELECTION_OVERLAY_NAME: &str = "MapGuide Selection Overlay";

/// Returns the layers a selection may hit. `None` means all layers.
type LayerProvider = Box<dyn Fn() -> Option<Vec<String>>>;

enum SelectionJob {
    Geometry {
        wkt: String,
        layers: Option<Vec<String>>,
        persist: bool,
    },
    Filter(String),
}

struct Layers {
    overlay: LayerId,
    selection: LayerId,
    /// External base layers by title, bottom first.
    base: Vec<(String, LayerId)>,
}

fn gestures_for(tool: ActiveTool) -> Gestures {
    match tool {
        ActiveTool::Pan => Gestures::DRAG_PAN,
        ActiveTool::Zoom | ActiveTool::Select => Gestures::DRAG_BOX,
        ActiveTool::None => Gestures::empty(),
    }
}

pub struct MapViewer<E: MapEngine> {
    engine: RefCell<E>,
    agent: Rc<dyn MapAgent>,
    map: RuntimeMap,
    scales: ScaleConverter,
    extent: Bounds,
    resolutions: Vec<f64>,
    layers: Layers,
    props: RefCell<ViewerProps>,
    events: Rc<RefCell<EventBus<ViewerEvent>>>,
    busy: BusyCounter,
    /// Set when a view was applied from props; the next move end is ours.
    suppress_move_end: Cell<bool>,
    digitizer: RefCell<Digitizer>,
    prompt: RefCell<PromptTooltip>,
    tooltip: RefCell<FeatureTooltip>,
    visibility_refresh: RefCell<Debouncer<()>>,
    pending: RefCell<VecDeque<SelectionJob>>,
    selection_sequence: RequestSequence,
    refresh_counter: Cell<u64>,
    selectable_layers: RefCell<Option<LayerProvider>>,
}

impl<E: MapEngine> MapViewer<E> {
    /// Builds the layer stack for `map` and requests a zoom to its extent.
    ///
    /// Fails before touching the engine when an external base layer names an
    /// unknown provider.
    pub fn new(
        mut engine: E,
        agent: Rc<dyn MapAgent>,
        map: RuntimeMap,
        props: ViewerProps,
    ) -> Result<Self, ViewerError> {
        let externals = props
            .external_base_layers
            .iter()
            .map(|layer| ExternalSource::from_layer(layer).map(|source| (layer, source)))
            .collect::<Result<Vec<_>, _>>()?;

        let scales = ScaleConverter::new(map.display_dpi, map.coordinate_system.meters_per_unit);
        let extent = map.extent();
        let resolutions = sources::resolutions(&map, &scales);
        let projection = sources::projection(&map);
        engine.configure_view(&ViewConfig {
            projection: projection.clone(),
            resolutions: resolutions.clone(),
        });

        let base = externals
            .into_iter()
            .map(|(layer, source)| {
                debug!(name = %layer.name, kind = %source.kind, "adding external base layer");
                let id = engine.add_layer(LayerSpec::External {
                    title: layer.name.clone(),
                    source,
                    visible: layer.visible,
                });
                (layer.name.clone(), id)
            })
            .collect();

        let grid = TileGrid {
            origin: extent.top_left(),
            resolutions: resolutions.clone(),
            tile_size: map.tile_size(),
        };
        let z_origin = resolutions.len() as i64 - 1;
        let tiles: Vec<LayerSpec> = map
            .tiled_groups()
            .map(|group| LayerSpec::Tile {
                name: group.name.clone(),
                grid: grid.clone(),
                url: tile_url_template(agent.as_ref(), &map, &group.name, z_origin),
                projection: projection.clone(),
            })
            .collect();
        for spec in tiles.into_iter().rev() {
            engine.add_layer(spec);
        }

        let image = |params| ImageSource {
            url: agent.agent_url().to_string(),
            extent,
            projection: projection.clone(),
            meters_per_unit: map.coordinate_system.meters_per_unit,
            params,
        };
        let overlay = engine.add_layer(LayerSpec::Image {
            name: DYNAMIC_OVERLAY_NAME.into(),
            source: image(dynamic_overlay_params(&map, &props.image_format)),
        });
        let selection = engine.add_layer(LayerSpec::Image {
            name: SELECTION_OVERLAY_NAME.into(),
            source: image(selection_overlay_params(&map, &props.selection_color)),
        });

        engine.set_gestures(gestures_for(props.tool));
        let prompt = PromptTooltip::new(&mut engine);
        let tooltip = FeatureTooltip::new(&mut engine, props.feature_tooltips_enabled);

        let events = Rc::new(RefCell::new(EventBus::new()));
        let busy = BusyCounter::with_listener({
            let events = Rc::clone(&events);
            move |count| events.borrow_mut().emit(ViewerEvent::BusyChanged(count))
        });

        let viewer = Self {
            engine: RefCell::new(engine),
            agent,
            map,
            scales,
            extent,
            resolutions,
            layers: Layers {
                overlay,
                selection,
                base,
            },
            visibility_refresh: RefCell::new(Debouncer::new(props.state_change_debounce)),
            props: RefCell::new(props),
            events,
            busy,
            suppress_move_end: Cell::new(false),
            digitizer: RefCell::new(Digitizer::default()),
            prompt: RefCell::new(prompt),
            tooltip: RefCell::new(tooltip),
            pending: RefCell::new(VecDeque::new()),
            selection_sequence: RequestSequence::new(),
            refresh_counter: Cell::new(0),
            selectable_layers: RefCell::new(None),
        };
        viewer.request_zoom(ViewTarget::Bounds(viewer.extent));
        Ok(viewer)
    }

    pub fn map(&self) -> &RuntimeMap {
        &self.map
    }

    pub fn engine(&self) -> Ref<'_, E> {
        self.engine.borrow()
    }

    pub fn props(&self) -> Ref<'_, ViewerProps> {
        self.props.borrow()
    }

    pub fn busy(&self) -> &BusyCounter {
        &self.busy
    }

    pub fn drain_events(&self) -> Vec<ViewerEvent> {
        self.events.borrow_mut().drain()
    }

    pub fn set_selectable_layers_provider(
        &self,
        provider: impl Fn() -> Option<Vec<String>> + 'static,
    ) {
        *self.selectable_layers.borrow_mut() = Some(Box::new(provider));
    }

    fn selectable_layers(&self) -> Option<Vec<String>> {
        self.selectable_layers.borrow().as_ref().and_then(|f| f())
    }

    fn emit(&self, event: ViewerEvent) {
        self.events.borrow_mut().emit(event);
    }

    fn request_zoom(&self, target: ViewTarget) {
        self.emit(ViewerEvent::ZoomToViewRequested(target));
    }

    // ----- view -----

    pub fn meters_per_unit(&self) -> f64 {
        self.scales.meters_per_unit
    }

    pub fn scale_to_resolution(&self, scale: f64) -> f64 {
        self.scales.to_resolution(scale)
    }

    pub fn resolution_to_scale(&self, resolution: f64) -> f64 {
        self.scales.to_scale(resolution)
    }

    pub fn scale_for_extent(&self, bounds: &Bounds) -> f64 {
        self.scales
            .scale_for_extent(bounds, self.engine.borrow().size())
    }

    pub fn current_view(&self) -> Option<MapView> {
        let engine = self.engine.borrow();
        let center = engine.center()?;
        let resolution = engine.resolution()?;
        MapView::new(center.x, center.y, self.scales.to_scale(resolution)).ok()
    }

    pub fn current_extent(&self) -> Option<Bounds> {
        let engine = self.engine.borrow();
        let center = engine.center()?;
        let resolution = engine.resolution()?;
        let (w, h) = engine.size();
        let (dx, dy) = (w * resolution / 2.0, h * resolution / 2.0);
        Some(Bounds::new(
            center.x - dx,
            center.y - dy,
            center.x + dx,
            center.y + dy,
        ))
    }

    /// Moves the engine directly. No view request is emitted here; the
    /// resulting move end reports the new view.
    pub fn zoom_to_view(&self, x: f64, y: f64, scale: f64) {
        let mut engine = self.engine.borrow_mut();
        engine.set_center(Coord { x, y });
        engine.set_resolution(self.scales.to_resolution(scale));
    }

    /// Fits the engine to `extent`; the resulting move end reports the view.
    pub fn zoom_to_extent(&self, extent: Bounds) {
        self.engine.borrow_mut().fit(&extent);
    }

    pub fn zoom_delta(&self, delta: f64) {
        let mut engine = self.engine.borrow_mut();
        let Some(current) = engine.resolution() else {
            return;
        };
        let next = sources::constrain_resolution(&self.resolutions, current, delta);
        engine.set_resolution(next);
    }

    pub fn initial_view(&self) {
        self.request_zoom(ViewTarget::Bounds(self.extent));
    }

    fn apply_view(&self, engine: &mut E, target: ViewTarget) {
        match target {
            ViewTarget::Bounds(bounds) => {
                self.suppress_move_end.set(true);
                engine.fit(&bounds);
            }
            ViewTarget::View(view) => {
                if !(view.scale.is_finite() && view.scale > 0.0) {
                    warn!(scale = view.scale, "Ignoring view with a non-positive scale");
                    return;
                }
                if are_views_close_to_equal(self.view_of(engine).as_ref(), Some(&view)) {
                    info!("Skipping zoomToView as next/current views are close enough");
                    return;
                }
                self.suppress_move_end.set(true);
                engine.set_center(Coord {
                    x: view.x,
                    y: view.y,
                });
                engine.set_resolution(self.scales.to_resolution(view.scale));
            }
        }
    }

    fn view_of(&self, engine: &E) -> Option<MapView> {
        let center = engine.center()?;
        let resolution = engine.resolution()?;
        MapView::new(center.x, center.y, self.scales.to_scale(resolution)).ok()
    }

    // ----- tools and tooltips -----

    pub fn active_tool(&self) -> ActiveTool {
        self.props.borrow().tool
    }

    pub fn is_feature_tooltip_enabled(&self) -> bool {
        self.tooltip.borrow().is_enabled()
    }

    pub fn set_feature_tooltip_enabled(&self, enabled: bool) {
        let mut engine = self.engine.borrow_mut();
        self.tooltip.borrow_mut().set_enabled(&mut *engine, enabled);
    }

    // ----- props -----

    /// Applies the difference between the current props and `next`.
    pub fn update_props(&self, next: ViewerProps, now: Time) {
        let prev = self.props.replace(next.clone());
        let mut engine = self.engine.borrow_mut();

        if next.image_format != prev.image_format {
            warn!("Unsupported change of props: imageFormat");
        }
        if !next.selection_color.is_empty() && next.selection_color != prev.selection_color {
            engine.update_params(
                self.layers.selection,
                &[("SELECTIONCOLOR", next.selection_color.clone())],
            );
        }
        if next.feature_tooltips_enabled != prev.feature_tooltips_enabled {
            self.tooltip
                .borrow_mut()
                .set_enabled(&mut *engine, next.feature_tooltips_enabled);
        }
        if !next.external_base_layers.is_empty() {
            for (title, id) in &self.layers.base {
                let mut matches = next.external_base_layers.iter().filter(|l| &l.name == title);
                let visible = match (matches.next(), matches.next()) {
                    (Some(layer), None) => layer.visible,
                    _ => false,
                };
                engine.set_layer_visible(*id, visible);
            }
        }
        if next.tool != prev.tool {
            engine.set_gestures(gestures_for(next.tool));
        }
        if next.state_change_debounce != prev.state_change_debounce {
            self.visibility_refresh
                .borrow_mut()
                .set_window(next.state_change_debounce);
        }
        if next.layer_group_visibility != prev.layer_group_visibility {
            self.visibility_refresh.borrow_mut().schedule(now, ());
        }
        if next.view != prev.view {
            match next.view {
                Some(target) => self.apply_view(&mut engine, target),
                None => info!("Skipping zoomToView as target view is null"),
            }
        }
    }

    fn refresh_on_state_change(&self) {
        let visibility = self
            .props
            .borrow()
            .layer_group_visibility
            .clone()
            .unwrap_or_default();
        self.engine
            .borrow_mut()
            .update_params(self.layers.overlay, &visibility.to_params());
    }

    /// Forces the overlays named by `mode` to reload.
    pub fn refresh(&self, mode: RefreshMode) {
        let seq = self.refresh_counter.get() + 1;
        self.refresh_counter.set(seq);
        let mut engine = self.engine.borrow_mut();
        if mode.contains(RefreshMode::LAYERS_ONLY) {
            engine.update_params(self.layers.overlay, &[("seq", seq.to_string())]);
        }
        if mode.contains(RefreshMode::SELECTION_ONLY) {
            engine.update_params(self.layers.selection, &[("seq", seq.to_string())]);
        }
    }

    // ----- engine events -----

    pub fn handle_event(&self, event: EngineEvent, now: Time) {
        match event {
            EngineEvent::PointerMove { coordinate, .. } => {
                self.emit(ViewerEvent::MouseCoordinateChanged(coordinate));
                {
                    let mut engine = self.engine.borrow_mut();
                    self.prompt.borrow().on_pointer_move(&mut *engine, coordinate);
                }
                let mut tooltip = self.tooltip.borrow_mut();
                if tooltip.is_enabled() {
                    tooltip.hover().schedule(now, coordinate);
                }
            }
            EngineEvent::MouseOut => {
                let mut engine = self.engine.borrow_mut();
                self.prompt.borrow().on_mouse_out(&mut *engine);
            }
            EngineEvent::Click { pixel, .. } => self.on_click(pixel),
            EngineEvent::BoxEnd { extent } => match self.active_tool() {
                ActiveTool::Zoom => self.request_zoom(ViewTarget::Bounds(extent)),
                ActiveTool::Select => {
                    self.queue_selection(Geometry::Polygon(extent.to_polygon()), true)
                }
                ActiveTool::Pan | ActiveTool::None => {}
            },
            EngineEvent::MoveEnd => {
                if self.suppress_move_end.replace(false) {
                    info!("Triggering zoom request on moveend suppressed");
                } else if let Some(view) = self.current_view() {
                    self.request_zoom(ViewTarget::View(view));
                }
            }
            EngineEvent::KeyDown(Key::Escape) => {
                self.cancel_digitization();
            }
            EngineEvent::ImageLoadStart(id) if self.is_overlay(id) => self.busy.increment(),
            EngineEvent::ImageLoadEnd(id) | EngineEvent::ImageLoadError(id)
                if self.is_overlay(id) =>
            {
                self.busy.decrement()
            }
            EngineEvent::DrawEnd {
                interaction,
                sketch,
            } => self.on_draw_end(interaction, sketch),
            _ => {}
        }
    }

    fn is_overlay(&self, id: LayerId) -> bool {
        id == self.layers.overlay || id == self.layers.selection
    }

    fn on_click(&self, pixel: [f64; 2]) {
        if self.is_digitizing() || self.active_tool() != ActiveTool::Select {
            return;
        }
        let buffer = f64::from(self.props.borrow().point_selection_buffer);
        let corners = {
            let engine = self.engine.borrow();
            engine
                .coordinate_from_pixel([pixel[0] - buffer, pixel[1] - buffer])
                .zip(engine.coordinate_from_pixel([pixel[0] + buffer, pixel[1] + buffer]))
        };
        if let Some((a, b)) = corners {
            let bounds = Bounds::from_corners(a, b);
            self.queue_selection(Geometry::Polygon(bounds.to_polygon()), false);
        }
    }

    // ----- timed and network work -----

    /// Earliest time at which [`MapViewer::tick`] has debounced work to do.
    pub fn next_deadline(&self) -> Option<Time> {
        let hover = self.tooltip.borrow_mut().hover().deadline();
        let refresh = self.visibility_refresh.borrow().deadline();
        match (hover, refresh) {
            (Some(a), Some(b)) => Some(if a <= b { a } else { b }),
            (a, b) => a.or(b),
        }
    }

    /// Fires due debounced work, then runs queued selection queries.
    pub async fn tick(&self, now: Time) {
        if self.visibility_refresh.borrow_mut().poll(now).is_some() {
            self.refresh_on_state_change();
        }
        let hover = self.tooltip.borrow_mut().hover().poll(now);
        if let Some(coordinate) = hover {
            self.send_tooltip_query(coordinate).await;
        }
        self.run_pending().await;
    }

    pub async fn run_pending(&self) {
        loop {
            let job = self.pending.borrow_mut().pop_front();
            let Some(job) = job else {
                break;
            };
            self.run_selection(job).await;
        }
    }

    /// Cancels debounced work and drops queued queries.
    pub fn teardown(&self) {
        self.visibility_refresh.borrow_mut().cancel();
        self.tooltip.borrow_mut().hover().cancel();
        self.pending.borrow_mut().clear();
        self.cancel_digitization();
    }

    async fn send_tooltip_query(&self, coordinate: Coord<f64>) {
        if !self.is_feature_tooltip_enabled() {
            return;
        }
        let seq = {
            let mut engine = self.engine.borrow_mut();
            self.tooltip.borrow().begin_query(&mut *engine, coordinate)
        };
        let mut request = QueryMapFeaturesRequest::new(self.map.name.clone(), self.map.session_id.clone());
        request.geometry = Some(point_wkt(coordinate));
        request.selectionvariant = Some(SelectionVariant::Intersects);
        request.maxfeatures = 1;
        request.requestdata = QueryFeatureFlags::TOOLTIP | QueryFeatureFlags::HYPERLINK;

        let _busy = self.busy.enter();
        match self.agent.query_map_features(&request).await {
            Ok(response) => {
                let mut engine = self.engine.borrow_mut();
                if !self
                    .tooltip
                    .borrow()
                    .show(&mut *engine, seq, response.tooltip_html())
                {
                    debug!("discarding stale tooltip response");
                }
            }
            Err(err) => debug!("tooltip query failed: {err}"),
        }
    }

    // ----- selection -----

    pub async fn set_selection_xml(&self, xml: &str) {
        self.run_selection(SelectionJob::Filter(xml.to_string()))
            .await;
    }

    /// Persisted selection of the selectable layers intersecting `geometry`.
    pub async fn select_by_geometry(&self, geometry: &Geometry<f64>) {
        let layers = self.selectable_layers();
        if layers.as_ref().is_some_and(|l| l.is_empty()) {
            debug!("no selectable layers; skipping selection query");
            return;
        }
        self.run_selection(SelectionJob::Geometry {
            wkt: to_wkt(geometry),
            layers,
            persist: true,
        })
        .await;
    }

    /// Clears the selection on the next [`MapViewer::run_pending`].
    pub fn clear_selection(&self) {
        self.pending
            .borrow_mut()
            .push_back(SelectionJob::Filter(String::new()));
    }

    fn queue_selection(&self, geometry: Geometry<f64>, persist: bool) {
        let layers = self.selectable_layers();
        if layers.as_ref().is_some_and(|l| l.is_empty()) {
            debug!("no selectable layers; skipping selection query");
            return;
        }
        self.pending.borrow_mut().push_back(SelectionJob::Geometry {
            wkt: to_wkt(&geometry),
            layers,
            persist,
        });
    }

    fn selection_request(&self, job: SelectionJob) -> QueryMapFeaturesRequest {
        let props = self.props.borrow();
        let mut request = QueryMapFeaturesRequest::new(self.map.name.clone(), self.map.session_id.clone());
        request.selectioncolor = Some(props.selection_color.clone());
        request.selectionformat = Some(props.selection_image_format.clone());
        request.requestdata = QueryFeatureFlags::ATTRIBUTES | QueryFeatureFlags::INLINE_SELECTION;
        match job {
            SelectionJob::Geometry {
                wkt,
                layers,
                persist,
            } => {
                request.geometry = Some(wkt);
                request.layernames = layers.map(|l| l.join(","));
                request.persist = persist;
                request.selectionvariant = Some(SelectionVariant::Intersects);
            }
            SelectionJob::Filter(xml) => {
                request.persist = true;
                request.featurefilter = Some(xml);
            }
        }
        request
    }

    /// Only a persisted query replaces the selection the host knows about.
    async fn run_selection(&self, job: SelectionJob) {
        let request = self.selection_request(job);
        let seq = request.persist.then(|| self.selection_sequence.issue());

        let _busy = self.busy.enter();
        match self.agent.query_map_features(&request).await {
            Ok(response) => {
                self.refresh(RefreshMode::SELECTION_ONLY);
                match seq {
                    Some(seq) if self.selection_sequence.is_current(seq) => {
                        self.emit(ViewerEvent::SelectionChanged(Box::new(response)));
                    }
                    Some(_) => debug!("discarding stale selection response"),
                    None => {}
                }
            }
            Err(err) => warn!("selection query failed: {err}"),
        }
    }

    // ----- digitizing -----

    pub fn is_digitizing(&self) -> bool {
        self.digitizer.borrow().is_active()
    }

    /// Starts sketching a `kind` geometry, replacing any sketch in progress.
    /// `handler` runs once with the finished geometry; it never runs if the
    /// sketch is cancelled or replaced.
    pub fn digitize(
        &self,
        kind: DigitizeKind,
        prompt: Option<&str>,
        handler: impl FnOnce(Sketch) + 'static,
    ) -> InteractionId {
        let mut engine = self.engine.borrow_mut();
        let mut tip = self.prompt.borrow_mut();
        tip.clear(&mut *engine);
        let id = self
            .digitizer
            .borrow_mut()
            .begin(&mut *engine, kind, Box::new(handler));
        tip.set_text(&mut *engine, prompt.unwrap_or(kind.default_prompt()));
        id
    }

    pub fn digitize_point(&self, prompt: Option<&str>, handler: impl FnOnce(Point<f64>) + 'static) {
        self.digitize(DigitizeKind::Point, prompt, move |sketch| match sketch {
            Sketch::Point(c) => handler(Point(c)),
            other => warn!("expected a point, got {other:?}"),
        });
    }

    pub fn digitize_line(&self, prompt: Option<&str>, handler: impl FnOnce(LineString<f64>) + 'static) {
        self.digitize(DigitizeKind::Line, prompt, move |sketch| match sketch {
            Sketch::LineString(line) => handler(line),
            other => warn!("expected a line, got {other:?}"),
        });
    }

    pub fn digitize_line_string(
        &self,
        prompt: Option<&str>,
        handler: impl FnOnce(LineString<f64>) + 'static,
    ) {
        self.digitize(DigitizeKind::LineString, prompt, move |sketch| match sketch {
            Sketch::LineString(line) => handler(line),
            other => warn!("expected a line string, got {other:?}"),
        });
    }

    pub fn digitize_circle(&self, prompt: Option<&str>, handler: impl FnOnce(Circle) + 'static) {
        self.digitize(DigitizeKind::Circle, prompt, move |sketch| match sketch {
            Sketch::Circle(circle) => handler(circle),
            other => warn!("expected a circle, got {other:?}"),
        });
    }

    pub fn digitize_rectangle(&self, prompt: Option<&str>, handler: impl FnOnce(Polygon<f64>) + 'static) {
        self.digitize(DigitizeKind::Rectangle, prompt, move |sketch| match sketch {
            Sketch::Polygon(polygon) => handler(polygon),
            other => warn!("expected a rectangle, got {other:?}"),
        });
    }

    pub fn digitize_polygon(&self, prompt: Option<&str>, handler: impl FnOnce(Polygon<f64>) + 'static) {
        self.digitize(DigitizeKind::Polygon, prompt, move |sketch| match sketch {
            Sketch::Polygon(polygon) => handler(polygon),
            other => warn!("expected a polygon, got {other:?}"),
        });
    }

    pub fn cancel_digitization(&self) {
        let mut engine = self.engine.borrow_mut();
        if self.digitizer.borrow_mut().cancel(&mut *engine) {
            self.prompt.borrow_mut().clear(&mut *engine);
        }
    }

    fn on_draw_end(&self, interaction: InteractionId, sketch: Sketch) {
        let finished = {
            let mut engine = self.engine.borrow_mut();
            let finished = self
                .digitizer
                .borrow_mut()
                .finish(&mut *engine, interaction, sketch);
            if finished.is_some() {
                self.prompt.borrow_mut().clear(&mut *engine);
            }
            finished
        };
        if let Some((callback, sketch)) = finished {
            callback(sketch);
        }
    }

    // ----- primitives for interaction modes layered on the viewer -----

    pub fn add_layer(&self, spec: LayerSpec) -> LayerId {
        self.engine.borrow_mut().add_layer(spec)
    }

    pub fn set_layer_visible(&self, id: LayerId, visible: bool) {
        self.engine.borrow_mut().set_layer_visible(id, visible);
    }

    pub fn clear_features(&self, id: LayerId) {
        self.engine.borrow_mut().clear_features(id);
    }

    pub fn add_overlay(&self, spec: OverlaySpec) -> OverlayId {
        self.engine.borrow_mut().add_overlay(spec)
    }

    pub fn update_overlay(&self, id: OverlayId, change: OverlayChange) {
        self.engine.borrow_mut().update_overlay(id, change);
    }

    pub fn remove_overlay(&self, id: OverlayId) {
        self.engine.borrow_mut().remove_overlay(id);
    }

    pub fn add_interaction(&self, spec: DrawSpec) -> InteractionId {
        self.engine.borrow_mut().add_interaction(spec)
    }

    pub fn remove_interaction(&self, id: InteractionId) {
        self.engine.borrow_mut().remove_interaction(id);
    }
}

impl<E: MapEngine> ViewerHandle for MapViewer<E> {
    fn zoom_delta(&self, delta: f64) {
        MapViewer::zoom_delta(self, delta);
    }

    fn initial_view(&self) {
        MapViewer::initial_view(self);
    }

    fn clear_selection(&self) {
        MapViewer::clear_selection(self);
    }

    fn refresh_map(&self) {
        self.refresh(RefreshMode::all());
    }

    fn is_digitizing(&self) -> bool {
        MapViewer::is_digitizing(self)
    }
}
