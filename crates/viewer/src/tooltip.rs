use geo::Coord;
use runtime::{Debouncer, RequestSequence};

use crate::engine::{MapEngine, OverlayChange, OverlayId, OverlaySpec, Positioning};
use crate::props::FEATURE_TOOLTIP_DEBOUNCE;

/// Hover tooltip fed by debounced feature queries.
///
/// Responses are tagged; one that arrives after a newer query was issued is
/// dropped.
pub struct FeatureTooltip {
    overlay: OverlayId,
    enabled: bool,
    hover: Debouncer<Coord<f64>>,
    sequence: RequestSequence,
}

impl FeatureTooltip {
    pub fn new(engine: &mut dyn MapEngine, enabled: bool) -> Self {
        let overlay = engine.add_overlay(OverlaySpec {
            class: "feature-tooltip".into(),
            offset: [15.0, 0.0],
            positioning: Positioning::CenterLeft,
        });
        let mut tooltip = Self {
            overlay,
            enabled: true,
            hover: Debouncer::new(FEATURE_TOOLTIP_DEBOUNCE),
            sequence: RequestSequence::new(),
        };
        tooltip.set_enabled(engine, enabled);
        tooltip
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling also empties and hides the tooltip and makes queries in
    /// flight stale.
    pub fn set_enabled(&mut self, engine: &mut dyn MapEngine, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.hover.cancel();
            self.sequence.issue();
            engine.update_overlay(self.overlay, OverlayChange::Html(String::new()));
            engine.update_overlay(self.overlay, OverlayChange::Visible(false));
        }
    }

    pub fn hover(&mut self) -> &mut Debouncer<Coord<f64>> {
        &mut self.hover
    }

    /// Positions the tooltip for a query at `coordinate` and returns its tag.
    pub fn begin_query(&self, engine: &mut dyn MapEngine, coordinate: Coord<f64>) -> u64 {
        engine.update_overlay(self.overlay, OverlayChange::Position(coordinate));
        self.sequence.issue()
    }

    /// Shows `html`, or hides the tooltip when there is nothing to show.
    /// Returns false for a stale response or while disabled.
    pub fn show(&self, engine: &mut dyn MapEngine, seq: u64, html: Option<String>) -> bool {
        if !self.enabled || !self.sequence.is_current(seq) {
            return false;
        }
        let visible = html.is_some();
        engine.update_overlay(self.overlay, OverlayChange::Html(html.unwrap_or_default()));
        engine.update_overlay(self.overlay, OverlayChange::Visible(visible));
        true
    }
}

#[cfg(test)]
mod tests {
    use geo::Coord;

    use super::FeatureTooltip;
    use crate::test_support::FakeEngine;

    fn tooltip_overlay(engine: &FakeEngine) -> &crate::test_support::FakeOverlay {
        engine.overlays_with_class("feature-tooltip")[0]
    }

    #[test]
    fn newer_query_wins() {
        let mut engine = FakeEngine::new();
        let tooltip = FeatureTooltip::new(&mut engine, true);
        let first = tooltip.begin_query(&mut engine, Coord { x: 0.0, y: 0.0 });
        let second = tooltip.begin_query(&mut engine, Coord { x: 1.0, y: 1.0 });

        assert!(!tooltip.show(&mut engine, first, Some("old".into())));
        assert!(tooltip.show(&mut engine, second, Some("new".into())));
        assert_eq!(tooltip_overlay(&engine).html, "new");
        assert!(tooltip_overlay(&engine).visible);
    }

    #[test]
    fn disabling_drops_response_in_flight() {
        let mut engine = FakeEngine::new();
        let mut tooltip = FeatureTooltip::new(&mut engine, true);
        let seq = tooltip.begin_query(&mut engine, Coord { x: 0.0, y: 0.0 });
        tooltip.set_enabled(&mut engine, false);

        assert!(!tooltip.show(&mut engine, seq, Some("late".into())));
        assert!(!tooltip_overlay(&engine).visible);
        assert_eq!(tooltip_overlay(&engine).html, "");

        tooltip.set_enabled(&mut engine, true);
        assert!(!tooltip.show(&mut engine, seq, Some("late".into())));
        assert!(!tooltip_overlay(&engine).visible);
    }
}
