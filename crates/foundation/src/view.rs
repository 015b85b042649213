use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bounds::Bounds;

/// Map center plus display scale. Deserializing validates like [`MapView::new`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMapView")]
pub struct MapView {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewError {
    #[error("view scale must be positive and finite (got {0})")]
    InvalidScale(f64),
}

#[derive(Deserialize)]
struct RawMapView {
    x: f64,
    y: f64,
    scale: f64,
}

impl TryFrom<RawMapView> for MapView {
    type Error = ViewError;

    fn try_from(raw: RawMapView) -> Result<Self, Self::Error> {
        MapView::new(raw.x, raw.y, raw.scale)
    }
}

impl MapView {
    pub fn new(x: f64, y: f64, scale: f64) -> Result<Self, ViewError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ViewError::InvalidScale(scale));
        }
        Ok(Self { x, y, scale })
    }
}

/// A requested view: either a center/scale or a rectangular extent.
///
/// Deserialization is shape driven: a 4-number array is bounds, an object
/// with `x`, `y`, `scale` is a view.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ViewTarget {
    Bounds(Bounds),
    View(MapView),
}

impl ViewTarget {
    pub fn is_bounds(&self) -> bool {
        matches!(self, ViewTarget::Bounds(_))
    }
}

impl From<MapView> for ViewTarget {
    fn from(v: MapView) -> Self {
        ViewTarget::View(v)
    }
}

impl From<Bounds> for ViewTarget {
    fn from(b: Bounds) -> Self {
        ViewTarget::Bounds(b)
    }
}

const NUMBER_EPSILON: f64 = 1e-9;

pub fn are_numbers_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= NUMBER_EPSILON * a.abs().max(b.abs()).max(1.0)
}

pub fn are_views_close_to_equal(a: Option<&MapView>, b: Option<&MapView>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            are_numbers_equal(a.x, b.x)
                && are_numbers_equal(a.y, b.y)
                && are_numbers_equal(a.scale, b.scale)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{MapView, ViewTarget, are_views_close_to_equal};
    use crate::bounds::Bounds;

    #[test]
    fn rejects_non_positive_scale() {
        assert!(MapView::new(0.0, 0.0, 0.0).is_err());
        assert!(MapView::new(0.0, 0.0, -5.0).is_err());
        assert!(MapView::new(0.0, 0.0, f64::NAN).is_err());
        assert!(MapView::new(1.0, 2.0, 5000.0).is_ok());
    }

    #[test]
    fn shape_disambiguates_target() {
        let t: ViewTarget = serde_json::from_str("[0, 0, 10, 10]").unwrap();
        assert_eq!(t, ViewTarget::Bounds(Bounds::new(0.0, 0.0, 10.0, 10.0)));

        let t: ViewTarget = serde_json::from_str(r#"{"x":1,"y":2,"scale":500}"#).unwrap();
        assert!(!t.is_bounds());
    }

    #[test]
    fn deserializing_rejects_bad_scale() {
        assert!(serde_json::from_str::<ViewTarget>(r#"{"x":1,"y":2,"scale":-5}"#).is_err());
        assert!(serde_json::from_str::<ViewTarget>(r#"{"x":1,"y":2,"scale":0}"#).is_err());
        assert!(serde_json::from_str::<MapView>(r#"{"x":1,"y":2,"scale":-5}"#).is_err());
        let view: MapView = serde_json::from_str(r#"{"x":1,"y":2,"scale":250}"#).unwrap();
        assert_eq!(view, MapView::new(1.0, 2.0, 250.0).unwrap());
    }

    #[test]
    fn close_views_compare_equal() {
        let a = MapView::new(100.0, 200.0, 5000.0).unwrap();
        let b = MapView::new(100.0 + 1e-12, 200.0, 5000.0).unwrap();
        assert!(are_views_close_to_equal(Some(&a), Some(&b)));
        assert!(!are_views_close_to_equal(Some(&a), None));
        assert!(are_views_close_to_equal(None, None));
    }
}
