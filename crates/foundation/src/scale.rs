//! Display scale <-> map resolution conversions.
//!
//! All functions are pure. `resolution` is map units per pixel; `scale` is the
//! display scale denominator (1:scale).

use crate::bounds::Bounds;

/// Inches in one meter, as used by the server's scale calculations.
pub const INCHES_PER_METER: f64 = 39.37;
/// Meters in one inch.
pub const METERS_PER_INCH: f64 = 0.0254;

pub fn inches_per_unit(meters_per_unit: f64) -> f64 {
    INCHES_PER_METER * meters_per_unit
}

pub fn meters_per_unit_from_inches(inches_per_unit: f64) -> f64 {
    inches_per_unit / INCHES_PER_METER
}

pub fn scale_to_resolution(scale: f64, dpi: f64, meters_per_unit: f64) -> f64 {
    scale / inches_per_unit(meters_per_unit) / dpi
}

pub fn resolution_to_scale(resolution: f64, dpi: f64, meters_per_unit: f64) -> f64 {
    resolution * dpi * inches_per_unit(meters_per_unit)
}

/// Display scale at which `bounds` exactly fits a viewport of
/// `viewport_size` pixels.
///
/// The limiting axis is chosen by aspect ratio: width-limited when
/// `viewport_h * bounds_w > viewport_w * bounds_h`, height-limited otherwise.
pub fn scale_for_extent(
    bounds: &Bounds,
    viewport_size: (f64, f64),
    dpi: f64,
    meters_per_unit: f64,
) -> f64 {
    let (dev_w, dev_h) = viewport_size;
    let mcs_w = bounds.width();
    let mcs_h = bounds.height();
    let meters_per_pixel = METERS_PER_INCH / dpi;
    if is_width_limited(bounds, viewport_size) {
        mcs_w * meters_per_unit / (dev_w * meters_per_pixel)
    } else {
        mcs_h * meters_per_unit / (dev_h * meters_per_pixel)
    }
}

pub fn is_width_limited(bounds: &Bounds, viewport_size: (f64, f64)) -> bool {
    let (dev_w, dev_h) = viewport_size;
    dev_h * bounds.width() > dev_w * bounds.height()
}

/// Resolution/scale converter bound to one map's DPI and units.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScaleConverter {
    pub dpi: f64,
    pub meters_per_unit: f64,
}

impl ScaleConverter {
    pub fn new(dpi: f64, meters_per_unit: f64) -> Self {
        Self {
            dpi,
            meters_per_unit,
        }
    }

    pub fn to_resolution(&self, scale: f64) -> f64 {
        scale_to_resolution(scale, self.dpi, self.meters_per_unit)
    }

    pub fn to_scale(&self, resolution: f64) -> f64 {
        resolution_to_scale(resolution, self.dpi, self.meters_per_unit)
    }

    pub fn scale_for_extent(&self, bounds: &Bounds, viewport_size: (f64, f64)) -> f64 {
        scale_for_extent(bounds, viewport_size, self.dpi, self.meters_per_unit)
    }
}
