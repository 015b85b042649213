//! Planar geometry helpers over `geo` types.

use std::fmt::Write as _;

use geo::{Area, Coord, Geometry, InteriorPoint, LineString, Point, Polygon};

/// A circle in map units. `geo` has no circle primitive, so digitized circles
/// are carried as center + radius.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Circle {
    pub center: Coord<f64>,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Coord<f64>, radius: f64) -> Self {
        Self {
            center,
            radius: radius.abs(),
        }
    }

    /// Regular polygon approximation with `segments` sides.
    pub fn to_polygon(&self, segments: usize) -> Polygon<f64> {
        let segments = segments.max(3);
        let mut ring: Vec<Coord<f64>> = (0..segments)
            .map(|i| {
                let a = (i as f64) * std::f64::consts::TAU / (segments as f64);
                Coord {
                    x: self.center.x + self.radius * a.cos(),
                    y: self.center.y + self.radius * a.sin(),
                }
            })
            .collect();
        ring.push(ring[0]);
        Polygon::new(LineString::new(ring), vec![])
    }
}

pub fn planar_length(line: &LineString<f64>) -> f64 {
    line.lines()
        .map(|l| {
            let d = l.delta();
            d.x.hypot(d.y)
        })
        .sum()
}

pub fn planar_area(polygon: &Polygon<f64>) -> f64 {
    polygon.unsigned_area()
}

/// A point guaranteed to lie inside the polygon, when one exists.
pub fn interior_point(polygon: &Polygon<f64>) -> Option<Coord<f64>> {
    polygon.interior_point().map(|p| p.0)
}

pub fn last_coordinate(line: &LineString<f64>) -> Option<Coord<f64>> {
    line.0.last().copied()
}

/// Well-known text for a geometry, as sent in map feature queries.
pub fn to_wkt(geom: &Geometry<f64>) -> String {
    let mut out = String::new();
    write_geometry(&mut out, geom);
    out
}

pub fn point_wkt(c: Coord<f64>) -> String {
    to_wkt(&Geometry::Point(Point(c)))
}

fn write_geometry(out: &mut String, geom: &Geometry<f64>) {
    match geom {
        Geometry::Point(p) => {
            out.push_str("POINT (");
            write_coord(out, p.0);
            out.push(')');
        }
        Geometry::Line(l) => {
            out.push_str("LINESTRING ");
            write_coords(out, &[l.start, l.end]);
        }
        Geometry::LineString(ls) => {
            out.push_str("LINESTRING ");
            write_coords(out, &ls.0);
        }
        Geometry::Polygon(p) => {
            out.push_str("POLYGON ");
            write_polygon_body(out, p);
        }
        Geometry::MultiPoint(mp) => {
            out.push_str("MULTIPOINT ");
            let coords: Vec<Coord<f64>> = mp.0.iter().map(|p| p.0).collect();
            write_coords(out, &coords);
        }
        Geometry::MultiLineString(mls) => {
            out.push_str("MULTILINESTRING (");
            for (i, ls) in mls.0.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_coords(out, &ls.0);
            }
            out.push(')');
        }
        Geometry::MultiPolygon(mp) => {
            out.push_str("MULTIPOLYGON (");
            for (i, p) in mp.0.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_polygon_body(out, p);
            }
            out.push(')');
        }
        Geometry::Rect(r) => write_geometry(out, &Geometry::Polygon(r.to_polygon())),
        Geometry::Triangle(t) => write_geometry(out, &Geometry::Polygon(t.to_polygon())),
        Geometry::GeometryCollection(gc) => {
            out.push_str("GEOMETRYCOLLECTION (");
            for (i, g) in gc.0.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_geometry(out, g);
            }
            out.push(')');
        }
    }
}

fn write_polygon_body(out: &mut String, p: &Polygon<f64>) {
    out.push('(');
    write_coords(out, &p.exterior().0);
    for interior in p.interiors() {
        out.push_str(", ");
        write_coords(out, &interior.0);
    }
    out.push(')');
}

fn write_coords(out: &mut String, coords: &[Coord<f64>]) {
    out.push('(');
    for (i, c) in coords.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_coord(out, *c);
    }
    out.push(')');
}

fn write_coord(out: &mut String, c: Coord<f64>) {
    let _ = write!(out, "{} {}", c.x, c.y);
}
