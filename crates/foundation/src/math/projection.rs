use std::collections::BTreeMap;

use geo::Coord;

use super::geodesy::WGS84_A;

/// How coordinates of a registered projection map back to longitude/latitude.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProjectionKind {
    /// Coordinates are already longitude/latitude degrees.
    Geographic,
    /// Spherical (web) mercator meters.
    SphericalMercator,
    /// Known to the table but not invertible locally.
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionDef {
    pub epsg: String,
    pub proj4: String,
    pub kind: ProjectionKind,
}

/// Local table of coordinate system definitions, keyed by EPSG code.
///
/// Seeded with EPSG:4326 and EPSG:3857. Codes missing from the table must be
/// resolved externally and registered before a map using them is shown.
#[derive(Debug, Clone)]
pub struct ProjectionTable {
    defs: BTreeMap<String, ProjectionDef>,
}

impl Default for ProjectionTable {
    fn default() -> Self {
        let mut table = Self {
            defs: BTreeMap::new(),
        };
        table.register("4326", "+proj=longlat +datum=WGS84 +no_defs");
        table.register(
            "3857",
            "+proj=merc +a=6378137 +b=6378137 +lat_ts=0.0 +lon_0=0.0 +x_0=0.0 +y_0=0 +k=1.0 +units=m +nadgrids=@null +wktext +no_defs",
        );
        table
    }
}

impl ProjectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self, epsg: &str) -> bool {
        self.defs.contains_key(epsg)
    }

    /// Inserts or replaces the definition for `epsg`.
    pub fn register(&mut self, epsg: impl Into<String>, proj4: impl Into<String>) {
        let epsg = epsg.into();
        let proj4 = proj4.into();
        let kind = classify_proj4(&proj4);
        self.defs.insert(
            epsg.clone(),
            ProjectionDef { epsg, proj4, kind },
        );
    }

    pub fn get(&self, epsg: &str) -> Option<&ProjectionDef> {
        self.defs.get(epsg)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Converts a map coordinate in `epsg` to longitude/latitude degrees.
    ///
    /// Returns `None` for unknown codes or projections that cannot be
    /// inverted locally.
    pub fn to_geographic(&self, epsg: &str, c: Coord<f64>) -> Option<Coord<f64>> {
        let def = self.defs.get(epsg)?;
        match def.kind {
            ProjectionKind::Geographic => Some(c),
            ProjectionKind::SphericalMercator => Some(Coord {
                x: inverse_mercator_lon_deg(c.x),
                y: inverse_mercator_lat_deg(c.y),
            }),
            ProjectionKind::Other => None,
        }
    }

    pub fn can_invert(&self, epsg: &str) -> bool {
        self.defs
            .get(epsg)
            .is_some_and(|d| d.kind != ProjectionKind::Other)
    }
}

fn classify_proj4(proj4: &str) -> ProjectionKind {
    let has = |token: &str| proj4.split_whitespace().any(|t| t == token);
    if has("+proj=longlat") || has("+proj=latlong") {
        ProjectionKind::Geographic
    } else if has("+proj=merc") && has("+a=6378137") && has("+b=6378137") {
        ProjectionKind::SphericalMercator
    } else {
        ProjectionKind::Other
    }
}

pub fn inverse_mercator_lon_deg(x_m: f64) -> f64 {
    (x_m / WGS84_A).to_degrees()
}

pub fn inverse_mercator_lat_deg(y_m: f64) -> f64 {
    let lat = 2.0 * (y_m / WGS84_A).exp().atan() - std::f64::consts::FRAC_PI_2;
    lat.to_degrees()
}

#[cfg(test)]
mod tests {
    use super::{ProjectionKind, ProjectionTable};
    use geo::Coord;

    #[test]
    fn seeded_with_geographic_and_web_mercator() {
        let t = ProjectionTable::new();
        assert!(t.is_registered("4326"));
        assert!(t.is_registered("3857"));
        assert!(!t.is_registered("27700"));
        assert_eq!(t.get("3857").unwrap().kind, ProjectionKind::SphericalMercator);
    }

    #[test]
    fn classifies_registered_definitions() {
        let mut t = ProjectionTable::new();
        t.register("4269", "+proj=longlat +ellps=GRS80 +datum=NAD83 +no_defs");
        t.register("27700", "+proj=tmerc +lat_0=49 +lon_0=-2 +k=0.9996012717 +units=m +no_defs");
        assert_eq!(t.get("4269").unwrap().kind, ProjectionKind::Geographic);
        assert_eq!(t.get("27700").unwrap().kind, ProjectionKind::Other);
        assert!(!t.can_invert("27700"));
        assert!(t.to_geographic("27700", Coord { x: 0.0, y: 0.0 }).is_none());
    }

    #[test]
    fn inverts_web_mercator() {
        let t = ProjectionTable::new();
        let half_world = std::f64::consts::PI * super::WGS84_A;
        let g = t.to_geographic("3857", Coord { x: half_world, y: 0.0 }).unwrap();
        assert!((g.x - 180.0).abs() < 1e-9);
        assert!(g.y.abs() < 1e-9);
    }
}
