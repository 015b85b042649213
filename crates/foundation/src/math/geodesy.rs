use geo::Coord;

/// WGS84 semi-major axis (meters). Used as the sphere radius for geodesic
/// measurement.
pub const WGS84_A: f64 = 6_378_137.0;

/// Great-circle distance in meters between two geographic coordinates
/// (`x` = longitude, `y` = latitude, degrees) on a sphere of `radius`.
pub fn haversine_distance(a: Coord<f64>, b: Coord<f64>, radius: f64) -> f64 {
    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.x - a.x).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * radius * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Sum of haversine distances between consecutive geographic vertices.
pub fn haversine_length(coords: &[Coord<f64>], radius: f64) -> f64 {
    coords
        .windows(2)
        .map(|w| haversine_distance(w[0], w[1], radius))
        .sum()
}

/// Signed spherical area (square meters) of a geographic ring.
///
/// Vertices are longitude/latitude degrees; the ring may or may not repeat
/// its first vertex. The sign depends on winding order.
pub fn spherical_ring_area(ring: &[Coord<f64>], radius: f64) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    let mut x1 = ring[n - 1].x;
    let mut y1 = ring[n - 1].y;
    for c in ring {
        let x2 = c.x;
        let y2 = c.y;
        area += (x2 - x1).to_radians() * (2.0 + y1.to_radians().sin() + y2.to_radians().sin());
        x1 = x2;
        y1 = y2;
    }
    area * radius * radius / 2.0
}

#[cfg(test)]
mod tests {
    use super::{WGS84_A, haversine_distance, haversine_length, spherical_ring_area};
    use geo::Coord;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn one_degree_of_longitude_at_equator() {
        let d = haversine_distance(c(0.0, 0.0), c(1.0, 0.0), WGS84_A);
        // 2 * pi * 6378137 / 360
        assert_close(d, 111_319.49, 0.01);
        assert_close(d, 111_195.0, 300.0);
    }

    #[test]
    fn length_sums_segments() {
        let coords = [c(0.0, 0.0), c(1.0, 0.0), c(2.0, 0.0)];
        let one = haversine_distance(c(0.0, 0.0), c(1.0, 0.0), WGS84_A);
        assert_close(haversine_length(&coords, WGS84_A), 2.0 * one, 1e-6);
        assert_eq!(haversine_length(&coords[..1], WGS84_A), 0.0);
    }

    #[test]
    fn one_degree_square_at_equator() {
        let ring = [c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 1.0), c(0.0, 0.0)];
        let area = spherical_ring_area(&ring, WGS84_A).abs();
        // ~12,391 km^2 for a 1x1 degree cell at the equator on this sphere.
        assert_close(area / 1.0e6, 12_391.0, 25.0);
    }

    #[test]
    fn degenerate_ring_has_no_area() {
        assert_eq!(spherical_ring_area(&[c(0.0, 0.0), c(1.0, 1.0)], WGS84_A), 0.0);
    }
}
