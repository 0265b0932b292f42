use shared::Coordinate;

const EARTH_RADIUS_KM: f64 = 6_371.0;

pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Parse a literal `"lat,lon"` string.
///
/// `None` means the input is not a coordinate pair (an address, a place
/// name, too many fields). Callers fall back to geocoding on `None`; it is
/// never a fatal error.
pub fn parse_latlon(s: &str) -> Option<Coordinate> {
    let mut parts = s.split(',');
    let lat = parts.next()?.trim().parse::<f64>().ok()?;
    let lon = parts.next()?.trim().parse::<f64>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Coordinate { lat, lon })
}

/// Estimate elevation gain in metres from a route geometry.
///
/// Stand-in for a real elevation source: gain scales with a synthetic route
/// length (0.1 km per vertex) and vertex count, capped at 200 m.
pub fn estimate_elevation_gain(geometry: &[Coordinate]) -> f64 {
    if geometry.is_empty() {
        return 0.0;
    }
    let points = geometry.len() as f64;
    let synthetic_km = points * 0.1;
    (synthetic_km * 10.0 + points * 0.01).min(200.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_same_point() {
        let point = Coordinate {
            lat: 45.0,
            lon: 5.0,
        };
        assert_eq!(haversine_km(point, point), 0.0);
    }

    #[test]
    fn test_haversine_symmetry() {
        let a = Coordinate {
            lat: 12.97,
            lon: 77.59,
        };
        let b = Coordinate {
            lat: 28.61,
            lon: 77.21,
        };
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_parse_latlon_round_trip() {
        let coord = parse_latlon("12.9,77.6").expect("literal coordinates");
        assert_eq!(coord.lat, 12.9);
        assert_eq!(coord.lon, 77.6);
    }

    #[test]
    fn test_parse_latlon_rejects_place_names() {
        assert!(parse_latlon("Delhi").is_none());
        assert!(parse_latlon("Delhi, India").is_none());
        assert!(parse_latlon("12.9,77.6,0.0").is_none());
        assert!(parse_latlon("").is_none());
    }

    #[test]
    fn test_parse_latlon_accepts_whitespace() {
        let coord = parse_latlon(" 12.9 , 77.6 ").expect("literal coordinates");
        assert_eq!(coord.lat, 12.9);
        assert_eq!(coord.lon, 77.6);
    }

    #[test]
    fn test_elevation_gain_empty_geometry() {
        assert_eq!(estimate_elevation_gain(&[]), 0.0);
    }

    #[test]
    fn test_elevation_gain_caps_at_200m() {
        let long_route: Vec<Coordinate> = (0..500)
            .map(|i| Coordinate {
                lat: 12.9 + i as f64 * 0.001,
                lon: 77.6,
            })
            .collect();
        assert_eq!(estimate_elevation_gain(&long_route), 200.0);
    }

    #[test]
    fn test_elevation_gain_scales_with_point_count() {
        let short: Vec<Coordinate> = (0..10)
            .map(|_| Coordinate {
                lat: 12.9,
                lon: 77.6,
            })
            .collect();
        let longer: Vec<Coordinate> = (0..50)
            .map(|_| Coordinate {
                lat: 12.9,
                lon: 77.6,
            })
            .collect();
        assert!(estimate_elevation_gain(&short) < estimate_elevation_gain(&longer));
    }

    // Property-based tests using proptest
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn valid_coord() -> impl Strategy<Value = Coordinate> {
            (-90.0..=90.0, -180.0..=180.0).prop_map(|(lat, lon)| Coordinate { lat, lon })
        }

        proptest! {
            #[test]
            fn prop_haversine_non_negative(a in valid_coord(), b in valid_coord()) {
                prop_assert!(haversine_km(a, b) >= 0.0);
            }

            #[test]
            fn prop_haversine_symmetric(a in valid_coord(), b in valid_coord()) {
                let dist_ab = haversine_km(a, b);
                let dist_ba = haversine_km(b, a);
                prop_assert!((dist_ab - dist_ba).abs() < 1e-9);
            }

            #[test]
            fn prop_haversine_identity(coord in valid_coord()) {
                prop_assert_eq!(haversine_km(coord, coord), 0.0);
            }

            #[test]
            fn prop_haversine_triangle_inequality(
                a in valid_coord(),
                b in valid_coord(),
                c in valid_coord()
            ) {
                let dist_ab = haversine_km(a, b);
                let dist_bc = haversine_km(b, c);
                let dist_ac = haversine_km(a, c);
                prop_assert!(dist_ac <= dist_ab + dist_bc + 1e-6);
            }

            #[test]
            fn prop_parse_latlon_round_trips_formatted_pairs(
                lat in -90.0f64..=90.0,
                lon in -180.0f64..=180.0
            ) {
                let parsed = parse_latlon(&format!("{lat},{lon}")).expect("formatted pair");
                prop_assert_eq!(parsed.lat, lat);
                prop_assert_eq!(parsed.lon, lon);
            }

            #[test]
            fn prop_elevation_gain_bounded(coords in prop::collection::vec(valid_coord(), 0..600)) {
                let gain = estimate_elevation_gain(&coords);
                prop_assert!((0.0..=200.0).contains(&gain));
            }
        }
    }
}
