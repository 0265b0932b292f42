use std::{
    fs::File,
    io::{self, Read},
    path::Path,
};

use csv::ReaderBuilder;
use rayon::prelude::*;
use shared::{BestStationResponse, Coordinate, StationCollection, StationFeature};

use crate::geo::{haversine_km, round2};

#[derive(Debug, thiserror::Error)]
pub enum StationError {
    #[error("failed to read station dataset: {0}")]
    Io(#[from] io::Error),
    #[error("invalid station dataset: {0}")]
    Csv(#[from] csv::Error),
    #[error("no reachable station within {remaining_range_km:.2} km")]
    NoReachableStation { remaining_range_km: f64 },
}

#[derive(Debug, Clone)]
pub struct ChargingStation {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: f64,
    pub cost_per_kwh: f64,
}

/// In-memory charging-station dataset, loaded once at startup and shared
/// read-only across requests.
pub struct StationStore {
    stations: Vec<ChargingStation>,
}

impl StationStore {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StationError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Header names are whitespace-trimmed and matched case-sensitively
    /// against the known aliases. Rows with unparsable coordinates, or the
    /// (0,0) marker the source uses for missing data, are dropped silently.
    pub fn from_reader(reader: impl Read) -> Result<Self, StationError> {
        let mut reader = ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_reader(reader);
        let headers = reader.headers()?.clone();
        let find = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| headers.iter().position(|header| header == *alias))
        };

        let id_col = find(&["Station ID"]);
        let rating_col = find(&["Reviews (Rating)"]);
        let cost_col = find(&["Cost (USD/kWh)"]);
        let (Some(lat_col), Some(lon_col)) = (
            find(&["Latitude", "latitude"]),
            find(&["Longitude", "longitude"]),
        ) else {
            tracing::warn!("station dataset has no coordinate columns, serving an empty set");
            return Ok(Self {
                stations: Vec::new(),
            });
        };

        let mut stations = Vec::new();
        for record in reader.records() {
            let Ok(record) = record else { continue };
            let parse = |col: usize| {
                record
                    .get(col)
                    .and_then(|value| value.trim().parse::<f64>().ok())
            };
            let (Some(latitude), Some(longitude)) = (parse(lat_col), parse(lon_col)) else {
                continue;
            };
            if latitude == 0.0 && longitude == 0.0 {
                continue;
            }

            let text = |col: Option<usize>| {
                col.and_then(|col| record.get(col)).unwrap_or("").trim()
            };
            stations.push(ChargingStation {
                id: text(id_col).to_string(),
                latitude,
                longitude,
                rating: text(rating_col).parse().unwrap_or(0.0),
                cost_per_kwh: text(cost_col).parse().unwrap_or(0.0),
            });
        }

        Ok(Self { stations })
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Every valid station, as GeoJSON for map-rendering callers.
    pub fn all(&self) -> StationCollection {
        StationCollection::new(
            self.stations
                .iter()
                .map(|station| {
                    StationFeature::new(
                        station.id.clone(),
                        station.latitude,
                        station.longitude,
                        station.rating,
                        station.cost_per_kwh,
                    )
                })
                .collect(),
        )
    }

    /// Nearest station within the vehicle's remaining range. Not finding one
    /// is a normal negative outcome carrying the computed range for display.
    pub fn best_reachable(
        &self,
        vehicle: Coordinate,
        battery_percent: f64,
        battery_capacity_kwh: f64,
        efficiency_km_per_kwh: f64,
    ) -> Result<BestStationResponse, StationError> {
        let remaining_range_km =
            battery_percent / 100.0 * battery_capacity_kwh * efficiency_km_per_kwh;

        let best = self
            .stations
            .par_iter()
            .map(|station| {
                let position = Coordinate {
                    lat: station.latitude,
                    lon: station.longitude,
                };
                (station, haversine_km(vehicle, position))
            })
            .filter(|(_, distance_km)| *distance_km <= remaining_range_km)
            .min_by(|a, b| a.1.total_cmp(&b.1));

        match best {
            Some((station, distance_km)) => Ok(BestStationResponse {
                station_id: station.id.clone(),
                latitude: station.latitude,
                longitude: station.longitude,
                distance_km: round2(distance_km),
                rating: station.rating,
                cost: station.cost_per_kwh,
                remaining_range_km: round2(remaining_range_km),
            }),
            None => Err(StationError::NoReachableStation { remaining_range_km }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../data/charging_stations.csv");

    fn store() -> StationStore {
        StationStore::from_reader(SAMPLE.as_bytes()).expect("sample dataset")
    }

    #[test]
    fn invalid_rows_are_dropped_from_the_listing() {
        let collection = store().all();
        assert_eq!(collection.kind, "FeatureCollection");
        assert_eq!(collection.features.len(), 5);
        assert!(
            collection
                .features
                .iter()
                .all(|f| f.geometry.coordinates != [0.0, 0.0])
        );
    }

    #[test]
    fn lowercase_coordinate_headers_are_accepted() {
        let csv = "Station ID,latitude,longitude\nST-X,12.9,77.6\n";
        let store = StationStore::from_reader(csv.as_bytes()).expect("dataset");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn missing_coordinate_columns_yield_an_empty_store() {
        let csv = "Station ID,Reviews (Rating)\nST-X,4.2\n";
        let store = StationStore::from_reader(csv.as_bytes()).expect("dataset");
        assert!(store.is_empty());
    }

    #[test]
    fn canonical_remaining_range_filters_stations() {
        // 50% of 60 kWh at 6 km/kWh -> 180 km of range.
        let vehicle = Coordinate {
            lat: 12.9716,
            lon: 77.5946,
        };
        // One degree of latitude is ~111 km, two degrees ~222 km.
        let csv = "Station ID,Latitude,Longitude\nNEAR,13.9716,77.5946\nFAR,14.9716,77.5946\n";
        let store = StationStore::from_reader(csv.as_bytes()).expect("dataset");

        let best = store
            .best_reachable(vehicle, 50.0, 60.0, 6.0)
            .expect("reachable station");
        assert_eq!(best.station_id, "NEAR");
        assert_eq!(best.remaining_range_km, 180.0);
    }

    #[test]
    fn reachability_boundary_is_inclusive() {
        let vehicle = Coordinate {
            lat: 12.9,
            lon: 77.6,
        };
        let station = Coordinate {
            lat: 13.9,
            lon: 77.6,
        };
        let distance = haversine_km(vehicle, station);
        let csv = format!(
            "Station ID,Latitude,Longitude\nEDGE,{},{}\n",
            station.lat, station.lon
        );
        let store = StationStore::from_reader(csv.as_bytes()).expect("dataset");

        // remaining range == distance exactly: still reachable (<=, not <).
        let best = store
            .best_reachable(vehicle, 100.0, distance, 1.0)
            .expect("station at the boundary");
        assert_eq!(best.station_id, "EDGE");

        // Any shortfall excludes it.
        let result = store.best_reachable(vehicle, 100.0, distance * 0.9999, 1.0);
        assert!(matches!(
            result,
            Err(StationError::NoReachableStation { .. })
        ));
    }

    #[test]
    fn nearest_qualifying_station_wins() {
        let vehicle = Coordinate {
            lat: 12.9,
            lon: 77.6,
        };
        let csv =
            "Station ID,Latitude,Longitude\nFARTHER,13.5,77.6\nNEARER,13.1,77.6\n";
        let store = StationStore::from_reader(csv.as_bytes()).expect("dataset");
        let best = store
            .best_reachable(vehicle, 80.0, 60.0, 6.0)
            .expect("reachable station");
        assert_eq!(best.station_id, "NEARER");
    }

    #[test]
    fn no_reachable_station_reports_remaining_range() {
        let store = StationStore::from_reader("Station ID,Latitude,Longitude\n".as_bytes())
            .expect("dataset");
        let vehicle = Coordinate {
            lat: 12.9,
            lon: 77.6,
        };
        match store.best_reachable(vehicle, 50.0, 60.0, 6.0) {
            Err(StationError::NoReachableStation { remaining_range_km }) => {
                assert_eq!(remaining_range_km, 180.0);
            }
            other => panic!("expected no reachable station, got {other:?}"),
        }
    }
}
