use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}

/// One scored candidate route, in ranked order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedRoute {
    pub route_index: usize,
    pub geometry: Vec<Coordinate>,
    pub distance_km: f64,
    pub duration_s: f64,
    pub duration_min: f64,
    pub duration_h: f64,
    pub elevation_gain_m: f64,
    pub traffic_index: f64,
    pub avg_speed_kmph: f64,
    #[serde(rename = "energy_consumed_kWh")]
    pub energy_consumed_kwh: f64,
    pub battery_percentage_usage: f64,
    pub is_feasible: bool,
    pub green_score: f64,
    pub is_optimal: bool,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeResponse {
    pub start: Coordinate,
    pub end: Coordinate,
    pub routes: Vec<RankedRoute>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    #[serde(rename = "prediction_kWh")]
    pub prediction_kwh: f64,
}

/// GeoJSON payload for map-rendering callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<StationFeature>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationFeature {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: StationProperties,
    pub geometry: PointGeometry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationProperties {
    pub station_id: String,
    pub rating: f64,
    pub cost: f64,
}

/// Coordinates are `[lon, lat]`, GeoJSON order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestStationResponse {
    pub station_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
    pub rating: f64,
    pub cost: f64,
    pub remaining_range_km: f64,
}

impl StationFeature {
    pub fn new(station_id: String, lat: f64, lon: f64, rating: f64, cost: f64) -> Self {
        Self {
            kind: "Feature".to_string(),
            properties: StationProperties {
                station_id,
                rating,
                cost,
            },
            geometry: PointGeometry {
                kind: "Point".to_string(),
                coordinates: [lon, lat],
            },
        }
    }
}

impl StationCollection {
    pub fn new(features: Vec<StationFeature>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }
}
