pub mod error;
pub mod features;
pub mod geo;
pub mod model;
pub mod optimizer;
pub mod profile_handlers;
pub mod profiles;
pub mod provider;
pub mod stations;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

use crate::error::ServiceError;
use crate::features::{FeatureVector, PredictRequest, RouteRequest};
use crate::model::EnergyModel;
use crate::optimizer::RouteOptimizer;
use crate::profiles::ProfileStore;
use crate::stations::StationStore;
use shared::{
    ApiError, BestStationResponse, Coordinate, OptimizeResponse, PredictResponse,
    StationCollection,
};

#[derive(Clone)]
pub struct AppState {
    pub optimizer: Arc<RouteOptimizer>,
    pub model: Arc<dyn EnergyModel>,
    pub stations: Arc<StationStore>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/predict", post(predict_handler))
        .route("/api/v1/optimize-route", post(optimize_route_handler))
        .route("/api/v1/charging-stations", get(charging_stations_handler))
        .route("/api/v1/best-station", get(best_station_handler))
        .with_state(state)
}

/// Profile endpoints carry their own state so the core router stays usable
/// without a database.
pub fn profile_router(store: Arc<ProfileStore>) -> Router {
    Router::new()
        .route("/api/v1/ev-profile", post(profile_handlers::create_profile))
        .route(
            "/api/v1/ev-profile/:user_id",
            get(profile_handlers::get_profile).put(profile_handlers::update_profile),
        )
        .with_state(store)
}

async fn predict_handler(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, (StatusCode, Json<ApiError>)> {
    let features = FeatureVector::new(&request.vehicle, &request.trip);
    let prediction_kwh = state
        .model
        .predict(&features)
        .map_err(|err| service_error_to_api_error(err.into()))?;

    Ok(Json(PredictResponse { prediction_kwh }))
}

async fn optimize_route_handler(
    State(state): State<AppState>,
    Json(request): Json<RouteRequest>,
) -> Result<Json<OptimizeResponse>, (StatusCode, Json<ApiError>)> {
    state
        .optimizer
        .optimize(&request)
        .await
        .map(Json)
        .map_err(|err| service_error_to_api_error(err.into()))
}

async fn charging_stations_handler(State(state): State<AppState>) -> Json<StationCollection> {
    Json(state.stations.all())
}

#[derive(Debug, Deserialize)]
struct BestStationQuery {
    vehicle_lat: f64,
    vehicle_lon: f64,
    battery_percent: f64,
    #[serde(default = "default_battery_capacity")]
    battery_capacity_kwh: f64,
    #[serde(default = "default_efficiency")]
    efficiency_km_per_kwh: f64,
}

fn default_battery_capacity() -> f64 {
    60.0
}

fn default_efficiency() -> f64 {
    6.0
}

async fn best_station_handler(
    State(state): State<AppState>,
    Query(query): Query<BestStationQuery>,
) -> Result<Json<BestStationResponse>, (StatusCode, Json<ApiError>)> {
    let vehicle = Coordinate {
        lat: query.vehicle_lat,
        lon: query.vehicle_lon,
    };
    state
        .stations
        .best_reachable(
            vehicle,
            query.battery_percent,
            query.battery_capacity_kwh,
            query.efficiency_km_per_kwh,
        )
        .map(Json)
        .map_err(|err| service_error_to_api_error(err.into()))
}

fn service_error_to_api_error(err: ServiceError) -> (StatusCode, Json<ApiError>) {
    (
        err.status(),
        Json(ApiError {
            message: err.to_string(),
        }),
    )
}
