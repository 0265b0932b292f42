use std::sync::Arc;

use shared::{Coordinate, OptimizeResponse, RankedRoute};

use crate::features::{FeatureVector, RouteRequest, TripDynamics, VehicleState};
use crate::geo::{estimate_elevation_gain, parse_latlon, round2};
use crate::model::{EnergyModel, ModelError, PredictionPolicy};
use crate::provider::{DirectionsProvider, ProviderError, RawRoute};

#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    #[error("invalid location {0:?}: not coordinates and not geocodable")]
    InvalidLocation(String),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("prediction failed: {0}")]
    Prediction(#[from] ModelError),
}

/// Turns a route request into ranked, energy-annotated candidates.
///
/// Collaborators come in through the constructor so tests can swap both the
/// provider and the model.
pub struct RouteOptimizer {
    provider: Arc<dyn DirectionsProvider>,
    model: Arc<dyn EnergyModel>,
    policy: PredictionPolicy,
}

impl RouteOptimizer {
    pub fn new(provider: Arc<dyn DirectionsProvider>, model: Arc<dyn EnergyModel>) -> Self {
        Self {
            provider,
            model,
            policy: PredictionPolicy::SubstituteZero,
        }
    }

    pub fn with_policy(mut self, policy: PredictionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn optimize(&self, request: &RouteRequest) -> Result<OptimizeResponse, OptimizeError> {
        let start = self.resolve_location(&request.start_location).await?;
        let end = self.resolve_location(&request.end_location).await?;

        let raw_routes = self.provider.directions(start, end).await?;
        tracing::debug!(
            "provider returned {} candidate route(s) for {:?} -> {:?}",
            raw_routes.len(),
            request.start_location,
            request.end_location
        );

        let mut routes = Vec::with_capacity(raw_routes.len());
        for (index, raw) in raw_routes.iter().enumerate() {
            let trip = derive_trip_dynamics(raw, &request.trip);
            routes.push(self.score_candidate(index, raw, &request.vehicle, trip)?);
        }
        rank_routes(&mut routes);

        Ok(OptimizeResponse { start, end, routes })
    }

    /// Literal `"lat,lon"` first, geocoding fallback. An endpoint that is
    /// neither is the caller's error, not the provider's.
    async fn resolve_location(&self, location: &str) -> Result<Coordinate, OptimizeError> {
        if let Some(coord) = parse_latlon(location) {
            return Ok(coord);
        }
        match self.provider.geocode(location).await {
            Ok(coord) => Ok(coord),
            Err(ProviderError::NotFound(_)) => {
                Err(OptimizeError::InvalidLocation(location.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn score_candidate(
        &self,
        index: usize,
        raw: &RawRoute,
        vehicle: &VehicleState,
        trip: TripDynamics,
    ) -> Result<RankedRoute, OptimizeError> {
        let features = FeatureVector::new(vehicle, &trip);
        let energy = match self.model.predict(&features) {
            Ok(kwh) => kwh,
            Err(err) => match self.policy {
                PredictionPolicy::FailRequest => return Err(err.into()),
                PredictionPolicy::SubstituteZero => {
                    tracing::warn!("prediction failed for candidate {index}, recording 0 kWh: {err}");
                    0.0
                }
            },
        };

        let capacity = vehicle.battery_capacity_kwh;
        let battery_percentage_usage = if capacity > 0.0 {
            round2(energy / capacity * 100.0)
        } else {
            0.0
        };
        let green_score = (100.0 - battery_percentage_usage.min(100.0)).max(0.0);
        let explanation = if trip.elevation_gain_m < 50.0 {
            "Efficient thanks to lower elevation changes"
        } else {
            "Efficient thanks to optimal traffic conditions"
        };

        Ok(RankedRoute {
            route_index: index,
            geometry: raw.geometry.clone(),
            distance_km: trip.distance_km,
            duration_s: raw.duration_s,
            duration_min: raw.duration_s / 60.0,
            duration_h: raw.duration_s / 3600.0,
            elevation_gain_m: trip.elevation_gain_m,
            traffic_index: trip.traffic_index,
            avg_speed_kmph: trip.avg_speed_kmph,
            energy_consumed_kwh: energy,
            battery_percentage_usage,
            is_feasible: energy <= capacity,
            green_score,
            is_optimal: false,
            explanation: explanation.to_string(),
        })
    }
}

/// Derive per-candidate trip dynamics from the provider's raw route.
/// Humidity and wind stay as requested; everything else is overridden.
fn derive_trip_dynamics(raw: &RawRoute, requested: &TripDynamics) -> TripDynamics {
    let distance_km = raw.distance_m / 1000.0;
    let duration_h = raw.duration_s / 3600.0;
    let avg_speed_kmph = if duration_h > 0.0 {
        distance_km / duration_h
    } else {
        0.0
    };

    // Placeholder until a real traffic feed exists: the ratio compares the
    // duration against a quantity derived from that same duration.
    let optimal_time_factor = distance_km / avg_speed_kmph.max(1.0);
    let traffic_index = (duration_h / optimal_time_factor.max(0.01) * 10.0).min(10.0);

    TripDynamics {
        distance_km,
        elevation_gain_m: estimate_elevation_gain(&raw.geometry),
        traffic_index,
        avg_speed_kmph,
        humidity_percent: requested.humidity_percent,
        wind_speed_mps: requested.wind_speed_mps,
    }
}

/// Strict lexicographic order: energy, then distance, then duration.
/// The first candidate after sorting is the optimal one.
pub fn rank_routes(routes: &mut [RankedRoute]) {
    routes.sort_by(|a, b| {
        a.energy_consumed_kwh
            .total_cmp(&b.energy_consumed_kwh)
            .then_with(|| a.distance_km.total_cmp(&b.distance_km))
            .then_with(|| a.duration_min.total_cmp(&b.duration_min))
    });
    for route in routes.iter_mut() {
        route.is_optimal = false;
    }
    if let Some(best) = routes.first_mut() {
        best.is_optimal = true;
    }
}
