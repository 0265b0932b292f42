use std::{net::SocketAddr, sync::Arc};

use backend::{
    AppState, create_router, model::LinearModel, optimizer::RouteOptimizer,
    profile_router, profiles::ProfileStore, provider::MapboxClient, stations::StationStore,
};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SAMPLE_MODEL_PATH: &str = "backend/data/energy_model.json";
const SAMPLE_STATIONS_PATH: &str = "backend/data/charging_stations.csv";

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let model_path = std::env::var("MODEL_PATH").unwrap_or_else(|_| SAMPLE_MODEL_PATH.to_string());
    let model = LinearModel::from_path(&model_path).expect("load energy model");
    tracing::info!("loaded energy model from {model_path}");

    let stations_path =
        std::env::var("STATIONS_CSV").unwrap_or_else(|_| SAMPLE_STATIONS_PATH.to_string());
    let stations = StationStore::from_path(&stations_path).expect("load charging stations");
    tracing::info!(
        "loaded {} charging stations from {stations_path}",
        stations.len()
    );

    let token = std::env::var("MAPBOX_ACCESS_TOKEN").ok();
    if token.is_none() {
        tracing::warn!("MAPBOX_ACCESS_TOKEN not set; route optimization will reject requests");
    }
    let provider = Arc::new(MapboxClient::new(token));

    let model: Arc<dyn backend::model::EnergyModel> = Arc::new(model);
    let state = AppState {
        optimizer: Arc::new(RouteOptimizer::new(provider, model.clone())),
        model,
        stations: Arc::new(stations),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = create_router(state).layer(cors.clone());

    match ProfileStore::connect().await {
        Ok(store) => {
            if let Err(e) = store.migrate().await {
                tracing::error!("Failed to run migrations: {e}");
                panic!("database migration failed");
            }
            app = app.merge(profile_router(Arc::new(store)).layer(cors));
            tracing::info!("profile endpoints enabled");
        }
        Err(e) => {
            tracing::warn!("PostgreSQL not available: {e}");
            tracing::warn!("Set DATABASE_URL to enable EV profile endpoints.");
        }
    }

    let addr: SocketAddr = "0.0.0.0:8080".parse().expect("valid socket address");
    tracing::info!("starting backend on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await.unwrap(), app)
        .await
        .unwrap();
}
