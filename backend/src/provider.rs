use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use shared::Coordinate;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("mapping provider access token not configured")]
    MissingToken,
    #[error("mapping provider request timed out")]
    Timeout,
    #[error("mapping provider returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("mapping provider request failed: {0}")]
    Transport(reqwest::Error),
    #[error("no geocoding result for {0:?}")]
    NotFound(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Transport(err)
        }
    }
}

/// One raw candidate from the mapping provider, order-preserving.
#[derive(Debug, Clone)]
pub struct RawRoute {
    pub distance_m: f64,
    pub duration_s: f64,
    pub geometry: Vec<Coordinate>,
}

/// Mapping collaborator: free-text geocoding plus driving directions with
/// alternatives. Object-safe so handlers and tests can hold it as
/// `Arc<dyn DirectionsProvider>`.
#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    async fn geocode(&self, place: &str) -> Result<Coordinate, ProviderError>;

    async fn directions(
        &self,
        start: Coordinate,
        end: Coordinate,
    ) -> Result<Vec<RawRoute>, ProviderError>;
}

pub struct MapboxClient {
    client: reqwest::Client,
    token: Option<String>,
    base_url: String,
}

impl MapboxClient {
    pub fn new(token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("build http client"),
            token,
            base_url: "https://api.mapbox.com".to_string(),
        }
    }

    fn token(&self) -> Result<&str, ProviderError> {
        self.token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(ProviderError::MissingToken)
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<MapboxRoute>,
}

#[derive(Debug, Deserialize)]
struct MapboxRoute {
    distance: f64,
    duration: f64,
    geometry: GeoJsonLine,
}

#[derive(Debug, Deserialize)]
struct GeoJsonLine {
    #[serde(default)]
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    features: Vec<GeocodeFeature>,
}

#[derive(Debug, Deserialize)]
struct GeocodeFeature {
    center: [f64; 2],
}

#[async_trait]
impl DirectionsProvider for MapboxClient {
    async fn geocode(&self, place: &str) -> Result<Coordinate, ProviderError> {
        let token = self.token()?;
        let url = format!("{}/geocoding/v5/mapbox.places/{place}.json", self.base_url);
        let response = self
            .client
            .get(url)
            .query(&[("access_token", token), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: GeocodeResponse = response.json().await?;
        let feature = body
            .features
            .first()
            .ok_or_else(|| ProviderError::NotFound(place.to_string()))?;
        Ok(Coordinate {
            lat: feature.center[1],
            lon: feature.center[0],
        })
    }

    async fn directions(
        &self,
        start: Coordinate,
        end: Coordinate,
    ) -> Result<Vec<RawRoute>, ProviderError> {
        let token = self.token()?;
        // Mapbox takes "lon,lat" pairs.
        let url = format!(
            "{}/directions/v5/mapbox/driving/{},{};{},{}",
            self.base_url, start.lon, start.lat, end.lon, end.lat
        );
        let response = self
            .client
            .get(url)
            .query(&[
                ("access_token", token),
                ("geometries", "geojson"),
                ("steps", "true"),
                ("alternatives", "true"),
                ("overview", "full"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: DirectionsResponse = response.json().await?;
        Ok(body
            .routes
            .into_iter()
            .map(|route| RawRoute {
                distance_m: route.distance,
                duration_s: route.duration,
                geometry: route
                    .geometry
                    .coordinates
                    .into_iter()
                    .map(|pair| Coordinate {
                        lat: pair[1],
                        lon: pair[0],
                    })
                    .collect(),
            })
            .collect())
    }
}
