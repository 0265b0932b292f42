use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::profiles::{EvProfile, EvProfileData, ProfileError, ProfileStore};
use shared::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub user_id: String,
    #[serde(flatten)]
    pub profile: EvProfileData,
}

#[derive(Debug, Serialize)]
pub struct ProfileMessage {
    pub message: String,
    pub success: bool,
}

/// POST /api/v1/ev-profile - create (or replace) a profile
pub async fn create_profile(
    State(store): State<Arc<ProfileStore>>,
    Json(payload): Json<CreateProfileRequest>,
) -> Result<Json<ProfileMessage>, (StatusCode, Json<ApiError>)> {
    store
        .upsert(&payload.user_id, &payload.profile)
        .await
        .map(|_| {
            Json(ProfileMessage {
                message: "Profile created".to_string(),
                success: true,
            })
        })
        .map_err(profile_error_to_api_error)
}

/// GET /api/v1/ev-profile/:user_id
pub async fn get_profile(
    State(store): State<Arc<ProfileStore>>,
    Path(user_id): Path<String>,
) -> Result<Json<EvProfile>, (StatusCode, Json<ApiError>)> {
    store
        .get(&user_id)
        .await
        .map(Json)
        .map_err(profile_error_to_api_error)
}

/// PUT /api/v1/ev-profile/:user_id - update an existing profile
///
/// Unset optional fields keep their stored values; the profile must exist.
pub async fn update_profile(
    State(store): State<Arc<ProfileStore>>,
    Path(user_id): Path<String>,
    Json(mut payload): Json<EvProfileData>,
) -> Result<Json<ProfileMessage>, (StatusCode, Json<ApiError>)> {
    let existing = store
        .get(&user_id)
        .await
        .map_err(profile_error_to_api_error)?;

    payload.vehicle_load = payload.vehicle_load.or(existing.vehicle_load);
    payload.ambient_temperature = payload.ambient_temperature.or(existing.ambient_temperature);

    store
        .upsert(&user_id, &payload)
        .await
        .map(|_| {
            Json(ProfileMessage {
                message: "Profile updated".to_string(),
                success: true,
            })
        })
        .map_err(profile_error_to_api_error)
}

fn profile_error_to_api_error(err: ProfileError) -> (StatusCode, Json<ApiError>) {
    let (status, message) = match err {
        ProfileError::NotFound(user_id) => (
            StatusCode::NOT_FOUND,
            format!("Profile not found for user {user_id}"),
        ),
        ProfileError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        ProfileError::Database(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("Database error: {e}"),
        ),
    };

    (status, Json(ApiError { message }))
}
