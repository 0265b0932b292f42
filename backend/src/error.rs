use axum::http::StatusCode;
use thiserror::Error;

use crate::model::ModelError;
use crate::optimizer::OptimizeError;
use crate::provider::ProviderError;
use crate::stations::StationError;

/// Core operation errors as seen by the HTTP boundary.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Optimize(#[from] OptimizeError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Station(#[from] StationError),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Optimize(err) => optimize_status(err),
            ServiceError::Model(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Station(StationError::NoReachableStation { .. }) => {
                StatusCode::NOT_FOUND
            }
            ServiceError::Station(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn optimize_status(err: &OptimizeError) -> StatusCode {
    match err {
        OptimizeError::InvalidLocation(_) => StatusCode::BAD_REQUEST,
        OptimizeError::Provider(provider) => provider_status(provider),
        OptimizeError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn provider_status(err: &ProviderError) -> StatusCode {
    match err {
        ProviderError::Timeout => StatusCode::REQUEST_TIMEOUT,
        // Relay the provider's own status when it maps to a valid code.
        ProviderError::Status { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        ProviderError::MissingToken | ProviderError::Transport(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        ProviderError::NotFound(_) => StatusCode::BAD_REQUEST,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_distinguished_from_provider_errors() {
        let timeout = ServiceError::Optimize(OptimizeError::Provider(ProviderError::Timeout));
        assert_eq!(timeout.status(), StatusCode::REQUEST_TIMEOUT);

        let rejected = ServiceError::Optimize(OptimizeError::Provider(ProviderError::Status {
            status: 422,
            message: "bad coordinates".to_string(),
        }));
        assert_eq!(rejected.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn invalid_location_is_a_client_error() {
        let err = ServiceError::Optimize(OptimizeError::InvalidLocation("Nowhere".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unreachable_station_is_not_found() {
        let err = ServiceError::Station(StationError::NoReachableStation {
            remaining_range_km: 42.0,
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
