use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::valuation::engine::ValuationError;
use crate::valuation::service::ServiceError;
use crate::valuation::share::ShareLinkError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Valuation(ServiceError),
    ShareLink(ShareLinkError),
    Export(csv::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Valuation(ServiceError::Valuation(ValuationError::InvalidInput(_)))
            | AppError::ShareLink(_) => StatusCode::BAD_REQUEST,
            AppError::Valuation(ServiceError::Valuation(ValuationError::InsufficientData {
                ..
            })) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Valuation(ServiceError::Configuration(_))
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Valuation(err) => write!(f, "{}", err),
            AppError::ShareLink(err) => write!(f, "{}", err),
            AppError::Export(err) => write!(f, "export error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Valuation(err) => Some(err),
            AppError::ShareLink(err) => Some(err),
            AppError::Export(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ServiceError> for AppError {
    fn from(value: ServiceError) -> Self {
        Self::Valuation(value)
    }
}

impl From<ValuationError> for AppError {
    fn from(value: ValuationError) -> Self {
        Self::Valuation(ServiceError::Valuation(value))
    }
}

impl From<ShareLinkError> for AppError {
    fn from(value: ShareLinkError) -> Self {
        Self::ShareLink(value)
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        Self::Export(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_valuation_failures_to_client_statuses() {
        let invalid: AppError = ValuationError::InvalidInput("square footage".to_string()).into();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let thin: AppError = ValuationError::InsufficientData {
            year: 2021,
            city: "Toronto".to_string(),
        }
        .into();
        assert_eq!(thin.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(thin
            .to_string()
            .starts_with("Unable to retrieve sufficient historical PSF data"));

        let share: AppError = ShareLinkError::Missing("city").into();
        assert_eq!(share.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_credentials_are_server_faults() {
        let err: AppError = ServiceError::Configuration("set GEMINI_API_KEY".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
