use super::domain::{PropertyDetails, ValuationOrigin, ValuationResponse, ValuationResult};
use super::engine::{validate, ValuationEngine, ValuationError};
use crate::config::{AppConfig, ValuationMode};
use crate::remote::{GeminiClient, RemoteError, RemoteValuationAdapter};
use chrono::{Datelike, Local};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Valuation(#[from] ValuationError),
}

/// Front door for valuations: asks the remote provider when one is wired in
/// and drops back to the reference-table engine when it cannot answer.
#[derive(Clone)]
pub struct ValuationService {
    engine: ValuationEngine<'static>,
    remote: Option<Arc<dyn RemoteValuationAdapter>>,
    local_delay: Duration,
    pinned_year: Option<i32>,
}

impl std::fmt::Debug for ValuationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValuationService")
            .field("remote", &self.remote.as_ref().map(|remote| remote.name()))
            .field("local_delay", &self.local_delay)
            .field("pinned_year", &self.pinned_year)
            .finish()
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::local()
    }
}

impl ValuationService {
    pub fn local() -> Self {
        Self {
            engine: ValuationEngine::reference(),
            remote: None,
            local_delay: Duration::ZERO,
            pinned_year: None,
        }
    }

    pub fn with_remote(remote: Arc<dyn RemoteValuationAdapter>) -> Self {
        Self {
            remote: Some(remote),
            ..Self::local()
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ServiceError> {
        let service = match config.valuation.mode {
            ValuationMode::Local => Self::local(),
            ValuationMode::Remote => {
                let client = GeminiClient::new(config.remote.clone())
                    .map_err(|err| ServiceError::Configuration(err.to_string()))?;
                Self::with_remote(Arc::new(client))
            }
        };
        Ok(service
            .with_local_delay(config.valuation.local_delay)
            .with_pinned_year(config.valuation.current_year))
    }

    pub fn with_local_delay(mut self, delay: Duration) -> Self {
        self.local_delay = delay;
        self
    }

    pub fn with_pinned_year(mut self, year: Option<i32>) -> Self {
        self.pinned_year = year;
        self
    }

    /// Market year used when the caller does not supply one.
    pub fn current_year(&self) -> i32 {
        self.pinned_year.unwrap_or_else(|| Local::now().year())
    }

    /// Synchronous reference-table valuation with no provider involved.
    pub fn estimate_locally(
        &self,
        details: &PropertyDetails,
        current_year: i32,
    ) -> Result<ValuationResult, ValuationError> {
        self.engine.compute(details, current_year)
    }

    pub async fn appraise(
        &self,
        details: &PropertyDetails,
        current_year: i32,
    ) -> Result<ValuationResponse, ServiceError> {
        validate(details, current_year)?;

        let Some(remote) = self.remote.as_ref() else {
            if !self.local_delay.is_zero() {
                tokio::time::sleep(self.local_delay).await;
            }
            return self.local_response(details, current_year, ValuationOrigin::Local);
        };

        match remote.appraise(details, current_year).await {
            Ok(valuation) => {
                flag_inconsistent_appreciation(details, &valuation.data);
                info!(
                    provider = remote.name(),
                    sources = valuation.sources.len(),
                    "remote valuation succeeded"
                );
                Ok(ValuationResponse {
                    data: valuation.data,
                    sources: valuation.sources,
                    origin: ValuationOrigin::Remote,
                })
            }
            Err(RemoteError::Configuration(message)) => {
                Err(ServiceError::Configuration(message))
            }
            Err(err) => {
                warn!(
                    provider = remote.name(),
                    error = %err,
                    "remote valuation unavailable; falling back to reference table"
                );
                self.local_response(details, current_year, ValuationOrigin::Fallback)
            }
        }
    }

    fn local_response(
        &self,
        details: &PropertyDetails,
        current_year: i32,
        origin: ValuationOrigin,
    ) -> Result<ValuationResponse, ServiceError> {
        let data = self.engine.compute(details, current_year)?;
        Ok(ValuationResponse {
            data,
            sources: Vec::new(),
            origin,
        })
    }
}

/// Upstream appreciation is reported as given; a mismatch with the upstream
/// estimate is only logged.
fn flag_inconsistent_appreciation(details: &PropertyDetails, data: &ValuationResult) {
    if details.original_price <= 0.0 {
        return;
    }
    let implied = ((data.estimated_value as f64 - details.original_price)
        / details.original_price
        * 100.0)
        .round() as i64;
    if (implied - data.appreciation_percentage).abs() > 1 {
        warn!(
            reported = data.appreciation_percentage,
            implied,
            "remote appreciation disagrees with remote estimated value"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        AppEnvironment, LogFormat, RemoteConfig, ServerConfig, TelemetryConfig,
        ValuationSettings,
    };

    fn config(mode: ValuationMode) -> AppConfig {
        AppConfig {
            environment: AppEnvironment::Test,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
                log_format: LogFormat::Compact,
            },
            valuation: ValuationSettings {
                mode,
                current_year: Some(2024),
                local_delay: Duration::ZERO,
            },
            remote: RemoteConfig {
                api_key: None,
                model: "gemini-test".to_string(),
                base_url: "http://127.0.0.1:9".to_string(),
                timeout: Duration::from_secs(1),
            },
        }
    }

    #[tokio::test]
    async fn remote_config_without_key_builds_and_reports_missing_key() {
        let service = ValuationService::from_config(&config(ValuationMode::Remote))
            .expect("service builds");
        assert_eq!(service.current_year(), 2024);

        let details = PropertyDetails::new(2021, 600_000.0, 650.0, "Toronto");
        let err = service
            .appraise(&details, 2024)
            .await
            .expect_err("missing key");
        assert!(matches!(err, ServiceError::Configuration(message) if message.contains("GEMINI_API_KEY")));
    }

    #[tokio::test]
    async fn local_config_answers_from_reference_table() {
        let service = ValuationService::from_config(&config(ValuationMode::Local))
            .expect("service builds");
        let details = PropertyDetails::new(2021, 600_000.0, 650.0, "Toronto");
        let response = service.appraise(&details, 2024).await.expect("valuation");
        assert_eq!(response.origin, ValuationOrigin::Local);
        assert_eq!(response.data.estimated_value, 567_857);
    }
}
