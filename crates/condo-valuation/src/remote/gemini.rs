use super::parse::{extract_sources, parse_valuation_text, GenerateContentResponse};
use super::{RemoteError, RemoteValuation, RemoteValuationAdapter};
use crate::config::RemoteConfig;
use crate::valuation::domain::PropertyDetails;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use tracing::{debug, error, warn};

const THINKING_BUDGET: u32 = 1024;

/// Gemini `generateContent` client with Google Search grounding.
pub struct GeminiClient {
    client: Client,
    config: RemoteConfig,
}

impl GeminiClient {
    /// A missing key is reported per request as
    /// [`RemoteError::Configuration`]; only a TLS backend that cannot
    /// initialise fails here.
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| {
                RemoteError::Configuration(format!("unable to build Gemini HTTP client: {err}"))
            })?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn api_key(&self) -> Result<&str, RemoteError> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                RemoteError::Configuration(
                    "set GEMINI_API_KEY (or API_KEY) to enable AI valuations".to_string(),
                )
            })
    }

    async fn generate(&self, prompt: String) -> Result<GenerateContentResponse, RemoteError> {
        let api_key = self.api_key()?;
        let url = self.endpoint();
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "tools": [{ "googleSearch": {} }],
            "generationConfig": {
                "thinkingConfig": { "thinkingBudget": THINKING_BUDGET }
            }
        });

        debug!(%url, model = %self.config.model, "requesting AI valuation");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                error!(error = %err, "Gemini request failed");
                RemoteError::Transport(err.to_string())
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| RemoteError::Transport(err.to_string()))?;

        if !status.is_success() {
            return Err(classify_failure(status, &text));
        }

        serde_json::from_str(&text)
            .map_err(|err| RemoteError::Parse(format!("invalid generateContent body: {err}")))
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RemoteValuationAdapter for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn appraise(
        &self,
        details: &PropertyDetails,
        current_year: i32,
    ) -> Result<RemoteValuation, RemoteError> {
        let response = self.generate(build_prompt(details, current_year)).await?;
        let sources = extract_sources(&response);
        let text = response
            .text()
            .ok_or_else(|| RemoteError::Parse("empty response from Gemini".to_string()))?;

        let data = parse_valuation_text(&text).map_err(|err| {
            warn!(error = %err, "could not parse valuation JSON from Gemini response");
            err
        })?;

        Ok(RemoteValuation { data, sources })
    }
}

fn classify_failure(status: StatusCode, body: &str) -> RemoteError {
    let rejected_key = matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        || (status == StatusCode::BAD_REQUEST && body.contains("API key"));
    if rejected_key {
        RemoteError::Configuration(format!("Gemini rejected the API key (HTTP {status})"))
    } else {
        RemoteError::Transport(format!("HTTP {status}: {body}"))
    }
}

/// Analyst prompt asking for a fenced JSON answer shaped like
/// `ValuationResult`.
pub fn build_prompt(details: &PropertyDetails, current_year: i32) -> String {
    let city = &details.city;
    let year = details.year_purchased;

    let mut facts = format!(
        "- Purchase Year: {year}\n- Original Purchase Price: ${}\n- Size: {} sqft\n- City/Location: {city}\n",
        details.original_price, details.square_footage
    );
    if let Some(project) = details.project_name.as_deref() {
        facts.push_str(&format!("- Project Name: {project}\n"));
    }
    if let Some(bedrooms) = details.bedrooms.as_deref() {
        facts.push_str(&format!("- Bedrooms: {bedrooms}\n"));
    }

    format!(
        r#"Act as a professional Real Estate Analyst for the Greater Toronto Area (GTA).

I need a valuation for a pre-construction condo purchased on assignment.

Property Details:
{facts}
Task:
1. Use Google Search to find historical and current "Price Per Square Foot" (PPSF) data for pre-construction and assignment condos in {city} and the specific project if known.
2. Determine the "Original PPSF" based on user input.
3. Estimate the "Current Market PPSF" for a similar assignment sale today.
4. Calculate the "Estimated Value" today.
5. Generate a year-by-year estimated value trend from {year} to {current_year}.
6. Provide a brief analysis of the market conditions for assignment sales in this area (cooling, heating, stagnating).
7. Estimate the typical 5-year fixed mortgage interest rate for the purchase year ({year}) and the current year.

IMPORTANT: You must return the response in a strictly valid JSON block wrapped in ```json```.

JSON Schema:
{{
  "estimatedValue": number,
  "originalPPSF": number,
  "currentPPSF": number,
  "appreciationPercentage": number,
  "marketAnalysis": "string (max 150 words)",
  "yearByYearTrend": [
    {{ "year": number, "avgPrice": number }}
  ],
  "comparableStats": {{
    "avgAssignmentPrice": number,
    "inventoryLevel": "string (e.g., High, Moderate, Low)"
  }},
  "interestRates": {{
    "historicalRate": number,
    "currentRate": number
  }}
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(api_key: Option<&str>) -> RemoteConfig {
        RemoteConfig {
            api_key: api_key.map(str::to_string),
            model: "gemini-test".to_string(),
            base_url: "http://127.0.0.1:9/v1beta/".to_string(),
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn endpoint_joins_base_and_model() {
        let client = GeminiClient::new(config(Some("key"))).expect("client builds");
        assert_eq!(
            client.endpoint(),
            "http://127.0.0.1:9/v1beta/models/gemini-test:generateContent"
        );
    }

    #[tokio::test]
    async fn missing_key_is_a_configuration_error() {
        let client = GeminiClient::new(config(None)).expect("client builds");
        let details = PropertyDetails::new(2021, 600_000.0, 650.0, "Toronto");
        let err = client
            .appraise(&details, 2024)
            .await
            .expect_err("no key configured");
        assert!(matches!(err, RemoteError::Configuration(_)));
    }

    #[test]
    fn rejected_key_statuses_are_configuration_errors() {
        assert!(matches!(
            classify_failure(StatusCode::FORBIDDEN, ""),
            RemoteError::Configuration(_)
        ));
        assert!(matches!(
            classify_failure(
                StatusCode::BAD_REQUEST,
                r#"{"error":{"message":"API key not valid. Please pass a valid API key."}}"#
            ),
            RemoteError::Configuration(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::SERVICE_UNAVAILABLE, "overloaded"),
            RemoteError::Transport(_)
        ));
    }

    #[test]
    fn prompt_carries_property_facts() {
        let details = PropertyDetails::new(2022, 710_000.0, 600.0, "Vaughan")
            .with_project("Festival Condos")
            .with_bedrooms("2");
        let prompt = build_prompt(&details, 2026);
        assert!(prompt.contains("- Purchase Year: 2022"));
        assert!(prompt.contains("- Original Purchase Price: $710000"));
        assert!(prompt.contains("- Project Name: Festival Condos"));
        assert!(prompt.contains("- Bedrooms: 2"));
        assert!(prompt.contains("trend from 2022 to 2026"));
        assert!(prompt.contains("\"yearByYearTrend\""));
    }
}
