//! Generative valuation providers.
//!
//! A provider answers with the same [`ValuationResult`] shape the local engine
//! produces, plus the web pages it cited. Callers treat
//! [`RemoteError::Configuration`] as fatal and every other failure as a cue to
//! fall back to the reference table.

mod gemini;
mod parse;

pub use gemini::{build_prompt, GeminiClient};
pub use parse::{extract_sources, parse_valuation_text, GenerateContentResponse};

use crate::valuation::domain::{GroundingSource, PropertyDetails, ValuationResult};
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteValuation {
    pub data: ValuationResult,
    pub sources: Vec<GroundingSource>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// Credentials are missing or were rejected; retrying will not help.
    #[error("API key is missing or invalid: {0}")]
    Configuration(String),
    #[error("valuation provider request failed: {0}")]
    Transport(String),
    #[error("valuation provider returned an unusable response: {0}")]
    Parse(String),
}

#[async_trait]
pub trait RemoteValuationAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn appraise(
        &self,
        details: &PropertyDetails,
        current_year: i32,
    ) -> Result<RemoteValuation, RemoteError>;
}
