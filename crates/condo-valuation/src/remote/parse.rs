use super::RemoteError;
use crate::valuation::domain::{GroundingSource, ValuationResult};
use serde::Deserialize;

/// Subset of the `generateContent` response body the valuation flow reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub thought: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroundingChunk {
    #[serde(default)]
    pub web: Option<WebChunk>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebChunk {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl GenerateContentResponse {
    /// Answer text of the first candidate, skipping thought summaries.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter(|part| !part.thought)
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Web citations from the first candidate. Chunks without a uri are dropped;
/// untitled ones are labelled "Source".
pub fn extract_sources(response: &GenerateContentResponse) -> Vec<GroundingSource> {
    response
        .candidates
        .first()
        .and_then(|candidate| candidate.grounding_metadata.as_ref())
        .map(|metadata| {
            metadata
                .grounding_chunks
                .iter()
                .filter_map(|chunk| chunk.web.as_ref())
                .filter_map(|web| {
                    let uri = web.uri.as_deref()?.trim();
                    if uri.is_empty() {
                        return None;
                    }
                    let title = web
                        .title
                        .as_deref()
                        .map(str::trim)
                        .filter(|title| !title.is_empty())
                        .unwrap_or("Source");
                    Some(GroundingSource {
                        title: title.to_string(),
                        uri: uri.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Pulls a [`ValuationResult`] out of free-form model output: the whole text
/// first, then a ```` ```json ```` fence, then the outermost `{...}` span.
pub fn parse_valuation_text(text: &str) -> Result<ValuationResult, RemoteError> {
    let candidates = [Some(text.trim()), fenced_json(text), outer_object(text)];

    let mut last_error = None;
    for candidate in candidates.into_iter().flatten() {
        match serde_json::from_str::<ValuationResult>(candidate) {
            Ok(result) => return validate(result),
            Err(err) => last_error = Some(err),
        }
    }

    Err(RemoteError::Parse(match last_error {
        Some(err) => format!("no valuation JSON in response ({err})"),
        None => "no valuation JSON in response".to_string(),
    }))
}

fn validate(result: ValuationResult) -> Result<ValuationResult, RemoteError> {
    if result.estimated_value <= 0 {
        return Err(RemoteError::Parse(format!(
            "estimated value must be positive, got {}",
            result.estimated_value
        )));
    }
    Ok(result)
}

fn fenced_json(text: &str) -> Option<&str> {
    let start = text.find("```json")? + "```json".len();
    let rest = &text[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

fn outer_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}
