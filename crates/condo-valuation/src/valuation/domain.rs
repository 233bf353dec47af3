use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::ops::RangeInclusive;

/// Cities offered by the valuation form, in display order.
pub const CITIES: [&str; 12] = [
    "Toronto",
    "Mississauga",
    "Vaughan",
    "Markham",
    "Richmond Hill",
    "Oakville",
    "Brampton",
    "Etobicoke",
    "North York",
    "Scarborough",
    "Ajax",
    "Pickering",
];

/// Purchase years the resolver is expected to answer with non-zero data.
/// Years outside this window are still accepted.
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 1990..=2100;

/// Caller-supplied description of the unit being valued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDetails {
    pub year_purchased: i32,
    pub original_price: f64,
    pub square_footage: f64,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<String>,
}

impl PropertyDetails {
    pub fn new(
        year_purchased: i32,
        original_price: f64,
        square_footage: f64,
        city: impl Into<String>,
    ) -> Self {
        Self {
            year_purchased,
            original_price,
            square_footage,
            city: city.into(),
            project_name: None,
            bedrooms: None,
        }
    }

    pub fn with_project(mut self, project_name: impl Into<String>) -> Self {
        self.project_name = Some(project_name.into());
        self
    }

    pub fn with_bedrooms(mut self, bedrooms: impl Into<String>) -> Self {
        self.bedrooms = Some(bedrooms.into());
        self
    }
}

/// Market price-per-square-foot band for one year and city.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PsfRecord {
    pub min_psf: f64,
    pub max_psf: f64,
    pub avg_psf: f64,
    pub market_context: Cow<'static, str>,
}

impl PsfRecord {
    pub const fn curated(min_psf: f64, max_psf: f64, avg_psf: f64, context: &'static str) -> Self {
        Self {
            min_psf,
            max_psf,
            avg_psf,
            market_context: Cow::Borrowed(context),
        }
    }

    pub const fn unavailable() -> Self {
        Self::curated(0.0, 0.0, 0.0, "Data unavailable.")
    }

    pub fn is_usable(&self) -> bool {
        self.avg_psf.is_finite() && self.avg_psf > 0.0
    }

    pub fn is_ordered(&self) -> bool {
        self.min_psf <= self.avg_psf && self.avg_psf <= self.max_psf
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub year: i32,
    #[serde(deserialize_with = "rounded_dollars")]
    pub avg_price: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparableStats {
    #[serde(deserialize_with = "rounded_dollars")]
    pub avg_assignment_price: i64,
    pub inventory_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestRates {
    pub historical_rate: f64,
    pub current_rate: f64,
}

/// Valuation payload shared by the local engine and the remote provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationResult {
    #[serde(deserialize_with = "rounded_dollars")]
    pub estimated_value: i64,
    #[serde(rename = "originalPPSF", deserialize_with = "rounded_dollars")]
    pub original_ppsf: i64,
    #[serde(rename = "currentPPSF", deserialize_with = "rounded_dollars")]
    pub current_ppsf: i64,
    #[serde(deserialize_with = "rounded_dollars")]
    pub appreciation_percentage: i64,
    pub market_analysis: String,
    pub year_by_year_trend: Vec<TrendPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparable_stats: Option<ComparableStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rates: Option<InterestRates>,
}

impl ValuationResult {
    pub fn profit(&self, details: &PropertyDetails) -> i64 {
        self.estimated_value - details.original_price.round() as i64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationOrigin {
    Remote,
    Local,
    Fallback,
}

impl ValuationOrigin {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Remote => "AI market research",
            Self::Local => "Reference table",
            Self::Fallback => "Reference table (AI unavailable)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationResponse {
    pub data: ValuationResult,
    pub sources: Vec<GroundingSource>,
    pub origin: ValuationOrigin,
}

/// Upstream models emit whole dollars as floats often enough that integer
/// fields accept any finite JSON number and round it.
fn rounded_dollars<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value.abs() > i64::MAX as f64 {
        return Err(serde::de::Error::custom(format!(
            "expected a finite amount, got {value}"
        )));
    }
    Ok(value.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn property_details_use_camel_case_wire_names() {
        let details = PropertyDetails::new(2021, 600_000.0, 650.0, "Toronto").with_bedrooms("1+1");
        let value = serde_json::to_value(&details).expect("serializes");
        assert_eq!(value["yearPurchased"], json!(2021));
        assert_eq!(value["squareFootage"], json!(650.0));
        assert_eq!(value["bedrooms"], json!("1+1"));
        assert!(value.get("projectName").is_none());
    }

    #[test]
    fn result_accepts_fractional_amounts() {
        let payload = json!({
            "estimatedValue": 612345.6,
            "originalPPSF": 923.08,
            "currentPPSF": 941,
            "appreciationPercentage": 2.4,
            "marketAnalysis": "Cooling.",
            "yearByYearTrend": [{ "year": 2021, "avgPrice": 600000.4 }],
        });
        let result: ValuationResult = serde_json::from_value(payload).expect("parses");
        assert_eq!(result.estimated_value, 612_346);
        assert_eq!(result.original_ppsf, 923);
        assert_eq!(result.appreciation_percentage, 2);
        assert_eq!(result.year_by_year_trend[0].avg_price, 600_000);
        assert!(result.comparable_stats.is_none());
    }

    #[test]
    fn result_rejects_textual_amounts() {
        let payload = json!({
            "estimatedValue": "about 600k",
            "originalPPSF": 923,
            "currentPPSF": 941,
            "appreciationPercentage": 2,
            "marketAnalysis": "Cooling.",
            "yearByYearTrend": [],
        });
        assert!(serde_json::from_value::<ValuationResult>(payload).is_err());
    }

    #[test]
    fn ppsf_fields_keep_upper_case_suffix() {
        let result = ValuationResult {
            estimated_value: 1,
            original_ppsf: 2,
            current_ppsf: 3,
            appreciation_percentage: 0,
            market_analysis: String::new(),
            year_by_year_trend: Vec::new(),
            comparable_stats: None,
            interest_rates: None,
        };
        let value = serde_json::to_value(&result).expect("serializes");
        assert_eq!(value["originalPPSF"], json!(2));
        assert_eq!(value["currentPPSF"], json!(3));
    }
}
