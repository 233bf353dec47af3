use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_positive_amount(raw: &str) -> Result<f64, String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, '$' | ',' | '_'))
        .collect();
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(format!("'{raw}' is not a positive amount")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_amounts_with_currency_punctuation() {
        assert_eq!(parse_positive_amount("$600,000"), Ok(600_000.0));
        assert_eq!(parse_positive_amount("650"), Ok(650.0));
        assert!(parse_positive_amount("0").is_err());
        assert!(parse_positive_amount("lots").is_err());
    }
}
