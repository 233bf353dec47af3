use super::domain::{
    ComparableStats, InterestRates, PropertyDetails, TrendPoint, ValuationResult,
};
use super::market::{market_analysis, InventoryLevel};
use super::reference::{BASE_HISTORICAL_INTEREST_RATE, CURRENT_INTEREST_RATE};
use super::resolver::PsfResolver;
use tracing::debug;

/// Widest purchase-to-current gap the trend series will span.
pub const MAX_TREND_SPAN_YEARS: i64 = 150;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValuationError {
    #[error("Unable to retrieve sufficient historical PSF data for valuation for the specified city and year. Please try different details.")]
    InsufficientData { year: i32, city: String },
    #[error("invalid property details: {0}")]
    InvalidInput(String),
}

/// Deterministic valuation over a PSF reference table. Holds no state beyond
/// the table reference, so one engine can serve any number of callers.
#[derive(Debug, Clone, Copy)]
pub struct ValuationEngine<'a> {
    resolver: PsfResolver<'a>,
}

impl ValuationEngine<'static> {
    pub fn reference() -> Self {
        Self::new(PsfResolver::reference())
    }
}

impl Default for ValuationEngine<'static> {
    fn default() -> Self {
        Self::reference()
    }
}

impl<'a> ValuationEngine<'a> {
    pub fn new(resolver: PsfResolver<'a>) -> Self {
        Self { resolver }
    }

    pub fn compute(
        &self,
        details: &PropertyDetails,
        current_year: i32,
    ) -> Result<ValuationResult, ValuationError> {
        validate(details, current_year)?;

        let purchase = self
            .resolver
            .resolve_with_tier(details.year_purchased, &details.city);
        let current = self.resolver.resolve_with_tier(current_year, &details.city);

        if !purchase.record.is_usable() {
            return Err(ValuationError::InsufficientData {
                year: details.year_purchased,
                city: details.city.clone(),
            });
        }
        if !current.record.is_usable() {
            return Err(ValuationError::InsufficientData {
                year: current_year,
                city: details.city.clone(),
            });
        }

        let original_ppsf = details.original_price / details.square_footage;
        // Unit's premium/discount against its purchase-year market, carried forward.
        let price_to_psf_ratio = original_ppsf / purchase.record.avg_psf;
        let estimated_current_ppsf = current.record.avg_psf * price_to_psf_ratio;

        let estimated_value =
            projected_value(details.square_footage, current.record.avg_psf, price_to_psf_ratio);
        let appreciation_percentage = (((estimated_value - details.original_price)
            / details.original_price)
            * 100.0)
            .round();

        debug!(
            city = %details.city,
            purchase_year = details.year_purchased,
            purchase_tier = purchase.tier.label(),
            current_year,
            current_tier = current.tier.label(),
            price_to_psf_ratio,
            "computed local valuation"
        );

        let start_year = details.year_purchased.min(current_year);
        let end_year = details.year_purchased.max(current_year);
        let year_by_year_trend = (start_year..=end_year)
            .map(|year| {
                let record = self.resolver.resolve(year, &details.city);
                TrendPoint {
                    year,
                    avg_price: projected_value(
                        details.square_footage,
                        record.avg_psf,
                        price_to_psf_ratio,
                    ) as i64,
                }
            })
            .collect();

        let estimated_value = estimated_value as i64;
        let inventory_level = InventoryLevel::classify(&current.record.market_context);

        Ok(ValuationResult {
            estimated_value,
            original_ppsf: original_ppsf.round() as i64,
            current_ppsf: estimated_current_ppsf.round() as i64,
            appreciation_percentage: appreciation_percentage as i64,
            market_analysis: market_analysis(&current.record.market_context, &details.city),
            year_by_year_trend,
            comparable_stats: Some(ComparableStats {
                avg_assignment_price: estimated_value,
                inventory_level: inventory_level.label().to_string(),
            }),
            interest_rates: Some(InterestRates {
                historical_rate: BASE_HISTORICAL_INTEREST_RATE,
                current_rate: CURRENT_INTEREST_RATE,
            }),
        })
    }
}

/// Values a unit against the curated GTA reference table.
pub fn compute_valuation(
    details: &PropertyDetails,
    current_year: i32,
) -> Result<ValuationResult, ValuationError> {
    ValuationEngine::reference().compute(details, current_year)
}

/// Whole-dollar value of `square_footage` at `avg_psf` scaled by the unit's
/// purchase ratio. The estimate and every trend point go through here so the
/// final trend point always equals the estimate.
fn projected_value(square_footage: f64, avg_psf: f64, price_to_psf_ratio: f64) -> f64 {
    (square_footage * (avg_psf * price_to_psf_ratio)).round()
}

pub(crate) fn validate(
    details: &PropertyDetails,
    current_year: i32,
) -> Result<(), ValuationError> {
    if !(details.original_price.is_finite() && details.original_price > 0.0) {
        return Err(ValuationError::InvalidInput(
            "original price must be a positive amount".to_string(),
        ));
    }
    if !(details.square_footage.is_finite() && details.square_footage > 0.0) {
        return Err(ValuationError::InvalidInput(
            "square footage must be positive".to_string(),
        ));
    }
    let span = (i64::from(current_year) - i64::from(details.year_purchased)).abs();
    if span > MAX_TREND_SPAN_YEARS {
        return Err(ValuationError::InvalidInput(format!(
            "purchase year {} is more than {MAX_TREND_SPAN_YEARS} years from {current_year}",
            details.year_purchased
        )));
    }
    Ok(())
}
