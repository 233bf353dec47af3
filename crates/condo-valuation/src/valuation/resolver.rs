use super::cities::normalize;
use super::domain::PsfRecord;
use super::reference::{PsfTable, ANCHOR_CITY};
use serde::Serialize;
use std::borrow::Cow;
use tracing::{debug, warn};

/// Annual compound decline applied to years before the earliest table year.
pub const EARLY_MARKET_ANNUAL_FACTOR: f64 = 0.98;
/// Annual compound growth applied to years after the latest table year.
pub const STABILIZATION_ANNUAL_FACTOR: f64 = 1.005;
/// Half-width of the min/max band around an extrapolated average.
pub const EXTRAPOLATION_BAND: f64 = 0.05;

const EARLY_MARKET_CONTEXT: &str =
    "Extrapolated: Early market growth with steady appreciation across GTA.";
const STABILIZATION_CONTEXT: &str =
    "Extrapolated: Post-correction stabilization with very modest projected growth across GTA.";

/// Which rule produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTier {
    Exact,
    GeneralYear,
    ExtrapolatedBelow,
    ExtrapolatedAbove,
    UniversalFallback,
    Unavailable,
}

impl ResolutionTier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Exact => "city data",
            Self::GeneralYear => "GTA-wide data",
            Self::ExtrapolatedBelow => "extrapolated (early market)",
            Self::ExtrapolatedAbove => "extrapolated (stabilization)",
            Self::UniversalFallback => "anchor city fallback",
            Self::Unavailable => "unavailable",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub record: PsfRecord,
    pub tier: ResolutionTier,
}

/// One link of the lookup chain. Returning `None` hands the request to the
/// next strategy.
pub trait ResolutionStrategy: Sync {
    fn tier(&self) -> ResolutionTier;
    fn attempt(&self, table: &PsfTable, year: i32, city: &str) -> Option<PsfRecord>;
}

struct ExactMatch;
struct GeneralYear;
struct ExtrapolateBelow;
struct ExtrapolateAbove;
struct UniversalFallback;

static STRATEGIES: [&dyn ResolutionStrategy; 5] = [
    &ExactMatch,
    &GeneralYear,
    &ExtrapolateBelow,
    &ExtrapolateAbove,
    &UniversalFallback,
];

impl ResolutionStrategy for ExactMatch {
    fn tier(&self) -> ResolutionTier {
        ResolutionTier::Exact
    }

    fn attempt(&self, table: &PsfTable, year: i32, city: &str) -> Option<PsfRecord> {
        table.detailed(year, city).cloned()
    }
}

impl ResolutionStrategy for GeneralYear {
    fn tier(&self) -> ResolutionTier {
        ResolutionTier::GeneralYear
    }

    fn attempt(&self, table: &PsfTable, year: i32, _city: &str) -> Option<PsfRecord> {
        table.general(year).cloned()
    }
}

impl ResolutionStrategy for ExtrapolateBelow {
    fn tier(&self) -> ResolutionTier {
        ResolutionTier::ExtrapolatedBelow
    }

    fn attempt(&self, table: &PsfTable, year: i32, _city: &str) -> Option<PsfRecord> {
        let (min_year, _) = table.year_bounds()?;
        if year >= min_year {
            return None;
        }
        let base = table.general(min_year)?;
        let years_before = i64::from(min_year) - i64::from(year);
        Some(extrapolate(
            base.avg_psf,
            EARLY_MARKET_ANNUAL_FACTOR,
            years_before,
            EARLY_MARKET_CONTEXT,
        ))
    }
}

impl ResolutionStrategy for ExtrapolateAbove {
    fn tier(&self) -> ResolutionTier {
        ResolutionTier::ExtrapolatedAbove
    }

    fn attempt(&self, table: &PsfTable, year: i32, _city: &str) -> Option<PsfRecord> {
        let (_, max_year) = table.year_bounds()?;
        if year <= max_year {
            return None;
        }
        let base = table.general(max_year)?;
        let years_after = i64::from(year) - i64::from(max_year);
        Some(extrapolate(
            base.avg_psf,
            STABILIZATION_ANNUAL_FACTOR,
            years_after,
            STABILIZATION_CONTEXT,
        ))
    }
}

impl ResolutionStrategy for UniversalFallback {
    fn tier(&self) -> ResolutionTier {
        ResolutionTier::UniversalFallback
    }

    fn attempt(&self, table: &PsfTable, year: i32, city: &str) -> Option<PsfRecord> {
        let (anchor_year, anchor) = table.latest_detailed_for(ANCHOR_CITY)?;
        warn!(
            %city,
            year,
            anchor_year,
            "no PSF data for city/year; substituting anchor city data"
        );
        Some(PsfRecord {
            market_context: Cow::Owned(format!(
                "Data for specified city/year unavailable. Using general {ANCHOR_CITY} ({anchor_year}) data as a fallback."
            )),
            ..anchor.clone()
        })
    }
}

fn extrapolate(base_avg: f64, annual_factor: f64, years: i64, context: &'static str) -> PsfRecord {
    let estimated = base_avg * annual_factor.powf(years as f64);
    PsfRecord {
        min_psf: (estimated * (1.0 - EXTRAPOLATION_BAND)).round(),
        max_psf: (estimated * (1.0 + EXTRAPOLATION_BAND)).round(),
        avg_psf: estimated.round(),
        market_context: Cow::Borrowed(context),
    }
}

/// Answers (year, city) lookups against a reference table. Never fails: the
/// worst case is an all-zero record flagged [`ResolutionTier::Unavailable`].
#[derive(Debug, Clone, Copy)]
pub struct PsfResolver<'a> {
    table: &'a PsfTable,
}

impl PsfResolver<'static> {
    pub fn reference() -> Self {
        Self::new(PsfTable::reference())
    }
}

impl Default for PsfResolver<'static> {
    fn default() -> Self {
        Self::reference()
    }
}

impl<'a> PsfResolver<'a> {
    pub fn new(table: &'a PsfTable) -> Self {
        Self { table }
    }

    pub fn resolve(&self, year: i32, city: &str) -> PsfRecord {
        self.resolve_with_tier(year, city).record
    }

    pub fn resolve_with_tier(&self, year: i32, city: &str) -> Resolution {
        let key = normalize(city);
        for strategy in STRATEGIES.iter() {
            if let Some(record) = strategy.attempt(self.table, year, key) {
                let tier = strategy.tier();
                debug!(year, city = %key, tier = tier.label(), "resolved PSF data");
                return Resolution { record, tier };
            }
        }

        warn!(year, city = %key, "PSF reference table produced no data");
        Resolution {
            record: PsfRecord::unavailable(),
            tier: ResolutionTier::Unavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_uses_normalized_city() {
        let resolver = PsfResolver::reference();
        let resolution = resolver.resolve_with_tier(2022, "Etobicoke");
        assert_eq!(resolution.tier, ResolutionTier::Exact);
        assert_eq!(resolution.record.avg_psf, 1440.0);
    }

    #[test]
    fn general_year_covers_unknown_cities_and_boundary_years() {
        let resolver = PsfResolver::reference();
        let resolution = resolver.resolve_with_tier(2019, "Toronto");
        assert_eq!(resolution.tier, ResolutionTier::GeneralYear);
        assert_eq!(resolution.record.avg_psf, 1110.0);

        let resolution = resolver.resolve_with_tier(2026, "Barrie");
        assert_eq!(resolution.tier, ResolutionTier::GeneralYear);
        assert_eq!(resolution.record.avg_psf, 1050.0);
    }

    #[test]
    fn unknown_city_inside_detailed_years_hits_universal_fallback() {
        let resolver = PsfResolver::reference();
        let resolution = resolver.resolve_with_tier(2022, "Barrie");
        assert_eq!(resolution.tier, ResolutionTier::UniversalFallback);
        assert_eq!(resolution.record.avg_psf, 1325.0);
        assert_eq!(
            resolution.record.market_context,
            "Data for specified city/year unavailable. Using general Toronto (2024) data as a fallback."
        );
    }

    #[test]
    fn extrapolated_band_is_five_percent() {
        let resolver = PsfResolver::reference();
        let record = resolver.resolve(2017, "Toronto");
        let expected = 1110.0 * 0.98_f64.powi(2);
        assert_eq!(record.avg_psf, expected.round());
        assert_eq!(record.min_psf, (expected * 0.95).round());
        assert_eq!(record.max_psf, (expected * 1.05).round());
        assert_eq!(record.market_context, EARLY_MARKET_CONTEXT);
    }

    #[test]
    fn absurd_years_stay_total() {
        let resolver = PsfResolver::reference();
        for year in [i32::MIN, -5000, 0, 3000, i32::MAX] {
            let resolution = resolver.resolve_with_tier(year, "Toronto");
            assert!(matches!(
                resolution.tier,
                ResolutionTier::ExtrapolatedBelow | ResolutionTier::ExtrapolatedAbove
            ));
            assert!(!resolution.record.avg_psf.is_nan());
        }
    }

    #[test]
    fn empty_table_reports_unavailable() {
        let table = PsfTable::default();
        let resolver = PsfResolver::new(&table);
        let resolution = resolver.resolve_with_tier(2024, "Toronto");
        assert_eq!(resolution.tier, ResolutionTier::Unavailable);
        assert!(!resolution.record.is_usable());
        assert_eq!(resolution.record.market_context, "Data unavailable.");
    }
}
