//! Reference-table valuation of pre-construction condo assignments.
//!
//! [`PsfResolver`] turns a `(year, city)` pair into a price-per-square-foot
//! record, [`ValuationEngine`] prices a unit from two such records, and
//! [`ValuationService`] puts an optional remote provider in front of both.

pub mod cities;
pub mod domain;
pub mod engine;
pub mod export;
pub mod market;
pub mod money;
pub mod mortgage;
pub mod reference;
pub mod resolver;
pub mod service;
pub mod share;

pub use domain::{
    ComparableStats, GroundingSource, InterestRates, PropertyDetails, PsfRecord, TrendPoint,
    ValuationOrigin, ValuationResponse, ValuationResult, CITIES, SUPPORTED_YEARS,
};
pub use engine::{compute_valuation, ValuationEngine, ValuationError};
pub use export::write_trend_csv;
pub use mortgage::MortgageComparison;
pub use reference::PsfTable;
pub use resolver::{PsfResolver, Resolution, ResolutionTier};
pub use service::{ServiceError, ValuationService};
pub use share::{parse_share_query, share_url, ShareLinkError};
