use super::domain::{InterestRates, PropertyDetails};
use serde::Serialize;

/// Share of the purchase price assumed to be financed.
pub const LOAN_TO_VALUE: f64 = 0.80;
pub const DEFAULT_AMORTIZATION_YEARS: u32 = 25;

/// Closed-form monthly payment for a fully amortizing loan.
pub fn monthly_payment(principal: f64, annual_rate_pct: f64, years: u32) -> f64 {
    let payments = f64::from(years * 12);
    if payments == 0.0 {
        return principal;
    }
    let monthly_rate = annual_rate_pct / 100.0 / 12.0;
    if monthly_rate == 0.0 {
        return principal / payments;
    }
    let growth = (1.0 + monthly_rate).powf(payments);
    principal * monthly_rate * growth / (growth - 1.0)
}

/// What the same 80% LTV loan costs per month at the purchase-era rate versus
/// today's rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageComparison {
    pub loan_amount: f64,
    pub historical_rate: f64,
    pub current_rate: f64,
    pub payment_then: f64,
    pub payment_now: f64,
    pub monthly_difference: f64,
}

impl MortgageComparison {
    pub fn new(details: &PropertyDetails, rates: InterestRates) -> Self {
        let loan_amount = details.original_price * LOAN_TO_VALUE;
        let payment_then =
            monthly_payment(loan_amount, rates.historical_rate, DEFAULT_AMORTIZATION_YEARS);
        let payment_now =
            monthly_payment(loan_amount, rates.current_rate, DEFAULT_AMORTIZATION_YEARS);
        Self {
            loan_amount,
            historical_rate: rates.historical_rate,
            current_rate: rates.current_rate,
            payment_then,
            payment_now,
            monthly_difference: payment_now - payment_then,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_splits_principal_evenly() {
        assert_eq!(monthly_payment(300_000.0, 0.0, 25), 1_000.0);
    }

    #[test]
    fn matches_standard_amortization_table() {
        // 480k over 25 years at 4.9% nominal is roughly $2,778/month.
        let payment = monthly_payment(480_000.0, 4.9, 25);
        assert!((payment - 2_778.0).abs() < 1.0, "payment was {payment}");
    }

    #[test]
    fn comparison_uses_eighty_percent_ltv() {
        let details = PropertyDetails::new(2021, 600_000.0, 650.0, "Toronto");
        let rates = InterestRates {
            historical_rate: 2.8,
            current_rate: 4.9,
        };
        let comparison = MortgageComparison::new(&details, rates);
        assert_eq!(comparison.loan_amount, 480_000.0);
        assert!(comparison.payment_now > comparison.payment_then);
        assert!(
            (comparison.monthly_difference - (comparison.payment_now - comparison.payment_then))
                .abs()
                < f64::EPSILON
        );
    }
}
