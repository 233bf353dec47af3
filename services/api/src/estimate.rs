use crate::infra::parse_positive_amount;
use clap::Args;
use condo_valuation::config::{AppConfig, ValuationMode};
use condo_valuation::error::AppError;
use condo_valuation::telemetry;
use condo_valuation::valuation::cities::is_known;
use condo_valuation::valuation::money::{format_cad, format_cad_cents};
use condo_valuation::valuation::mortgage::{DEFAULT_AMORTIZATION_YEARS, LOAN_TO_VALUE};
use condo_valuation::valuation::{
    share_url, write_trend_csv, MortgageComparison, PropertyDetails, ValuationResponse,
    ValuationService,
};
use std::fs::File;
use std::path::PathBuf;
use tracing::info;
use url::Url;

#[derive(Args, Debug)]
pub(crate) struct EstimateArgs {
    /// City or GTA region the unit is in
    #[arg(long, default_value = "Toronto")]
    pub(crate) city: String,
    /// Year the assignment was purchased
    #[arg(long)]
    pub(crate) year: i32,
    /// Original purchase price (accepts "$600,000")
    #[arg(long, value_parser = parse_positive_amount)]
    pub(crate) price: f64,
    /// Interior size in square feet
    #[arg(long, value_parser = parse_positive_amount)]
    pub(crate) size: f64,
    /// Project or building name
    #[arg(long)]
    pub(crate) project: Option<String>,
    /// Bedroom layout, e.g. "1+Den"
    #[arg(long)]
    pub(crate) beds: Option<String>,
    /// Market year to value against (defaults to the configured or calendar year)
    #[arg(long)]
    pub(crate) current_year: Option<i32>,
    /// Skip the AI provider and use the reference table only
    #[arg(long)]
    pub(crate) local: bool,
    /// Base URL for a shareable link to this valuation
    #[arg(long)]
    pub(crate) share_base: Option<String>,
    /// Write the year-by-year trend to this CSV file
    #[arg(long)]
    pub(crate) trend_csv: Option<PathBuf>,
}

impl EstimateArgs {
    fn details(&self) -> PropertyDetails {
        PropertyDetails {
            year_purchased: self.year,
            original_price: self.price,
            square_footage: self.size,
            city: self.city.trim().to_string(),
            project_name: self.project.clone(),
            bedrooms: self.beds.clone(),
        }
    }
}

pub(crate) async fn run_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if args.local {
        config.valuation.mode = ValuationMode::Local;
    }
    telemetry::init(&config.telemetry)?;

    let service = ValuationService::from_config(&config)?;
    let details = args.details();
    let current_year = args
        .current_year
        .unwrap_or_else(|| service.current_year());

    let response = service.appraise(&details, current_year).await?;
    let share_link = args
        .share_base
        .as_deref()
        .map(|base| share_url(base, &details))
        .transpose()?;

    print!(
        "{}",
        render_report(&details, current_year, &response, share_link.as_ref())
    );

    if let Some(path) = args.trend_csv {
        let file = File::create(&path)?;
        write_trend_csv(file, &response.data.year_by_year_trend)?;
        info!(path = %path.display(), "trend exported");
        println!("\nTrend written to {}", path.display());
    }

    Ok(())
}

pub(crate) fn render_report(
    details: &PropertyDetails,
    current_year: i32,
    response: &ValuationResponse,
    share_link: Option<&Url>,
) -> String {
    let data = &response.data;
    let mut lines = vec![
        format!(
            "Condo assignment valuation: {} (purchased {}, valued {})",
            details.city, details.year_purchased, current_year
        ),
        format!("Source: {}", response.origin.label()),
    ];
    if let Some(project) = details.project_name.as_deref() {
        lines.push(format!("Project: {project}"));
    }
    if let Some(beds) = details.bedrooms.as_deref() {
        lines.push(format!("Bedrooms: {beds}"));
    }
    if !is_known(&details.city) {
        lines.push(format!(
            "Note: no local data for {}; priced from GTA-wide averages",
            details.city
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "Estimated value:   {}",
        format_cad(data.estimated_value)
    ));
    lines.push(format!(
        "Original price:    {}",
        format_cad(details.original_price.round() as i64)
    ));
    lines.push(format!(
        "Profit / loss:     {} ({:+}%)",
        format_cad(data.profit(details)),
        data.appreciation_percentage
    ));
    lines.push(format!(
        "Price per sq ft:   {} -> {}",
        format_cad(data.original_ppsf),
        format_cad(data.current_ppsf)
    ));
    if let Some(stats) = &data.comparable_stats {
        lines.push(format!(
            "Comparables:       {} avg assignment | inventory {}",
            format_cad(stats.avg_assignment_price),
            stats.inventory_level
        ));
    }

    lines.push(String::new());
    lines.push("Market analysis".to_string());
    lines.push(data.market_analysis.clone());

    lines.push(String::new());
    lines.push("Year-by-year trend".to_string());
    for point in &data.year_by_year_trend {
        lines.push(format!("  {}  {}", point.year, format_cad(point.avg_price)));
    }

    if let Some(rates) = data.interest_rates {
        let mortgage = MortgageComparison::new(details, rates);
        let difference = if mortgage.monthly_difference >= 0.0 {
            format!("+{}", format_cad_cents(mortgage.monthly_difference))
        } else {
            format_cad_cents(mortgage.monthly_difference)
        };
        lines.push(String::new());
        lines.push(format!(
            "Mortgage comparison ({:.0}% LTV, {DEFAULT_AMORTIZATION_YEARS}-year amortization)",
            LOAN_TO_VALUE * 100.0
        ));
        lines.push(format!(
            "  Loan amount:         {}",
            format_cad_cents(mortgage.loan_amount)
        ));
        lines.push(format!(
            "  At {:.2}% ({}):     {}/month",
            mortgage.historical_rate,
            details.year_purchased,
            format_cad_cents(mortgage.payment_then)
        ));
        lines.push(format!(
            "  At {:.2}% ({}):     {}/month",
            mortgage.current_rate,
            current_year,
            format_cad_cents(mortgage.payment_now)
        ));
        lines.push(format!("  Monthly difference:  {difference}"));
    }

    if !response.sources.is_empty() {
        lines.push(String::new());
        lines.push("Sources".to_string());
        for source in &response.sources {
            lines.push(format!("  - {}: {}", source.title, source.uri));
        }
    }

    if let Some(link) = share_link {
        lines.push(String::new());
        lines.push(format!("Share link: {link}"));
    }

    let mut report = lines.join("\n");
    report.push('\n');
    report
}
