use crate::estimate::{run_estimate, EstimateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use condo_valuation::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "GTA Condo Assignment Valuator",
    about = "Estimate resale values for GTA pre-construction condo assignments",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Value a single unit and print a report
    Estimate(EstimateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Estimate(args) => run_estimate(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["condo-valuation-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn estimate_accepts_formatted_amounts() {
        let cli = Cli::try_parse_from([
            "condo-valuation-api",
            "estimate",
            "--year",
            "2021",
            "--price",
            "$600,000",
            "--size",
            "650",
            "--local",
        ])
        .expect("parses");

        let Some(Command::Estimate(args)) = cli.command else {
            panic!("expected estimate command");
        };
        assert_eq!(args.city, "Toronto");
        assert_eq!(args.price, 600_000.0);
        assert!(args.local);
        assert!(args.trend_csv.is_none());
    }

    #[test]
    fn estimate_rejects_non_positive_size() {
        let result = Cli::try_parse_from([
            "condo-valuation-api",
            "estimate",
            "--year",
            "2021",
            "--price",
            "600000",
            "--size",
            "0",
        ]);
        assert!(result.is_err());
    }
}
