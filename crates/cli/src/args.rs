//! Command-line arguments

use backtest_client_core::models::settings::{ApplyPolicy, Settings, DEFAULT_ENDPOINT};
use backtest_client_core::BacktestSession;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "brbt")]
#[command(about = "Submit portfolio backtests to the BRBT service and chart the results")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit one backtest and print the page
    Run(RunArgs),
    /// Edit the form and submit from stdin commands
    Interactive(PageArgs),
}

/// Settings shared by both commands.
#[derive(Args, Debug, Clone)]
pub struct PageArgs {
    /// Backtest service URL
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Leave out the per-asset return chart
    #[arg(long)]
    pub no_bar_chart: bool,

    /// Ignore responses to submissions older than the one displayed
    #[arg(long)]
    pub latest_only: bool,
}

impl PageArgs {
    pub fn settings(&self) -> Settings {
        Settings {
            endpoint: self.endpoint.clone(),
            show_per_asset_chart: !self.no_bar_chart,
            apply_policy: if self.latest_only {
                ApplyPolicy::LatestIssued
            } else {
                ApplyPolicy::LastCompleted
            },
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Strategy identifier understood by the backend
    #[arg(short, long, default_value = "")]
    pub method: String,

    /// Backtest horizon in years
    #[arg(short, long, default_value = "")]
    pub years: String,

    /// Initial investment
    #[arg(short, long, default_value = "0")]
    pub investment: String,

    /// Stock ticker; repeat for several
    #[arg(short, long = "ticker")]
    pub tickers: Vec<String>,

    #[command(flatten)]
    pub page: PageArgs,
}

impl RunArgs {
    /// Fill a session's form the same way a user would, ticker by ticker.
    pub fn fill(&self, session: &mut BacktestSession) {
        session.set_method(self.method.as_str());
        session.set_years(self.years.as_str());
        session.set_initial_investment(self.investment.as_str());
        for ticker in &self.tickers {
            session.set_ticker_input(ticker.as_str());
            if !session.add_ticker() {
                tracing::debug!("skipping blank ticker argument");
            }
        }
    }
}
