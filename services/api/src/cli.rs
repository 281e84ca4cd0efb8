use crate::commands::{
    run_company_dashboard, run_customer_dashboard, run_import_template, run_import_validate,
    run_reward_estimate, run_reward_quote, run_summary, CompanyDashboardArgs,
    CustomerDashboardArgs, ImportValidateArgs, RewardEstimateArgs, RewardQuoteArgs,
    SummaryArgs,
};
use crate::demo::run_demo;
use crate::server;
use clap::{Args, Parser, Subcommand};
use ecotrack::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "EcoTrack",
    about = "Track RFID-tagged products through recycling and account for their rewards",
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
    /// Lifecycle dashboards, offline or against the live backend
    Dashboard {
        #[command(subcommand)]
        command: DashboardCommand,
    },
    /// Reward estimates and backend quotes
    Reward {
        #[command(subcommand)]
        command: RewardCommand,
    },
    /// Validate bulk product uploads
    Import {
        #[command(subcommand)]
        command: ImportCommand,
    },
    /// Walk through the dashboards over built-in sample products
    Demo,
}

#[derive(Subcommand, Debug)]
enum DashboardCommand {
    /// Summarize a JSON file of products without contacting the backend
    Summary(SummaryArgs),
    /// Customer dashboard for an owner email
    Customer(CustomerDashboardArgs),
    /// Company dashboard for an issuing company
    Company(CompanyDashboardArgs),
}

#[derive(Subcommand, Debug)]
enum RewardCommand {
    /// Local flat-rate estimate
    Estimate(RewardEstimateArgs),
    /// Authoritative reward from the product backend
    Quote(RewardQuoteArgs),
}

#[derive(Subcommand, Debug)]
enum ImportCommand {
    /// Parse a product CSV and report rejected rows
    Validate(ImportValidateArgs),
    /// Print the CSV template
    Template,
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
        Command::Dashboard { command } => match command {
            DashboardCommand::Summary(args) => run_summary(args),
            DashboardCommand::Customer(args) => run_customer_dashboard(args).await,
            DashboardCommand::Company(args) => run_company_dashboard(args).await,
        },
        Command::Reward { command } => match command {
            RewardCommand::Estimate(args) => run_reward_estimate(args),
            RewardCommand::Quote(args) => run_reward_quote(args).await,
        },
        Command::Import { command } => match command {
            ImportCommand::Validate(args) => run_import_validate(args),
            ImportCommand::Template => run_import_template(),
        },
        Command::Demo => run_demo(),
    }
}
