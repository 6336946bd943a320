use crate::report::{
    run_dashboard, run_next, run_summary, DashboardArgs, NextArgs, SummaryArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use review_hub::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Case Study Review Hub",
    about = "Serve the case study review API or print review reports from a seed file",
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
    /// Print the team summary for the evaluations in a seed file
    Summary(SummaryArgs),
    /// Print case study catalogue statistics
    Dashboard(DashboardArgs),
    /// Show which case study a reviewer would be assigned next
    Next(NextArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// JSON file used to seed the in-memory document store
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Summary(args) => run_summary(args),
        Command::Dashboard(args) => run_dashboard(args),
        Command::Next(args) => run_next(args),
    }
}
