use crate::commands::{run_recipients, run_render, RecipientsArgs, RenderArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use cp_checklist::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Commercial Property Checklist",
    about = "Collect inspection checklists, render them to PDF, and deliver them by email",
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
    /// Validate a checklist JSON file and render it to PDF without sending email
    Render(RenderArgs),
    /// Show the property-to-recipient routing table
    Recipients(RecipientsArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the directory generated PDFs are saved under
    #[arg(long)]
    pub(crate) output_dir: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Render(args) => run_render(args).await,
        Command::Recipients(args) => run_recipients(args),
    }
}
