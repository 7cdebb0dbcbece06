use crate::commands::{run_document_check, run_scheme_finder, DocumentArgs, SchemeArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use scheme_desk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "SchemeDesk",
    about = "Match applicants to welfare schemes, check documents and score rejection risk",
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
    /// Rank the catalog's schemes for a profile and print the eligible ones
    Schemes(SchemeArgs),
    /// Run the document validation pipeline on upload metadata
    Document(DocumentArgs),
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
        Command::Schemes(args) => run_scheme_finder(args),
        Command::Document(args) => run_document_check(args),
    }
}
