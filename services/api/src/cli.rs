use crate::demo::{run_balances, run_demo, BalanceArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use leave_portal::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Leave Portal",
    about = "Run the leave portal service or inspect leave data from the command line",
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
    /// Compute a balance report from a CSV export of leave records
    Balances(BalanceArgs),
    /// Walk sample requests through submission, review, and balance accounting
    Demo(DemoArgs),
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
        Command::Balances(args) => run_balances(args),
        Command::Demo(args) => run_demo(args),
    }
}
