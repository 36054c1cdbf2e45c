#![forbid(unsafe_code)]
#![allow(unreachable_pub)]

use clap::{Parser, Subcommand};
use offer_cli::config::{Environment, Settings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "offers")]
#[command(about = "Build and submit signed NFT sale-with-buyback offer batches", long_about = None)]
#[command(version)]
struct Cli {
    /// Target environment (selects namespace and API base)
    #[arg(long, value_enum, env = "NFPAWN_ENV", default_value_t = Environment::Main, global = true)]
    env: Environment,

    /// Override the claim namespace
    #[arg(long, env = "NFPAWN_NAMESPACE", global = true)]
    namespace: Option<String>,

    /// Override the API base URL
    #[arg(long, env = "NFPAWN_API_BASE", global = true)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build and sign offers from a CSV file
    Build(commands::build::Cli),
    /// Post a previously built offers file
    Submit(commands::submit::Cli),
    /// Build, sign and submit in one go
    Execute(commands::execute::Cli),
    /// Print the account of the configured key
    Account(commands::account::Cli),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = Settings::resolve(cli.env, cli.namespace, cli.api_base);
    tracing::debug!(?settings, "Resolved settings");

    match cli.command {
        Commands::Build(args) => commands::build::run(args, &settings).await?,
        Commands::Submit(args) => commands::submit::run(args, &settings).await?,
        Commands::Execute(args) => commands::execute::run(args, &settings).await?,
        Commands::Account(args) => commands::account::run(args)?,
    }

    Ok(())
}
