//! akash-deployer CLI - create and track deployments on Akash.

mod commands;

use akash_deployer::config::{default_home, Context};
use akash_deployer::DeployError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "akash-deployer")]
#[command(about = "Create and track deployments on the Akash network")]
#[command(version)]
struct Cli {
    /// Directory holding config.yaml and the keyfile (default ~/.akash-deployer)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the deployer configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Manage the signing key
    #[command(subcommand)]
    Keys(commands::keys::KeysCommand),

    /// Show account, chain height and balance
    Status,

    /// Create, close and inspect deployments
    #[command(subcommand)]
    Deploy(commands::deploy::DeployCommand),
}

async fn run(cli: Cli) -> Result<(), DeployError> {
    let home = cli.home.unwrap_or_else(default_home);

    // These two run without a valid config.
    let command = match cli.command {
        Commands::Config(commands::config::ConfigCommand::Init {
            chain_id,
            rpc_addr,
            force,
        }) => return commands::config::init(&home, chain_id, rpc_addr, force),
        Commands::Deploy(commands::deploy::DeployCommand::Manifest { file }) => {
            return commands::deploy::manifest(file)
        }
        other => other,
    };

    let ctx = Context::new(home)?;
    match command {
        Commands::Config(cmd) => commands::config::run(&ctx, cmd),
        Commands::Keys(cmd) => commands::keys::run(&ctx, cmd).await,
        Commands::Status => commands::status::run(&ctx).await,
        Commands::Deploy(cmd) => commands::deploy::run(&ctx, cmd).await,
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // RUST_LOG=debug shows tracker and broadcast details
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
