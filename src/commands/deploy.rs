//! `akash-deployer deploy ...`

use akash_deployer::{
    manifest_version, parse_coin, AkashClient, ChainBackend, Context, DeployError,
    DeploymentData, Manifest, MarketEvent, Sdl,
};
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum DeployCommand {
    /// Create a deployment from an SDL file
    Create {
        /// SDL file
        file: PathBuf,

        /// Deployment sequence (defaults to the current block height)
        #[arg(long)]
        dseq: Option<u64>,

        /// Escrow deposit, e.g. 5000000uakt (defaults to the config's deposit)
        #[arg(long)]
        deposit: Option<String>,
    },

    /// Close a deployment
    Close {
        #[arg(long)]
        dseq: u64,
    },

    /// Print the manifest and version hash for an SDL file (offline)
    Manifest {
        /// SDL file
        file: PathBuf,
    },
}

pub async fn run(ctx: &Context, cmd: DeployCommand) -> Result<(), DeployError> {
    match cmd {
        DeployCommand::Create {
            file,
            dseq,
            deposit,
        } => create(ctx, file, dseq, deposit).await,
        DeployCommand::Close { dseq } => close(ctx, dseq).await,
        DeployCommand::Manifest { file } => manifest(file),
    }
}

async fn create(
    ctx: &Context,
    file: PathBuf,
    dseq: Option<u64>,
    deposit: Option<String>,
) -> Result<(), DeployError> {
    let config = ctx.config()?;
    let deposit = match deposit {
        Some(d) => parse_coin(&d)?,
        None => config.deposit_coin()?,
    };
    let client = AkashClient::connect(config, &ctx.keybase()?).await?;

    let deployment = DeploymentData::from_sdl_file(&file, client.address(), dseq, &client)
        .await?
        .with_deposit(deposit);

    let result = client.send(&deployment.msg_create()).await?;
    for event in MarketEvent::collect(&result.events) {
        deployment.apply(&event);
    }

    println!("deployment: {}", deployment.id());
    println!("tx:         {} (height {})", result.hash, result.height);
    println!("version:    {}", hex::encode(deployment.version()));
    for order in deployment.orders() {
        println!("order:      {}", order);
    }

    if deployment.expected_orders() {
        tracing::info!(groups = deployment.groups().len(), "all orders placed");
    } else {
        tracing::warn!(
            orders = deployment.orders().len(),
            groups = deployment.groups().len(),
            "transaction did not report an order for every group"
        );
    }
    Ok(())
}

async fn close(ctx: &Context, dseq: u64) -> Result<(), DeployError> {
    let config = ctx.config()?;
    let client = AkashClient::connect(config, &ctx.keybase()?).await?;

    let deployment = DeploymentData::for_owner(client.address()).with_dseq(dseq);
    let result = client.send(&deployment.msg_close()).await?;

    println!("closed:     {}", deployment.id());
    println!("tx:         {} (height {})", result.hash, result.height);
    Ok(())
}

/// Offline: needs neither config nor key.
pub fn manifest(file: PathBuf) -> Result<(), DeployError> {
    let content = std::fs::read(&file)?;
    let sdl = Sdl::read(&content)?;
    let manifest = Manifest::from_sdl(&sdl)?;
    let version = manifest_version(&manifest)?;

    let json = serde_json::to_string_pretty(&manifest)
        .map_err(|e| DeployError::Manifest(format!("json error: {}", e)))?;
    println!("{}", json);
    eprintln!("version: {}", hex::encode(version));
    Ok(())
}
