//! `akash-deployer config ...`

use akash_deployer::{Config, Context, DeployError};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Write a new config.yaml
    Init {
        /// Chain id, e.g. akashnet-2
        #[arg(long)]
        chain_id: String,

        /// Tendermint RPC endpoint
        #[arg(long)]
        rpc_addr: String,

        /// Replace an existing config
        #[arg(long)]
        force: bool,
    },

    /// Print the current config
    Show,
}

pub fn init(home: &Path, chain_id: String, rpc_addr: String, force: bool) -> Result<(), DeployError> {
    let path = Config::path(home);
    if path.exists() && !force {
        return Err(DeployError::Config(format!(
            "config file {} already exists (use --force to replace it)",
            path.display()
        )));
    }

    let config = Config::default_for(chain_id, rpc_addr);
    config.validate()?;
    config.write(home)?;

    println!("wrote {}", path.display());
    println!("next: akash-deployer keys create");
    Ok(())
}

pub fn run(ctx: &Context, cmd: ConfigCommand) -> Result<(), DeployError> {
    match cmd {
        ConfigCommand::Init { .. } => Err(DeployError::Config(
            "config init is handled before the config is loaded".into(),
        )),
        ConfigCommand::Show => {
            let mut shown = ctx.config()?.clone();
            shown.keypass = "********".to_string();
            let yaml = serde_yaml::to_string(&shown)
                .map_err(|e| DeployError::Config(format!("failed to render config: {}", e)))?;
            print!("{}", yaml);
            Ok(())
        }
    }
}
