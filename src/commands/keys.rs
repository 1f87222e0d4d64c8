//! `akash-deployer keys ...`

use akash_deployer::keys::{create_keyfile, DEFAULT_KEY};
use akash_deployer::msg::ACCOUNT_PREFIX;
use akash_deployer::{Context, DeployError};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum KeysCommand {
    /// Generate a new key and write the keyfile named in the config
    Create,

    /// Print the account address of the configured key
    Show,
}

pub async fn run(ctx: &Context, cmd: KeysCommand) -> Result<(), DeployError> {
    let config = ctx.config()?;
    match cmd {
        KeysCommand::Create => {
            let path = config.keyfile_path(&ctx.home);
            let mnemonic = create_keyfile(&path, &config.keypass)?;
            let address = ctx.keybase()?.address(DEFAULT_KEY, ACCOUNT_PREFIX).await?;

            println!("created {}", path.display());
            println!("address: {}", address);
            println!();
            println!("Write this mnemonic down; it is the only way to recover the key:");
            println!();
            println!("{}", mnemonic);
            Ok(())
        }
        KeysCommand::Show => {
            let address = ctx.keybase()?.address(DEFAULT_KEY, ACCOUNT_PREFIX).await?;
            println!("{}", address);
            Ok(())
        }
    }
}
