//! `akash-deployer status`

use akash_deployer::{AkashClient, ChainBackend, Context, DeployError};

pub async fn run(ctx: &Context) -> Result<(), DeployError> {
    let config = ctx.config()?;
    let client = AkashClient::connect(config, &ctx.keybase()?).await?;

    let height = client.block_height().await?;
    let balance = client.balance("uakt").await?;

    println!("chain-id: {}", config.chain_id);
    println!("rpc-addr: {}", config.rpc_addr);
    println!("address:  {}", client.address());
    println!("height:   {}", height);
    println!("balance:  {}uakt", balance);
    Ok(())
}
