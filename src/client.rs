//! Default chain client built on layer-climb.
//!
//! ```ignore
//! use akash_deployer::{AkashClient, ChainBackend, Config, DeploymentData};
//!
//! let keybase = config.keybase(&home)?;
//! let client = AkashClient::connect(&config, &keybase).await?;
//! let deployment = DeploymentData::from_sdl_file("deploy.yaml", client.address(), None, &client).await?;
//! let result = client.send(&deployment.msg_create()).await?;
//! ```

use crate::backend::ChainBackend;
use crate::config::Config;
use crate::error::DeployError;
use crate::keys::{Keybase, DEFAULT_KEY};
use crate::msg::ACCOUNT_PREFIX;
use crate::types::{TxEvent, TxMsg, TxResult};

use layer_climb::prelude::*;

pub use layer_climb::prelude::KeySigner;

/// Signing client for one account on one chain.
pub struct AkashClient {
    client: SigningClient,
    address: Address,
    gas_adjustment: f32,
}

impl AkashClient {
    /// Connect using the chain settings in `config` and the default key in
    /// `keybase`.
    pub async fn connect(config: &Config, keybase: &Keybase) -> Result<Self, DeployError> {
        let signer = keybase.signer(DEFAULT_KEY)?;
        let gas = config.gas_price()?;

        let chain_config = ChainConfig {
            chain_id: ChainId::new(config.chain_id.clone()),
            address_kind: AddrKind::Cosmos {
                prefix: ACCOUNT_PREFIX.to_string(),
            },
            gas_price: gas.amount as f32,
            gas_denom: gas.denom,
            rpc_endpoint: Some(config.rpc_addr.clone()),
            grpc_endpoint: None,
            grpc_web_endpoint: None,
        };

        let client = SigningClient::new(chain_config, signer, None::<Connection>)
            .await
            .map_err(|e| DeployError::Query(format!("failed to create signing client: {}", e)))?;
        let address = client.addr.clone();

        tracing::info!(address = %address, chain_id = %config.chain_id, "connected");

        Ok(Self {
            client,
            address,
            gas_adjustment: config.gas_adjustment as f32,
        })
    }

    pub fn signing_client(&self) -> &SigningClient {
        &self.client
    }

    /// Spendable balance of the signing account in `denom`.
    pub async fn balance(&self, denom: &str) -> Result<u128, DeployError> {
        let balance = self
            .client
            .querier
            .balance(self.address.clone(), Some(denom.to_string()))
            .await
            .map_err(|e| DeployError::Query(format!("failed to query balance: {}", e)))?;
        Ok(balance.unwrap_or(0))
    }
}

impl ChainBackend for AkashClient {
    fn address(&self) -> String {
        self.address.to_string()
    }

    async fn block_height(&self) -> Result<u64, DeployError> {
        self.client
            .querier
            .block_height()
            .await
            .map_err(|e| DeployError::Query(format!("failed to query block height: {}", e)))
    }

    async fn send_msgs(&self, msgs: Vec<TxMsg>) -> Result<TxResult, DeployError> {
        if msgs.is_empty() {
            return Err(DeployError::Validation("no messages to send".into()));
        }
        let types: Vec<String> = msgs.iter().map(|m| m.type_url.clone()).collect();
        tracing::debug!(?types, "broadcasting");

        let anys: Vec<layer_climb::proto::Any> = msgs
            .into_iter()
            .map(|m| layer_climb::proto::Any {
                type_url: m.type_url,
                value: m.value,
            })
            .collect();

        let mut tx = self.client.tx_builder();
        tx.set_gas_simulate_multiplier(self.gas_adjustment);
        let response = tx.broadcast(anys).await.map_err(|e| DeployError::Transaction {
            code: 1,
            log: format!("failed to broadcast transaction: {}", e),
        })?;

        if response.code != 0 {
            tracing::warn!(hash = %response.txhash, code = response.code, "transaction rejected");
            return Err(DeployError::Transaction {
                code: response.code,
                log: response.raw_log,
            });
        }

        tracing::info!(hash = %response.txhash, height = response.height, "transaction committed");

        Ok(TxResult {
            hash: response.txhash,
            code: response.code,
            raw_log: response.raw_log,
            height: response.height.max(0) as u64,
            gas_used: response.gas_used.max(0) as u64,
            events: response
                .events
                .iter()
                .map(|event| TxEvent {
                    kind: event.r#type.clone(),
                    attributes: event
                        .attributes
                        .iter()
                        .map(|a| (a.key.clone(), a.value.clone()))
                        .collect(),
                })
                .collect(),
        })
    }
}
