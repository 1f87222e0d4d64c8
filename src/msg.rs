//! Local validation of chain messages and packing into [`TxMsg`].
//!
//! Every message goes through [`ValidateBasic`] before it reaches the
//! transaction pipeline, so a malformed message fails without a network call.

use crate::error::DeployError;
use crate::gen::akash::deployment::v1::DeploymentId;
use crate::gen::akash::deployment::v1beta4::{GroupSpec, MsgCloseDeployment, MsgCreateDeployment};
use crate::gen::cosmos::base::v1beta1::Coin;
use crate::types::TxMsg;
use prost::{Message, Name};

/// Bech32 human-readable part of Akash account addresses.
pub const ACCOUNT_PREFIX: &str = "akash";

/// Length of the manifest hash carried by `MsgCreateDeployment`.
const HASH_LEN: usize = 32;

/// Stateless checks a message must pass before signing.
pub trait ValidateBasic {
    fn validate_basic(&self) -> Result<(), DeployError>;
}

/// A message that can be broadcast.
pub trait ChainMsg: ValidateBasic + Message + Name + Sized {
    /// Validate, then encode into the `Any` shape.
    fn to_tx_msg(&self) -> Result<TxMsg, DeployError> {
        self.validate_basic()?;
        Ok(TxMsg {
            type_url: Self::type_url(),
            value: self.encode_to_vec(),
        })
    }
}

impl ChainMsg for MsgCreateDeployment {}
impl ChainMsg for MsgCloseDeployment {}

/// Parse an integer coin such as `5000000uakt`.
pub fn parse_coin(s: &str) -> Result<Coin, DeployError> {
    let s = s.trim();
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (amount, denom) = s.split_at(split);
    if amount.is_empty() || denom.is_empty() || amount.parse::<u128>().is_err() {
        return Err(DeployError::Validation(format!("invalid coin: '{}'", s)));
    }
    if !denom.chars().all(|c| c.is_ascii_alphanumeric() || c == '/') {
        return Err(DeployError::Validation(format!("invalid denom in '{}'", s)));
    }
    Ok(Coin {
        denom: denom.to_string(),
        amount: amount.to_string(),
    })
}

fn validate_id(id: Option<&DeploymentId>) -> Result<(), DeployError> {
    let id = id.ok_or_else(|| DeployError::Validation("missing deployment id".into()))?;
    validate_owner(&id.owner)?;
    if id.dseq == 0 {
        return Err(DeployError::Validation("dseq must be non-zero".into()));
    }
    Ok(())
}

/// Shape check only; checksum verification is left to the chain.
fn validate_owner(owner: &str) -> Result<(), DeployError> {
    if owner.is_empty() {
        return Err(DeployError::Validation("empty owner address".into()));
    }
    let prefix = format!("{}1", ACCOUNT_PREFIX);
    let valid = owner.starts_with(&prefix)
        && owner.len() > prefix.len()
        && owner[prefix.len()..]
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if !valid {
        return Err(DeployError::Validation(format!(
            "invalid owner address: {}",
            owner
        )));
    }
    Ok(())
}

fn validate_group(group: &GroupSpec) -> Result<(), DeployError> {
    if group.name.trim().is_empty() {
        return Err(DeployError::Validation("group has no name".into()));
    }
    if group.resources.is_empty() {
        return Err(DeployError::Validation(format!(
            "group '{}' has no resources",
            group.name
        )));
    }
    for unit in &group.resources {
        if unit.count == 0 {
            return Err(DeployError::Validation(format!(
                "group '{}' has a resource unit with count 0",
                group.name
            )));
        }
        if unit.resource.is_none() {
            return Err(DeployError::Validation(format!(
                "group '{}' has a resource unit without resources",
                group.name
            )));
        }
        let price = unit.price.as_ref().ok_or_else(|| {
            DeployError::Validation(format!("group '{}' has an unpriced resource unit", group.name))
        })?;
        if price.denom.is_empty() || price.amount.is_empty() {
            return Err(DeployError::Validation(format!(
                "group '{}' has an invalid price",
                group.name
            )));
        }
    }
    Ok(())
}

impl ValidateBasic for MsgCreateDeployment {
    fn validate_basic(&self) -> Result<(), DeployError> {
        validate_id(self.id.as_ref())?;
        if self.groups.is_empty() {
            return Err(DeployError::Validation("deployment has no groups".into()));
        }
        for group in &self.groups {
            validate_group(group)?;
        }
        if self.hash.len() != HASH_LEN {
            return Err(DeployError::Validation(format!(
                "manifest hash must be {} bytes, got {}",
                HASH_LEN,
                self.hash.len()
            )));
        }
        let deposit_amount = self
            .deposit
            .as_ref()
            .and_then(|d| d.amount.as_ref())
            .ok_or_else(|| DeployError::Validation("missing deposit".into()))?;
        if deposit_amount.amount.parse::<u128>().is_err() || deposit_amount.denom.is_empty() {
            return Err(DeployError::Validation(format!(
                "invalid deposit: {}{}",
                deposit_amount.amount, deposit_amount.denom
            )));
        }
        Ok(())
    }
}

impl ValidateBasic for MsgCloseDeployment {
    fn validate_basic(&self) -> Result<(), DeployError> {
        validate_id(self.id.as_ref())
    }
}
