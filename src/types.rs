//! Chain identifiers and transaction results.
//!
//! Plain value types. Equality is by value, which is what the tracker relies
//! on when it removes an order or lease.

use crate::gen::akash::deployment::v1 as deployment_v1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deployment identifier: owner address + deployment sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeploymentId {
    pub owner: String,
    pub dseq: u64,
}

impl DeploymentId {
    pub fn new(owner: impl Into<String>, dseq: u64) -> Self {
        Self {
            owner: owner.into(),
            dseq,
        }
    }

    pub fn to_proto(&self) -> deployment_v1::DeploymentId {
        deployment_v1::DeploymentId {
            owner: self.owner.clone(),
            dseq: self.dseq,
        }
    }
}

impl fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.dseq)
    }
}

/// Group identifier: a deployment plus the group's sequence (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId {
    pub owner: String,
    pub dseq: u64,
    pub gseq: u32,
}

impl GroupId {
    pub fn new(deployment: &DeploymentId, gseq: u32) -> Self {
        Self {
            owner: deployment.owner.clone(),
            dseq: deployment.dseq,
            gseq,
        }
    }
}

/// Order identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId {
    pub owner: String,
    pub dseq: u64,
    pub gseq: u32,
    pub oseq: u32,
}

impl OrderId {
    pub fn new(group: &GroupId, oseq: u32) -> Self {
        Self {
            owner: group.owner.clone(),
            dseq: group.dseq,
            gseq: group.gseq,
            oseq,
        }
    }

    pub fn group_id(&self) -> GroupId {
        GroupId {
            owner: self.owner.clone(),
            dseq: self.dseq,
            gseq: self.gseq,
        }
    }

    /// Whether this order was placed for the given deployment.
    pub fn belongs_to(&self, deployment: &DeploymentId) -> bool {
        self.owner == deployment.owner && self.dseq == deployment.dseq
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}/{}", self.owner, self.dseq, self.gseq, self.oseq)
    }
}

/// Lease identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaseId {
    pub owner: String,
    pub dseq: u64,
    pub gseq: u32,
    pub oseq: u32,
    pub provider: String,
}

impl LeaseId {
    /// A lease is an order fulfilled by a provider.
    pub fn new(order: &OrderId, provider: impl Into<String>) -> Self {
        Self {
            owner: order.owner.clone(),
            dseq: order.dseq,
            gseq: order.gseq,
            oseq: order.oseq,
            provider: provider.into(),
        }
    }

    pub fn order_id(&self) -> OrderId {
        OrderId {
            owner: self.owner.clone(),
            dseq: self.dseq,
            gseq: self.gseq,
            oseq: self.oseq,
        }
    }

    pub fn belongs_to(&self, deployment: &DeploymentId) -> bool {
        self.owner == deployment.owner && self.dseq == deployment.dseq
    }
}

impl fmt::Display for LeaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.owner, self.dseq, self.gseq, self.oseq, self.provider
        )
    }
}

/// A chain message packed for broadcast (the `Any` shape, decoupled from
/// any particular client library's proto types).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxMsg {
    pub type_url: String,
    pub value: Vec<u8>,
}

/// An ABCI event emitted by a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxEvent {
    pub kind: String,
    pub attributes: Vec<(String, String)>,
}

impl TxEvent {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// First value for `key`, if present.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Transaction result from broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxResult {
    pub hash: String,
    pub code: u32,
    pub raw_log: String,
    pub height: u64,
    pub gas_used: u64,
    pub events: Vec<TxEvent>,
}

impl TxResult {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}
