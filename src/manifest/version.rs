//! Manifest version: SHA-256 over the manifest's canonical JSON.
//!
//! Providers recompute `sha256(json(manifest))` with Go's encoder, which
//! emits object keys in sorted order. `serde_json::Map` is a `BTreeMap`
//! unless the `preserve_order` feature is enabled, so going through
//! `serde_json::Value` yields the same key order.

use super::Manifest;
use crate::error::DeployError;
use sha2::{Digest, Sha256};

/// Serialize with object keys sorted at every depth.
pub fn to_canonical_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, DeployError> {
    let value = serde_json::to_value(value)
        .map_err(|e| DeployError::Manifest(format!("json error: {}", e)))?;
    serde_json::to_vec(&value).map_err(|e| DeployError::Manifest(format!("json error: {}", e)))
}

/// The 32-byte version hash carried by `MsgCreateDeployment`.
pub fn manifest_version(manifest: &Manifest) -> Result<Vec<u8>, DeployError> {
    let json = to_canonical_json(manifest)?;
    Ok(Sha256::digest(&json).to_vec())
}
