//! Akash Deployer Library
//!
//! Create deployments on the Akash network from an SDL file and track the
//! orders and leases the market produces for them.
//!
//! # Design
//!
//! [`DeploymentData`] is the client-side record of one deployment. It is
//! built once from an SDL file (groups, manifest, version hash) and then
//! updated from market events, possibly from several tasks at once. The
//! network sits behind [`ChainBackend`]; [`AkashClient`] implements it with
//! layer-climb, tests implement it in memory.
//!
//! # Usage
//!
//! ```ignore
//! use akash_deployer::{AkashClient, ChainBackend, Config, DeploymentData, MarketEvent};
//! use std::sync::Arc;
//!
//! let config = Config::load(&home)?;
//! let client = AkashClient::connect(&config, &config.keybase(&home)?).await?;
//!
//! let deployment = Arc::new(
//!     DeploymentData::from_sdl_file("deploy.yaml", client.address(), None, &client)
//!         .await?
//!         .with_deposit(config.deposit_coin()?),
//! );
//! let result = client.send(&deployment.msg_create()).await?;
//! for event in MarketEvent::collect(&result.events) {
//!     deployment.apply(&event);
//! }
//! ```

pub mod backend;
pub mod config;
pub mod deployment;
pub mod error;
pub mod gen;
pub mod keys;
pub mod manifest;
pub mod msg;
pub mod sdl;
pub mod types;

#[cfg(feature = "default-client")]
pub mod client;

pub use backend::ChainBackend;
pub use config::{Config, Context};
pub use deployment::{DeploymentData, MarketEvent};
pub use error::DeployError;
pub use keys::{Keybase, DEFAULT_KEY};
pub use manifest::{manifest_version, to_canonical_json, Manifest};
pub use msg::{parse_coin, ChainMsg, ValidateBasic};
pub use sdl::Sdl;
pub use types::*;

#[cfg(feature = "default-client")]
pub use client::{AkashClient, KeySigner};
