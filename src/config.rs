//! Deployer configuration, `<home>/config.yaml`.
//!
//! ```yaml
//! chain-id: akashnet-2
//! rpc-addr: https://rpc.akashnet.net:443
//! keyfile: key.priv
//! keypass: "12345678"
//! gas-adjustment: 1.5
//! gas-prices: 0.025uakt
//! deposit: 5000000uakt
//! ```
//!
//! The config is loaded once and handed to each command inside a
//! [`Context`]; nothing here is process-wide.

use crate::error::DeployError;
use crate::gen::cosmos::base::v1beta1::Coin;
use crate::keys::{self, Keybase};
use crate::msg::parse_coin;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_HOME_DIR: &str = ".akash-deployer";
pub const DEFAULT_KEYFILE: &str = "key.priv";
pub const DEFAULT_KEYPASS: &str = "12345678";

fn default_gas_adjustment() -> f64 {
    1.5
}

fn default_gas_prices() -> String {
    "0.025uakt".to_string()
}

fn default_deposit() -> String {
    "5000000uakt".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub chain_id: String,
    pub rpc_addr: String,
    pub keyfile: String,
    pub keypass: String,
    #[serde(default = "default_gas_adjustment")]
    pub gas_adjustment: f64,
    #[serde(default = "default_gas_prices")]
    pub gas_prices: String,
    #[serde(default = "default_deposit")]
    pub deposit: String,
}

/// Gas price split into amount and denom.
#[derive(Debug, Clone, PartialEq)]
pub struct GasPrice {
    pub amount: f64,
    pub denom: String,
}

impl Config {
    /// Config written by `config init`.
    pub fn default_for(chain_id: impl Into<String>, rpc_addr: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            rpc_addr: rpc_addr.into(),
            keyfile: DEFAULT_KEYFILE.to_string(),
            keypass: DEFAULT_KEYPASS.to_string(),
            gas_adjustment: default_gas_adjustment(),
            gas_prices: default_gas_prices(),
            deposit: default_deposit(),
        }
    }

    pub fn path(home: &Path) -> PathBuf {
        home.join(CONFIG_FILE)
    }

    /// Load and validate `<home>/config.yaml`.
    ///
    /// A missing keyfile is not an error here so that `keys create` can run;
    /// commands that sign fail later in [`Config::keybase`].
    pub fn load(home: &Path) -> Result<Self, DeployError> {
        let path = Self::path(home);
        if !path.exists() {
            return Err(DeployError::Config(format!(
                "config file {} doesn't exist",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| DeployError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;

        let keyfile = config.keyfile_path(home);
        if !keyfile.exists() {
            tracing::warn!(
                path = %keyfile.display(),
                "private key specified in the config file doesn't exist"
            );
        }

        tracing::debug!(chain_id = %config.chain_id, rpc = %config.rpc_addr, "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DeployError> {
        if self.chain_id.trim().is_empty() {
            return Err(DeployError::Config("chain-id is empty".into()));
        }

        let url = url::Url::parse(&self.rpc_addr)
            .map_err(|e| DeployError::Config(format!("invalid rpc-addr '{}': {}", self.rpc_addr, e)))?;
        if !matches!(url.scheme(), "http" | "https" | "ws" | "wss") {
            return Err(DeployError::Config(format!(
                "rpc-addr '{}' must use http, https, ws or wss",
                self.rpc_addr
            )));
        }
        if url.host_str().is_none() {
            return Err(DeployError::Config(format!(
                "rpc-addr '{}' has no host",
                self.rpc_addr
            )));
        }

        if self.keyfile.trim().is_empty() {
            return Err(DeployError::Config("keyfile is empty".into()));
        }
        if !(self.gas_adjustment.is_finite() && self.gas_adjustment > 0.0) {
            return Err(DeployError::Config(format!(
                "gas-adjustment must be positive, got {}",
                self.gas_adjustment
            )));
        }
        self.gas_price()?;
        self.deposit_coin()?;
        Ok(())
    }

    /// Write `<home>/config.yaml` atomically, creating `home` if needed.
    pub fn write(&self, home: &Path) -> Result<(), DeployError> {
        std::fs::create_dir_all(home)?;
        let out = serde_yaml::to_string(self)
            .map_err(|e| DeployError::Config(format!("failed to serialize config: {}", e)))?;

        let path = Self::path(home);
        // unique per writer, so concurrent writes only race on the rename
        let tmp = home.join(format!(
            ".{}.{}.{:08x}.tmp",
            CONFIG_FILE,
            std::process::id(),
            rand::random::<u32>()
        ));
        std::fs::write(&tmp, out)?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        tracing::info!(path = %path.display(), "wrote config");
        Ok(())
    }

    /// Keyfile path; relative paths are resolved against `home`.
    pub fn keyfile_path(&self, home: &Path) -> PathBuf {
        home.join(&self.keyfile)
    }

    pub fn gas_price(&self) -> Result<GasPrice, DeployError> {
        let s = self.gas_prices.trim();
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(s.len());
        let (amount, denom) = s.split_at(split);
        let amount: f64 = amount
            .parse()
            .map_err(|_| DeployError::Config(format!("invalid gas-prices '{}'", s)))?;
        if denom.is_empty() || amount < 0.0 {
            return Err(DeployError::Config(format!("invalid gas-prices '{}'", s)));
        }
        Ok(GasPrice {
            amount,
            denom: denom.to_string(),
        })
    }

    pub fn deposit_coin(&self) -> Result<Coin, DeployError> {
        parse_coin(&self.deposit)
            .map_err(|e| DeployError::Config(format!("invalid deposit: {}", e)))
    }

    /// Open the keyfile into a keybase.
    pub fn keybase(&self, home: &Path) -> Result<Keybase, DeployError> {
        keys::load_keyfile(&self.keyfile_path(home), &self.keypass)
    }
}

/// Default home: `~/.akash-deployer`.
pub fn default_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_HOME_DIR)
}

/// What every command handler receives.
#[derive(Debug, Clone)]
pub struct Context {
    pub home: PathBuf,
    config: Option<Config>,
}

impl Context {
    /// Load the config under `home` if there is one. Commands that need it
    /// call [`Context::config`].
    pub fn new(home: PathBuf) -> Result<Self, DeployError> {
        let config = if Config::path(&home).exists() {
            Some(Config::load(&home)?)
        } else {
            None
        };
        Ok(Self { home, config })
    }

    pub fn with_config(home: PathBuf, config: Config) -> Self {
        Self {
            home,
            config: Some(config),
        }
    }

    pub fn config(&self) -> Result<&Config, DeployError> {
        self.config.as_ref().ok_or_else(|| {
            DeployError::Config(format!(
                "config file {} doesn't exist; run `config init` first",
                Config::path(&self.home).display()
            ))
        })
    }

    pub fn keybase(&self) -> Result<Keybase, DeployError> {
        self.config()?.keybase(&self.home)
    }
}
