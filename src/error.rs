//! Error types for the deployer.
//!
//! One enum, string payloads, no `anyhow` in the library.

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("config error: {0}")]
    Config(String),

    #[error("key error: {0}")]
    Key(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid SDL: {0}")]
    Sdl(String),

    #[error("manifest build failed: {0}")]
    Manifest(String),

    #[error("invalid message: {0}")]
    Validation(String),

    #[error("chain query failed: {0}")]
    Query(String),

    #[error("transaction failed: code={code}, log={log}")]
    Transaction { code: u32, log: String },

    #[error("signer error: {0}")]
    Signer(String),
}

impl DeployError {
    /// Whether this error might be recoverable by retry.
    ///
    /// Nothing in this crate retries on its own; callers decide.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DeployError::Query(_))
    }
}
