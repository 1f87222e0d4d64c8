//! Command handlers. Each receives the [`Context`](akash_deployer::Context)
//! built in `main`; none of them read process-wide state.

pub mod config;
pub mod deploy;
pub mod keys;
pub mod status;
