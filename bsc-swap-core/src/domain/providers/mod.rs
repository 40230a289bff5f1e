//! Capability traits the swap core consumes
//!
//! The wallet extension and the chain node sit behind these traits so the
//! session, quoting and execution logic can run against any backend.

pub mod wallet_provider;
pub mod chain_client;

// Re-export providers
pub use wallet_provider::*;
pub use chain_client::*;
