//! Infrastructure layer - concrete backends
//!
//! This module contains the ethers-based implementations of the wallet and
//! chain capabilities the core is written against.

pub mod rpc;

// Re-export infrastructure components
pub use rpc::*;
