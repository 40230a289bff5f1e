//! Domain entities and value objects
//!
//! This module contains the core domain entities and value objects
//! that represent the business concepts of a swap session.

pub mod network;
pub mod token;
pub mod quote;
pub mod intent;

// Re-export entities
pub use network::*;
pub use token::*;
pub use quote::*;
pub use intent::*;
