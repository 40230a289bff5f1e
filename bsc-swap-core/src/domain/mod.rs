//! Domain layer - entities and capability traits
//!
//! This module contains the domain types and the external capabilities the
//! swap core is written against.

pub mod entities;
pub mod providers;

// Re-export domain components
pub use entities::*;
pub use providers::*;
