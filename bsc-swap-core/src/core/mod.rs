//! Core swap functionality
//!
//! This module contains the session state machine, the network guard, the
//! debounced quote engine, the swap executor, and the balance book.

pub mod session;
pub mod network;
pub mod quote;
pub mod swap;
pub mod balances;

pub use balances::BalanceBook;
pub use network::{require_target, NetworkGuard};
pub use quote::QuoteEngine;
pub use session::{ConnectOutcome, SessionListener, SessionSnapshot, WalletSession};
pub use swap::{ExecutorState, SwapExecutor, SwapReceipt};
