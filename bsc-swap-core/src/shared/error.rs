//! Error handling for the swap core
//!
//! This module defines the error types used throughout the swap core.

use thiserror::Error;

/// EIP-1193 code for a request the user declined in the wallet.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Code returned by `wallet_switchEthereumChain` when the wallet has no
/// parameters for the requested chain.
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

/// Error object reported by the wallet provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("provider error {code}: {message}")]
pub struct ProviderRpcError {
    pub code: i64,
    pub message: String,
}

impl ProviderRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn user_rejected() -> Self {
        Self::new(USER_REJECTED_CODE, "User rejected the request")
    }

    pub fn unrecognized_chain(chain_id_hex: &str) -> Self {
        Self::new(
            UNRECOGNIZED_CHAIN_CODE,
            format!("Unrecognized chain ID \"{}\"", chain_id_hex),
        )
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == USER_REJECTED_CODE
    }

    pub fn is_unrecognized_chain(&self) -> bool {
        self.code == UNRECOGNIZED_CHAIN_CODE
    }
}

/// Swap core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SwapError {
    #[error("No wallet provider available, install one from {install_url}")]
    NoWalletProvider { install_url: String },

    #[error("User rejected the request: {0}")]
    UserRejected(String),

    #[error("No accounts available: {0}")]
    NoAccounts(String),

    #[error("A connection attempt is already in progress")]
    ConnectInProgress,

    #[error("Wallet is not connected")]
    NotConnected,

    #[error("Wrong network: connected to {actual:?}, expected {expected}")]
    WrongNetwork { expected: u64, actual: Option<u64> },

    #[error("Network switch rejected: {0}")]
    NetworkSwitchRejected(String),

    #[error("Network switch failed: {0}")]
    NetworkSwitchFailed(String),

    #[error("Quote unavailable: {0}")]
    QuoteUnavailable(String),

    #[error("Insufficient balance: need {required}, have {available}")]
    InsufficientBalance { required: String, available: String },

    #[error("Approval failed: {0}")]
    ApprovalFailed(String),

    #[error("Swap failed: {0}")]
    SwapFailed(String),

    #[error("A swap is already in progress")]
    SwapInProgress,

    #[error("Session changed while the operation was pending: {0}")]
    SessionChanged(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Provider(#[from] ProviderRpcError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SwapError {
    pub fn no_wallet_provider(install_url: impl Into<String>) -> Self {
        Self::NoWalletProvider { install_url: install_url.into() }
    }

    pub fn user_rejected(message: impl Into<String>) -> Self {
        Self::UserRejected(message.into())
    }

    pub fn network_switch_rejected(message: impl Into<String>) -> Self {
        Self::NetworkSwitchRejected(message.into())
    }

    pub fn network_switch_failed(message: impl Into<String>) -> Self {
        Self::NetworkSwitchFailed(message.into())
    }

    pub fn quote_unavailable(message: impl Into<String>) -> Self {
        Self::QuoteUnavailable(message.into())
    }

    pub fn approval_failed(message: impl Into<String>) -> Self {
        Self::ApprovalFailed(message.into())
    }

    pub fn swap_failed(message: impl Into<String>) -> Self {
        Self::SwapFailed(message.into())
    }

    pub fn session_changed(message: impl Into<String>) -> Self {
        Self::SessionChanged(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// True when the user declined something in the wallet.
    pub fn is_user_rejection(&self) -> bool {
        match self {
            Self::UserRejected(_) | Self::NetworkSwitchRejected(_) => true,
            Self::Provider(err) => err.is_user_rejection(),
            _ => false,
        }
    }

    /// Errors that leave the session usable in a degraded form rather than
    /// aborting anything the user has to redo.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UserRejected(_)
                | Self::NetworkSwitchRejected(_)
                | Self::NetworkSwitchFailed(_)
                | Self::QuoteUnavailable(_)
                | Self::WrongNetwork { .. }
                | Self::InsufficientBalance { .. }
        )
    }
}

impl From<serde_json::Error> for SwapError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON error: {}", err))
    }
}

impl From<tokio::time::error::Elapsed> for SwapError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        Self::network(format!("Timed out: {}", err))
    }
}

impl From<ethers::providers::ProviderError> for SwapError {
    fn from(err: ethers::providers::ProviderError) -> Self {
        Self::network(format!("RPC error: {}", err))
    }
}

impl From<ethers::abi::Error> for SwapError {
    fn from(err: ethers::abi::Error) -> Self {
        Self::internal(format!("ABI error: {}", err))
    }
}

impl From<ethers::utils::ConversionError> for SwapError {
    fn from(err: ethers::utils::ConversionError) -> Self {
        Self::validation(format!("Amount conversion error: {}", err))
    }
}
