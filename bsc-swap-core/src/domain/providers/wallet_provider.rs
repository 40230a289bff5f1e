//! Wallet provider capability (EIP-1193 shaped)

use crate::domain::entities::network::AddChainParameters;
use crate::domain::providers::chain_client::ChainClient;
use crate::shared::error::{ProviderRpcError, SwapError};
use crate::shared::types::{Address, ChainId, WalletEvent};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Browser-style wallet: account access, chain management, and push events
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the user to expose accounts (`eth_requestAccounts`).
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderRpcError>;

    /// Accounts already authorized for this origin (`eth_accounts`), no prompt.
    async fn list_accounts(&self) -> Result<Vec<Address>, ProviderRpcError>;

    async fn chain_id(&self) -> Result<ChainId, ProviderRpcError>;

    /// `wallet_switchEthereumChain`; fails with code 4902 for unknown chains.
    async fn switch_chain(&self, chain_id_hex: &str) -> Result<(), ProviderRpcError>;

    /// `wallet_addEthereumChain`; the wallet switches as part of registration.
    async fn add_chain(&self, params: &AddChainParameters) -> Result<(), ProviderRpcError>;

    /// New receiver for account/chain notifications. Dropping it unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<WalletEvent>;

    /// Chain client that signs through this wallet as `account`.
    fn chain_client(&self, account: Address) -> Result<Arc<dyn ChainClient>, SwapError>;
}
