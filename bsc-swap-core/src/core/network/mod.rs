//! Network guard
//!
//! Keeps the wallet on the configured target chain. A switch the user
//! declines is reported but never fatal: the session stays connected with the
//! wrong-network flag set and the submit path disabled.

use crate::domain::entities::network::NetworkConfig;
use crate::domain::providers::WalletProvider;
use crate::shared::error::{ProviderRpcError, SwapError};
use crate::shared::types::{ChainId, NetworkStatus, SwapResult};
use std::sync::Arc;

/// Fail with `WrongNetwork` unless `current` is the target chain.
pub fn require_target(target: &NetworkConfig, current: Option<ChainId>) -> SwapResult<()> {
    if target.matches(current) {
        Ok(())
    } else {
        Err(SwapError::WrongNetwork { expected: target.chain_id, actual: current })
    }
}

#[derive(Clone)]
pub struct NetworkGuard {
    provider: Arc<dyn WalletProvider>,
    target: NetworkConfig,
}

impl NetworkGuard {
    pub fn new(provider: Arc<dyn WalletProvider>, target: NetworkConfig) -> Self {
        Self { provider, target }
    }

    pub fn target(&self) -> &NetworkConfig {
        &self.target
    }

    pub fn check(&self, current: Option<ChainId>) -> SwapResult<()> {
        require_target(&self.target, current)
    }

    /// Get the wallet onto the target chain, registering it first if the
    /// wallet does not know it.
    pub async fn ensure(&self, current: Option<ChainId>) -> SwapResult<NetworkStatus> {
        if self.target.matches(current) {
            return Ok(NetworkStatus::AlreadyOnTarget);
        }

        let chain_hex = self.target.chain_id_hex();
        log::info!(
            "Requesting switch from {:?} to {} ({})",
            current,
            self.target.chain_name,
            chain_hex
        );

        match self.provider.switch_chain(&chain_hex).await {
            Ok(()) => {
                log::info!("Switched to {}", self.target.chain_name);
                Ok(NetworkStatus::Switched)
            }
            Err(err) if err.is_unrecognized_chain() => {
                log::info!("{} unknown to wallet, registering it", self.target.chain_name);
                let params = self.target.add_chain_parameters();
                self.provider
                    .add_chain(&params)
                    .await
                    .map(|_| NetworkStatus::Added)
                    .map_err(|err| self.classify(err))
            }
            Err(err) => Err(self.classify(err)),
        }
    }

    fn classify(&self, err: ProviderRpcError) -> SwapError {
        if err.is_user_rejection() {
            log::warn!("User rejected switching to {}", self.target.chain_name);
            SwapError::network_switch_rejected(format!(
                "Switch to {} manually in the wallet: {}",
                self.target.chain_name, err.message
            ))
        } else {
            log::warn!("Switching to {} failed: {}", self.target.chain_name, err);
            SwapError::network_switch_failed(err.to_string())
        }
    }
}
