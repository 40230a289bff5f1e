//! Wallet provider over a JSON-RPC endpoint
//!
//! Speaks the EIP-1193 method set (`eth_requestAccounts`,
//! `wallet_switchEthereumChain`, ...) against a node or wallet backend that
//! manages the keys. Account and chain notifications are synthesized by
//! polling, since plain HTTP has no push channel.

use crate::domain::entities::network::{parse_chain_id, AddChainParameters};
use crate::domain::providers::{ChainClient, WalletProvider};
use crate::infrastructure::rpc::chain_client::EthersChainClient;
use crate::shared::config::SwapConfig;
use crate::shared::constants::{RECEIPT_POLL_INTERVAL_MS, WALLET_EVENT_CAPACITY, WBNB_ADDRESS};
use crate::shared::error::{ProviderRpcError, SwapError};
use crate::shared::types::{Address, ChainId, SwapResult, WalletEvent};
use async_trait::async_trait;
use ethers::providers::{Http, Provider, ProviderError, RpcError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::fmt::Debug;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// JSON-RPC "internal error", used when the transport failed without a code.
const INTERNAL_ERROR_CODE: i64 = -32603;

pub struct JsonRpcWalletProvider {
    provider: Arc<Provider<Http>>,
    swap_helper: Address,
    wrapped_native: Address,
    receipt_poll: Duration,
    events: broadcast::Sender<WalletEvent>,
}

impl JsonRpcWalletProvider {
    pub fn new(rpc_url: &str, swap_helper: Address) -> SwapResult<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| SwapError::config(format!("Invalid RPC URL {}: {}", rpc_url, e)))?;
        let wrapped_native = Address::from_str(WBNB_ADDRESS)
            .map_err(|e| SwapError::internal(format!("Invalid WBNB address: {}", e)))?;
        let (events, _) = broadcast::channel(WALLET_EVENT_CAPACITY);
        Ok(Self {
            provider: Arc::new(provider),
            swap_helper,
            wrapped_native,
            receipt_poll: Duration::from_millis(RECEIPT_POLL_INTERVAL_MS),
            events,
        })
    }

    pub fn from_config(config: &SwapConfig) -> SwapResult<Self> {
        let mut provider = Self::new(&config.rpc_url, config.swap_helper)?;
        provider.receipt_poll = config.receipt_poll_interval();
        Ok(provider)
    }

    /// Push a notification to every subscriber. Returns how many received it.
    pub fn emit(&self, event: WalletEvent) -> usize {
        self.events.send(event).unwrap_or(0)
    }

    async fn call<T, R>(&self, method: &str, params: T) -> Result<R, ProviderRpcError>
    where
        T: Debug + Serialize + Send + Sync,
        R: Debug + Serialize + DeserializeOwned + Send,
    {
        log::debug!("Wallet request {}", method);
        self.provider.request(method, params).await.map_err(rpc_error)
    }

    /// Poll accounts and chain id every `interval` and emit the differences.
    /// The task ends once the provider is dropped.
    pub fn watch(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let provider = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut tracker = ChangeTracker::default();
            loop {
                ticker.tick().await;
                let Some(provider) = provider.upgrade() else {
                    break;
                };
                let accounts = provider.list_accounts().await;
                let chain_id = provider.chain_id().await;
                let observed = match (accounts, chain_id) {
                    (Ok(accounts), Ok(chain_id)) => Some((accounts, chain_id)),
                    (Err(err), _) | (_, Err(err)) => {
                        log::debug!("Wallet poll failed: {}", err);
                        None
                    }
                };
                for event in tracker.observe(observed) {
                    provider.emit(event);
                }
            }
            log::debug!("Wallet watcher stopped");
        })
    }
}

fn rpc_error(err: ProviderError) -> ProviderRpcError {
    match err.as_error_response() {
        Some(response) => ProviderRpcError::new(response.code, response.message.clone()),
        None => ProviderRpcError::new(INTERNAL_ERROR_CODE, err.to_string()),
    }
}

fn decode_chain_id(raw: &str) -> Result<ChainId, ProviderRpcError> {
    parse_chain_id(raw)
        .ok_or_else(|| ProviderRpcError::new(INTERNAL_ERROR_CODE, format!("Malformed chain id {:?}", raw)))
}

/// Turns successive polls into wallet events
#[derive(Debug, Default)]
struct ChangeTracker {
    last: Option<(Vec<Address>, ChainId)>,
}

impl ChangeTracker {
    /// `None` means the endpoint was unreachable this round.
    fn observe(&mut self, current: Option<(Vec<Address>, ChainId)>) -> Vec<WalletEvent> {
        let mut events = Vec::new();
        match (&self.last, &current) {
            (Some((old_accounts, old_chain)), Some((accounts, chain_id))) => {
                if old_chain != chain_id {
                    events.push(WalletEvent::ChainChanged(*chain_id));
                }
                if old_accounts != accounts {
                    events.push(WalletEvent::AccountsChanged(accounts.clone()));
                }
            }
            (Some(_), None) => events.push(WalletEvent::Disconnected),
            _ => {}
        }
        self.last = current;
        events
    }
}

#[async_trait]
impl WalletProvider for JsonRpcWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderRpcError> {
        self.call("eth_requestAccounts", ()).await
    }

    async fn list_accounts(&self) -> Result<Vec<Address>, ProviderRpcError> {
        self.call("eth_accounts", ()).await
    }

    async fn chain_id(&self) -> Result<ChainId, ProviderRpcError> {
        let raw: String = self.call("eth_chainId", ()).await?;
        decode_chain_id(&raw)
    }

    async fn switch_chain(&self, chain_id_hex: &str) -> Result<(), ProviderRpcError> {
        let _: serde_json::Value = self
            .call("wallet_switchEthereumChain", [json!({ "chainId": chain_id_hex })])
            .await?;
        Ok(())
    }

    async fn add_chain(&self, params: &AddChainParameters) -> Result<(), ProviderRpcError> {
        let _: serde_json::Value = self.call("wallet_addEthereumChain", [params]).await?;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }

    fn chain_client(&self, account: Address) -> Result<Arc<dyn ChainClient>, SwapError> {
        let client = EthersChainClient::new(self.provider.clone(), self.swap_helper, self.wrapped_native)?
            .with_account(account)
            .with_poll_interval(self.receipt_poll);
        Ok(Arc::new(client))
    }
}
