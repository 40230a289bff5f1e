//! BSC Swap Core
//!
//! Wallet session, network guard, debounced quoting and slippage-guarded swap
//! execution for the SwapHelper contract on BSC testnet.
//!
//! ## Architecture
//!
//! - **Core**: session state machine, network guard, quote engine, swap executor, balances
//! - **Domain**: entities and the wallet/chain capability traits
//! - **Infrastructure**: ethers-backed implementations of those capabilities
//! - **Shared**: common types, configuration, constants, and errors
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bsc_swap_core::{init_swap_core, SlippageTolerance, TradePair};
//!
//! # async fn run() -> Result<(), bsc_swap_core::SwapError> {
//! let mut core = init_swap_core().await?;
//! core.start().await;
//! core.connect().await?;
//!
//! let pair = TradePair::new(core.token("BNB")?.clone(), core.token("BUSD")?.clone())?;
//! core.quote("1.0", &pair).await?;
//! let receipt = core.swap(SlippageTolerance::from_percent(0.5)?).await?;
//! println!("swapped in {:?}", receipt.swap_tx);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub mod core;
pub mod domain;
pub mod shared;
pub mod infrastructure;

#[cfg(test)]
pub(crate) mod testing;

// Re-export specific components
pub use crate::core::{
    BalanceBook, ConnectOutcome, ExecutorState, NetworkGuard, QuoteEngine, SessionListener,
    SessionSnapshot, SwapExecutor, SwapReceipt, WalletSession,
};
pub use infrastructure::{EthersChainClient, JsonRpcWalletProvider};

// Re-export domain entities
pub use domain::{
    ChainClient, NetworkConfig, Quote, QuoteOutcome, QuoteState, SlippageTolerance, SwapIntent,
    TokenAddress, TokenDescriptor, TokenRegistry, TradePair, WalletProvider,
};

// Re-export shared types
pub use shared::config::SwapConfig;
pub use shared::error::{ProviderRpcError, SwapError};
pub use shared::types::{Address, Amount, ApprovalPolicy, ChainId, SwapResult, TxHash, WalletEvent};

use shared::constants::WALLET_POLL_INTERVAL_MS;
use shared::utils::{format_amount, parse_amount};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Install `env_logger` as the global logger. Fails if one is already set.
pub fn init() -> Result<(), SwapError> {
    env_logger::try_init()
        .map_err(|e| SwapError::internal(format!("Logger already initialized: {}", e)))?;
    log::info!("{} v{} initialized", NAME, VERSION);
    Ok(())
}

/// Build a swap core from `.env` / environment configuration, talking to the
/// configured JSON-RPC wallet endpoint.
pub async fn init_swap_core() -> Result<SwapCore, SwapError> {
    let config = SwapConfig::from_env()?;
    let provider = Arc::new(JsonRpcWalletProvider::from_config(&config)?);
    let watcher = provider.watch(Duration::from_millis(WALLET_POLL_INTERVAL_MS));
    let mut core = SwapCore::new(config, Some(provider))?;
    core.watcher = Some(watcher);
    Ok(core)
}

/// Main swap core struct that ties session, quoting and execution together
pub struct SwapCore {
    config: SwapConfig,
    registry: TokenRegistry,
    session: Arc<WalletSession>,
    quotes: Arc<QuoteEngine>,
    balances: Arc<BalanceBook>,
    executor: Arc<SwapExecutor>,
    listener: Option<SessionListener>,
    watcher: Option<JoinHandle<()>>,
}

impl SwapCore {
    pub fn new(config: SwapConfig, provider: Option<Arc<dyn WalletProvider>>) -> Result<Self, SwapError> {
        config.validate()?;
        let session = Arc::new(WalletSession::new(provider, NetworkConfig::bsc_testnet()));
        let quotes = Arc::new(QuoteEngine::new(session.clone(), config.quote_debounce()));
        let balances = Arc::new(BalanceBook::new());
        let executor = Arc::new(SwapExecutor::new(
            session.clone(),
            quotes.clone(),
            balances.clone(),
            config.approval_policy,
            config.confirmation_timeout(),
        ));
        Ok(Self {
            config,
            registry: TokenRegistry::testnet(),
            session,
            quotes,
            balances,
            executor,
            listener: None,
            watcher: None,
        })
    }

    /// Resume an already-authorized session and start listening for wallet
    /// events. Returns whether a session was resumed.
    pub async fn start(&mut self) -> bool {
        let resumed = self.session.initialize().await;
        if self.listener.is_none() {
            self.listener = self.session.listen();
        }
        resumed
    }

    pub async fn connect(&self) -> Result<ConnectOutcome, SwapError> {
        self.session.connect().await
    }

    pub fn disconnect(&self) {
        self.session.disconnect();
        self.quotes.clear();
    }

    pub fn config(&self) -> &SwapConfig {
        &self.config
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    pub fn session(&self) -> &Arc<WalletSession> {
        &self.session
    }

    pub fn quotes(&self) -> &Arc<QuoteEngine> {
        &self.quotes
    }

    pub fn balances(&self) -> &Arc<BalanceBook> {
        &self.balances
    }

    pub fn executor(&self) -> &Arc<SwapExecutor> {
        &self.executor
    }

    pub fn token(&self, symbol: &str) -> Result<&TokenDescriptor, SwapError> {
        self.registry
            .by_symbol(symbol)
            .ok_or_else(|| SwapError::validation(format!("Unknown token: {}", symbol)))
    }

    pub fn default_slippage(&self) -> Result<SlippageTolerance, SwapError> {
        SlippageTolerance::from_bps(self.config.default_slippage_bps)
    }

    /// Quote a human-readable input amount, e.g. `"1.5"`.
    pub async fn quote(&self, amount: &str, pair: &TradePair) -> Result<QuoteOutcome, SwapError> {
        let amount_in = parse_amount(amount, pair.source.decimals)?;
        Ok(self.quotes.request_quote(amount_in, &pair.source, &pair.dest).await)
    }

    /// Freeze the current quote into a submittable intent.
    pub fn build_intent(&self, slippage: SlippageTolerance) -> Result<SwapIntent, SwapError> {
        let snapshot = self.session.snapshot();
        let account = snapshot.account.ok_or(SwapError::NotConnected)?;
        self.session.require_target_network(&snapshot)?;
        let quote = self
            .quotes
            .current_quote()
            .ok_or_else(|| SwapError::quote_unavailable("No quote for the current input"))?;
        SwapIntent::from_quote(&quote, slippage, account)
    }

    pub async fn swap(&self, slippage: SlippageTolerance) -> Result<SwapReceipt, SwapError> {
        let intent = self.build_intent(slippage)?;
        self.executor.execute(&intent).await
    }

    /// Swap input and output tokens. The last quoted output, if it belongs to
    /// `pair`, becomes the suggested new input amount.
    pub fn flip_pair(&self, pair: &TradePair) -> (TradePair, Option<String>) {
        let carried = self
            .quotes
            .current_quote()
            .filter(|q| q.source == pair.source && q.dest == pair.dest)
            .and_then(|q| format_amount(q.amount_out, q.dest.decimals).ok());
        (pair.flipped(), carried)
    }

    /// Full balance of `token` for the connected account, formatted for input.
    pub async fn max_input(&self, token: &TokenDescriptor) -> Result<String, SwapError> {
        let snapshot = self.session.snapshot();
        let account = snapshot.account.ok_or(SwapError::NotConnected)?;
        let client = snapshot.client.ok_or(SwapError::NotConnected)?;
        let balance = self.balances.fetch(client.as_ref(), token, account).await?;
        format_amount(balance, token.decimals)
    }
}

impl Drop for SwapCore {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
        log::debug!("SwapCore dropped");
    }
}
