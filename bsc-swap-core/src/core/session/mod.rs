//! Wallet session
//!
//! Owns the connect/disconnect lifecycle and the currently known account and
//! chain. Dependents read it through [`SessionSnapshot`]s; only the session
//! itself mutates wallet identity.
//!
//! Every disconnect and every chain change bumps the session epoch. Quote and
//! swap work started under an older epoch must not publish its results.

use crate::core::network::{require_target, NetworkGuard};
use crate::domain::entities::network::NetworkConfig;
use crate::domain::providers::{ChainClient, WalletProvider};
use crate::shared::constants::WALLET_INSTALL_URL;
use crate::shared::error::SwapError;
use crate::shared::types::{Address, ChainId, NetworkStatus, SwapResult, WalletEvent};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// Point-in-time view of the session
#[derive(Clone, Default)]
pub struct SessionSnapshot {
    pub account: Option<Address>,
    pub chain_id: Option<ChainId>,
    pub connecting: bool,
    pub client: Option<Arc<dyn ChainClient>>,
    pub epoch: u64,
}

impl SessionSnapshot {
    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    pub fn wrong_network(&self, target: &NetworkConfig) -> bool {
        self.is_connected() && !target.matches(self.chain_id)
    }
}

impl fmt::Debug for SessionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSnapshot")
            .field("account", &self.account)
            .field("chain_id", &self.chain_id)
            .field("connecting", &self.connecting)
            .field("has_client", &self.client.is_some())
            .field("epoch", &self.epoch)
            .finish()
    }
}

/// Result of a successful `connect()`
#[derive(Debug, Clone)]
pub struct ConnectOutcome {
    pub account: Address,
    pub chain_id: ChainId,
    /// `None` when the wallet was already on the target chain.
    pub network: Option<Result<NetworkStatus, SwapError>>,
}

impl ConnectOutcome {
    pub fn wrong_network(&self) -> bool {
        matches!(self.network, Some(Err(_)))
    }
}

pub struct WalletSession {
    provider: Option<Arc<dyn WalletProvider>>,
    guard: Option<NetworkGuard>,
    target: NetworkConfig,
    state: watch::Sender<SessionSnapshot>,
    connecting: AtomicBool,
}

impl WalletSession {
    pub fn new(provider: Option<Arc<dyn WalletProvider>>, target: NetworkConfig) -> Self {
        let guard = provider
            .as_ref()
            .map(|p| NetworkGuard::new(p.clone(), target.clone()));
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            provider,
            guard,
            target,
            state,
            connecting: AtomicBool::new(false),
        }
    }

    pub fn target(&self) -> &NetworkConfig {
        &self.target
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn epoch(&self) -> u64 {
        self.state.borrow().epoch
    }

    pub fn is_wrong_network(&self) -> bool {
        self.state.borrow().wrong_network(&self.target)
    }

    /// Submit paths call this before sending anything.
    pub fn require_target_network(&self, snapshot: &SessionSnapshot) -> SwapResult<()> {
        match &self.guard {
            Some(guard) => guard.check(snapshot.chain_id),
            None => require_target(&self.target, snapshot.chain_id),
        }
    }

    fn provider(&self) -> SwapResult<&Arc<dyn WalletProvider>> {
        self.provider.as_ref().ok_or_else(|| {
            log::warn!("No wallet provider found. Install one from {}", WALLET_INSTALL_URL);
            SwapError::no_wallet_provider(WALLET_INSTALL_URL)
        })
    }

    /// Adopt an account the wallet already authorized, without prompting.
    ///
    /// Returns whether a session was resumed. Failures are logged and leave
    /// the session disconnected.
    pub async fn initialize(&self) -> bool {
        let Some(provider) = self.provider.as_ref() else {
            return false;
        };
        let accounts = match provider.list_accounts().await {
            Ok(accounts) => accounts,
            Err(err) => {
                log::debug!("Auto-connect skipped: {}", err);
                return false;
            }
        };
        let Some(account) = accounts.first().copied() else {
            return false;
        };
        let chain_id = match provider.chain_id().await {
            Ok(chain_id) => chain_id,
            Err(err) => {
                log::warn!("Auto-connect failed reading chain id: {}", err);
                return false;
            }
        };
        match provider.chain_client(account) {
            Ok(client) => {
                log::info!("Auto-connected previously authorized account {:?}", account);
                self.adopt(account, chain_id, client);
                true
            }
            Err(err) => {
                log::warn!("Auto-connect failed building chain client: {}", err);
                false
            }
        }
    }

    /// Ask the wallet for account access and, if needed, move it onto the
    /// target chain. A declined network switch still yields a connected
    /// session, flagged as on the wrong network.
    pub async fn connect(&self) -> SwapResult<ConnectOutcome> {
        let provider = self.provider()?.clone();

        if self
            .connecting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::debug!("Ignoring connect while another attempt is in flight");
            return Err(SwapError::ConnectInProgress);
        }
        self.state.send_modify(|s| s.connecting = true);

        let result = self.connect_inner(provider).await;

        self.connecting.store(false, Ordering::SeqCst);
        self.state.send_modify(|s| s.connecting = false);
        result
    }

    async fn connect_inner(&self, provider: Arc<dyn WalletProvider>) -> SwapResult<ConnectOutcome> {
        log::info!("Requesting account access");
        let accounts = provider.request_accounts().await.map_err(|err| {
            if err.is_user_rejection() {
                log::info!("User rejected the connection request");
                SwapError::user_rejected("Accept the connection request in the wallet")
            } else {
                log::error!("Error requesting accounts: {}", err);
                SwapError::from(err)
            }
        })?;

        let account = accounts
            .first()
            .copied()
            .ok_or_else(|| SwapError::NoAccounts("Unlock the wallet and try again".to_string()))?;
        let chain_id = provider.chain_id().await?;
        let client = provider.chain_client(account)?;

        log::info!("Connected account {:?} on chain {}", account, chain_id);
        self.adopt(account, chain_id, client);

        let network = match self.ensure_network().await {
            Ok(NetworkStatus::AlreadyOnTarget) => None,
            other => Some(other),
        };
        let chain_id = self.snapshot().chain_id.unwrap_or(chain_id);
        Ok(ConnectOutcome { account, chain_id, network })
    }

    /// Run the network guard against the current chain and apply the result.
    /// A failure leaves the previous chain id in place.
    pub async fn ensure_network(&self) -> SwapResult<NetworkStatus> {
        let guard = self.guard.as_ref().ok_or_else(|| {
            SwapError::no_wallet_provider(WALLET_INSTALL_URL)
        })?;
        let current = self.snapshot().chain_id;
        let status = guard.ensure(current).await?;
        if status != NetworkStatus::AlreadyOnTarget {
            match self.provider()?.chain_id().await {
                Ok(chain_id) => self.on_chain_changed(chain_id).await,
                Err(err) => {
                    log::warn!("Could not confirm chain after switch, keeping {:?}: {}", current, err);
                }
            }
        }
        Ok(status)
    }

    pub fn disconnect(&self) {
        let changed = self.state.send_if_modified(|s| {
            if s.account.is_none() && s.chain_id.is_none() && s.client.is_none() {
                return false;
            }
            s.account = None;
            s.chain_id = None;
            s.client = None;
            s.epoch += 1;
            true
        });
        if changed {
            log::info!("Wallet disconnected");
        }
    }

    /// The first entry is the wallet's active account. An empty list means the
    /// wallet locked or revoked access.
    pub fn on_accounts_changed(&self, accounts: Vec<Address>) {
        log::info!("Accounts changed: {:?}", accounts);
        let Some(account) = accounts.first().copied() else {
            self.disconnect();
            return;
        };
        let client = self
            .provider
            .as_ref()
            .and_then(|p| match p.chain_client(account) {
                Ok(client) => Some(client),
                Err(err) => {
                    log::warn!("Could not build chain client for {:?}: {}", account, err);
                    None
                }
            });
        self.state.send_modify(|s| {
            s.account = Some(account);
            s.client = client;
        });
    }

    /// Any cached on-chain state may be wrong after a chain change, so the
    /// session is rebuilt from the wallet instead of patched.
    pub async fn on_chain_changed(&self, chain_id: ChainId) {
        let unchanged = {
            let current = self.state.borrow();
            current.chain_id == Some(chain_id) && current.client.is_some()
        };
        if unchanged {
            log::debug!("Chain change to current chain {} ignored", chain_id);
            return;
        }

        log::info!("Chain changed to {}, resetting session", chain_id);
        self.state.send_modify(|s| {
            s.chain_id = Some(chain_id);
            s.client = None;
            s.epoch += 1;
        });
        if !self.target.matches(Some(chain_id)) {
            log::warn!(
                "Connected to chain {}, swaps need {} ({})",
                chain_id,
                self.target.chain_name,
                self.target.chain_id
            );
        }
        self.reload().await;
    }

    async fn reload(&self) {
        let Some(provider) = self.provider.as_ref() else {
            return;
        };
        let accounts = match provider.list_accounts().await {
            Ok(accounts) => accounts,
            Err(err) => {
                log::warn!("Session reload failed: {}", err);
                return;
            }
        };
        let Some(account) = accounts.first().copied() else {
            self.state.send_modify(|s| s.account = None);
            return;
        };
        match provider.chain_client(account) {
            Ok(client) => self.state.send_modify(|s| {
                s.account = Some(account);
                s.client = Some(client);
            }),
            Err(err) => log::warn!("Session reload could not build chain client: {}", err),
        }
    }

    fn adopt(&self, account: Address, chain_id: ChainId, client: Arc<dyn ChainClient>) {
        self.state.send_modify(|s| {
            s.account = Some(account);
            s.chain_id = Some(chain_id);
            s.client = Some(client);
            s.epoch += 1;
        });
    }

    /// Subscribe to wallet notifications for as long as the returned
    /// listener lives. `None` without a wallet provider.
    pub fn listen(self: &Arc<Self>) -> Option<SessionListener> {
        let receiver = self.provider.as_ref()?.subscribe();
        let session = Arc::downgrade(self);
        let handle = tokio::spawn(run_listener(session, receiver));
        Some(SessionListener { handle })
    }

    async fn handle_event(&self, event: WalletEvent) {
        match event {
            WalletEvent::AccountsChanged(accounts) => self.on_accounts_changed(accounts),
            WalletEvent::ChainChanged(chain_id) => self.on_chain_changed(chain_id).await,
            WalletEvent::Disconnected => self.disconnect(),
        }
    }
}

async fn run_listener(session: Weak<WalletSession>, mut receiver: broadcast::Receiver<WalletEvent>) {
    loop {
        match receiver.recv().await {
            Ok(event) => {
                let Some(session) = session.upgrade() else {
                    break;
                };
                session.handle_event(event).await;
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                log::warn!("Missed {} wallet events, reloading session", missed);
                let Some(session) = session.upgrade() else {
                    break;
                };
                if let Some(provider) = session.provider.as_ref() {
                    match provider.chain_id().await {
                        Ok(chain_id) => session.on_chain_changed(chain_id).await,
                        Err(err) => log::warn!("Could not read chain id: {}", err),
                    }
                }
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    log::debug!("Wallet event listener stopped");
}

/// Registration of the session's wallet-event handlers. Dropping it removes them.
pub struct SessionListener {
    handle: JoinHandle<()>,
}

impl SessionListener {
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for SessionListener {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
