//! In-memory wallet and chain doubles shared by the unit tests

use crate::domain::entities::network::{parse_chain_id, AddChainParameters};
use crate::domain::entities::token::WBNB;
use crate::domain::providers::{ChainClient, WalletProvider};
use crate::shared::error::{ProviderRpcError, SwapError};
use crate::shared::types::{Address, Amount, ChainId, SwapResult, TxHash, TxReceiptSummary, WalletEvent};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Notify};

pub fn account(n: u64) -> Address {
    Address::from_low_u64_be(n)
}

pub fn helper_address() -> Address {
    Address::from_low_u64_be(0xbeef)
}

/// `units * 10^18`, the native-unit form of whole tokens.
pub fn ether(units: u64) -> Amount {
    Amount::from(units) * Amount::exp10(18)
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChainCall {
    NativeBalance(Address),
    TokenBalance { token: Address, owner: Address },
    Allowance { token: Address, owner: Address, spender: Address },
    Approve { token: Address, spender: Address, amount: Amount },
    GetAmountOut { token_in: Address, token_out: Address, amount_in: Amount },
    SwapTokens { token_in: Address, token_out: Address, amount_in: Amount, amount_out_min: Amount, to: Address },
    SwapEthForTokens { token_out: Address, amount_out_min: Amount, to: Address, value: Amount },
    WaitForReceipt(TxHash),
}

impl ChainCall {
    pub fn is_approve(&self) -> bool {
        matches!(self, ChainCall::Approve { .. })
    }

    pub fn is_swap(&self) -> bool {
        matches!(self, ChainCall::SwapTokens { .. } | ChainCall::SwapEthForTokens { .. })
    }

    pub fn is_quote(&self) -> bool {
        matches!(self, ChainCall::GetAmountOut { .. })
    }
}

#[derive(Default)]
struct ChainState {
    calls: Vec<ChainCall>,
    native_balance: Amount,
    token_balances: HashMap<Address, Amount>,
    allowance: Amount,
    /// Output per unit input, as numerator over 100.
    rate_percent: u64,
    quote_delays: VecDeque<Duration>,
    quote_error: bool,
    balance_error: bool,
    approve_error: bool,
    reverted: HashSet<TxHash>,
    revert_approvals: bool,
    revert_swaps: bool,
    hang_receipts: bool,
    receipt_gate: Option<Arc<Notify>>,
    balance_delay: Option<Duration>,
    allowance_delay: Option<Duration>,
    next_tx: u64,
}

/// Scriptable [`ChainClient`] recording every call it receives
pub struct FakeChain {
    state: Mutex<ChainState>,
}

impl FakeChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ChainState {
                native_balance: ether(100),
                rate_percent: 198,
                ..ChainState::default()
            }),
        })
    }

    fn with<R>(&self, f: impl FnOnce(&mut ChainState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn calls(&self) -> Vec<ChainCall> {
        self.with(|s| s.calls.clone())
    }

    pub fn count(&self, predicate: impl Fn(&ChainCall) -> bool) -> usize {
        self.with(|s| s.calls.iter().filter(|c| predicate(c)).count())
    }

    pub fn set_allowance(&self, amount: Amount) {
        self.with(|s| s.allowance = amount);
    }

    pub fn set_native_balance(&self, amount: Amount) {
        self.with(|s| s.native_balance = amount);
    }

    pub fn set_token_balance(&self, token: Address, amount: Amount) {
        self.with(|s| {
            s.token_balances.insert(token, amount);
        });
    }

    pub fn push_quote_delay(&self, delay: Duration) {
        self.with(|s| s.quote_delays.push_back(delay));
    }

    pub fn delay_balances(&self, delay: Duration) {
        self.with(|s| s.balance_delay = Some(delay));
    }

    pub fn delay_allowances(&self, delay: Duration) {
        self.with(|s| s.allowance_delay = Some(delay));
    }

    pub fn fail_quotes(&self) {
        self.with(|s| s.quote_error = true);
    }

    pub fn fail_balances(&self) {
        self.with(|s| s.balance_error = true);
    }

    pub fn fail_approvals(&self) {
        self.with(|s| s.approve_error = true);
    }

    pub fn revert_approvals(&self) {
        self.with(|s| s.revert_approvals = true);
    }

    pub fn revert_swaps(&self) {
        self.with(|s| s.revert_swaps = true);
    }

    pub fn hang_receipts(&self) {
        self.with(|s| s.hang_receipts = true);
    }

    /// Receipts block until the returned gate is notified once per receipt.
    pub fn gate_receipts(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.with(|s| s.receipt_gate = Some(gate.clone()));
        gate
    }

    async fn pause(&self, delay: impl FnOnce(&ChainState) -> Option<Duration>) {
        let delay = self.with(|s| delay(s));
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn record(&self, call: ChainCall) {
        self.with(|s| s.calls.push(call));
    }

    fn next_tx(&self, reverts: bool) -> TxHash {
        self.with(|s| {
            s.next_tx += 1;
            let tx = TxHash::from_low_u64_be(s.next_tx);
            if reverts {
                s.reverted.insert(tx);
            }
            tx
        })
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn chain_id(&self) -> SwapResult<ChainId> {
        Ok(97)
    }

    async fn native_balance(&self, owner: Address) -> SwapResult<Amount> {
        self.record(ChainCall::NativeBalance(owner));
        self.pause(|s| s.balance_delay).await;
        self.with(|s| {
            if s.balance_error {
                Err(SwapError::network("balance read failed"))
            } else {
                Ok(s.native_balance)
            }
        })
    }

    async fn token_balance(&self, token: Address, owner: Address) -> SwapResult<Amount> {
        self.record(ChainCall::TokenBalance { token, owner });
        self.pause(|s| s.balance_delay).await;
        self.with(|s| {
            if s.balance_error {
                Err(SwapError::network("balance read failed"))
            } else {
                Ok(s.token_balances.get(&token).copied().unwrap_or_default())
            }
        })
    }

    async fn token_decimals(&self, _token: Address) -> SwapResult<u8> {
        Ok(18)
    }

    async fn token_symbol(&self, _token: Address) -> SwapResult<String> {
        Ok("TKN".to_string())
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> SwapResult<Amount> {
        self.record(ChainCall::Allowance { token, owner, spender });
        self.pause(|s| s.allowance_delay).await;
        Ok(self.with(|s| s.allowance))
    }

    async fn approve(&self, token: Address, spender: Address, amount: Amount) -> SwapResult<TxHash> {
        self.record(ChainCall::Approve { token, spender, amount });
        let (fails, reverts) = self.with(|s| (s.approve_error, s.revert_approvals));
        if fails {
            return Err(SwapError::from(ProviderRpcError::user_rejected()));
        }
        if !reverts {
            self.with(|s| s.allowance = amount);
        }
        Ok(self.next_tx(reverts))
    }

    async fn get_amount_out(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: Amount,
    ) -> SwapResult<Amount> {
        self.record(ChainCall::GetAmountOut { token_in, token_out, amount_in });
        let delay = self.with(|s| s.quote_delays.pop_front());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.with(|s| {
            if s.quote_error {
                Err(SwapError::network("execution reverted: no pair"))
            } else {
                Ok(amount_in * Amount::from(s.rate_percent) / Amount::from(100u64))
            }
        })
    }

    async fn swap_tokens(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: Amount,
        amount_out_min: Amount,
        to: Address,
    ) -> SwapResult<TxHash> {
        self.record(ChainCall::SwapTokens { token_in, token_out, amount_in, amount_out_min, to });
        let reverts = self.with(|s| s.revert_swaps);
        Ok(self.next_tx(reverts))
    }

    async fn swap_eth_for_tokens(
        &self,
        token_out: Address,
        amount_out_min: Amount,
        to: Address,
        value: Amount,
    ) -> SwapResult<TxHash> {
        self.record(ChainCall::SwapEthForTokens { token_out, amount_out_min, to, value });
        let reverts = self.with(|s| s.revert_swaps);
        Ok(self.next_tx(reverts))
    }

    async fn wait_for_receipt(&self, tx: TxHash, timeout: Duration) -> SwapResult<TxReceiptSummary> {
        self.record(ChainCall::WaitForReceipt(tx));
        let (gate, hang) = self.with(|s| (s.receipt_gate.clone(), s.hang_receipts));
        if hang {
            tokio::time::sleep(timeout).await;
            return Err(SwapError::network(format!("No receipt for {:?} within {:?}", tx, timeout)));
        }
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let (success, block) = self.with(|s| (!s.reverted.contains(&tx), s.next_tx + 100));
        Ok(TxReceiptSummary { tx_hash: tx, block_number: Some(block), success })
    }

    fn swap_helper(&self) -> Address {
        helper_address()
    }

    fn wrapped_native(&self) -> Address {
        *WBNB
    }
}

#[derive(Default)]
struct WalletState {
    chain_id: ChainId,
    accounts: Vec<Address>,
    authorized: Vec<Address>,
    reject_requests: bool,
    switch_error: Option<ProviderRpcError>,
    add_error: Option<ProviderRpcError>,
    chain_id_error: bool,
    account_gate: Option<Arc<Notify>>,
    account_requests: usize,
    switch_requests: usize,
    add_requests: usize,
}

/// Scriptable [`WalletProvider`] backed by a single [`FakeChain`]
pub struct FakeWallet {
    state: Mutex<WalletState>,
    chain: Arc<FakeChain>,
    events: broadcast::Sender<WalletEvent>,
}

impl FakeWallet {
    pub fn new(chain_id: ChainId, chain: Arc<FakeChain>) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            state: Mutex::new(WalletState {
                chain_id,
                accounts: vec![account(1)],
                authorized: vec![account(1)],
                ..WalletState::default()
            }),
            chain,
            events,
        })
    }

    fn with<R>(&self, f: impl FnOnce(&mut WalletState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        self.with(|s| s.accounts = accounts);
    }

    pub fn set_authorized(&self, accounts: Vec<Address>) {
        self.with(|s| s.authorized = accounts);
    }

    pub fn reject_account_requests(&self) {
        self.with(|s| s.reject_requests = true);
    }

    pub fn hold_account_requests(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.with(|s| s.account_gate = Some(gate.clone()));
        gate
    }

    pub fn set_switch_error(&self, err: ProviderRpcError) {
        self.with(|s| s.switch_error = Some(err));
    }

    pub fn set_add_error(&self, err: ProviderRpcError) {
        self.with(|s| s.add_error = Some(err));
    }

    pub fn fail_chain_id_reads(&self) {
        self.with(|s| s.chain_id_error = true);
    }

    pub fn account_requests(&self) -> usize {
        self.with(|s| s.account_requests)
    }

    pub fn switch_requests(&self) -> usize {
        self.with(|s| s.switch_requests)
    }

    pub fn add_requests(&self) -> usize {
        self.with(|s| s.add_requests)
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    pub fn emit(&self, event: WalletEvent) {
        let _ = self.events.send(event);
    }

    fn move_to(&self, chain_id: ChainId) {
        self.with(|s| s.chain_id = chain_id);
        self.emit(WalletEvent::ChainChanged(chain_id));
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderRpcError> {
        let gate = self.with(|s| {
            s.account_requests += 1;
            s.account_gate.clone()
        });
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.with(|s| {
            if s.reject_requests {
                Err(ProviderRpcError::user_rejected())
            } else {
                s.authorized = s.accounts.clone();
                Ok(s.accounts.clone())
            }
        })
    }

    async fn list_accounts(&self) -> Result<Vec<Address>, ProviderRpcError> {
        Ok(self.with(|s| s.authorized.clone()))
    }

    async fn chain_id(&self) -> Result<ChainId, ProviderRpcError> {
        self.with(|s| {
            if s.chain_id_error {
                Err(ProviderRpcError::new(-32603, "eth_chainId unavailable"))
            } else {
                Ok(s.chain_id)
            }
        })
    }

    async fn switch_chain(&self, chain_id_hex: &str) -> Result<(), ProviderRpcError> {
        let error = self.with(|s| {
            s.switch_requests += 1;
            s.switch_error.clone()
        });
        if let Some(err) = error {
            return Err(err);
        }
        let chain_id = parse_chain_id(chain_id_hex)
            .ok_or_else(|| ProviderRpcError::new(-32602, "invalid chain id"))?;
        self.move_to(chain_id);
        Ok(())
    }

    async fn add_chain(&self, params: &AddChainParameters) -> Result<(), ProviderRpcError> {
        let error = self.with(|s| {
            s.add_requests += 1;
            s.add_error.clone()
        });
        if let Some(err) = error {
            return Err(err);
        }
        let chain_id = parse_chain_id(&params.chain_id)
            .ok_or_else(|| ProviderRpcError::new(-32602, "invalid chain id"))?;
        self.move_to(chain_id);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }

    fn chain_client(&self, _account: Address) -> Result<Arc<dyn ChainClient>, SwapError> {
        let client: Arc<dyn ChainClient> = self.chain.clone();
        Ok(client)
    }
}
