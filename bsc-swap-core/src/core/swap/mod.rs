//! Swap executor
//!
//! Runs one approve-if-needed-then-swap sequence at a time. Progress is
//! published as an [`ExecutorState`] so a partial failure (approval mined,
//! swap reverted) stays inspectable after the attempt ends.

use crate::core::balances::BalanceBook;
use crate::core::quote::QuoteEngine;
use crate::core::session::WalletSession;
use crate::domain::entities::intent::{min_output_amount, SwapIntent};
use crate::domain::providers::ChainClient;
use crate::shared::error::SwapError;
use crate::shared::types::{Address, Amount, ApprovalPolicy, BlockNumber, SwapResult, TxHash};
use crate::shared::utils::format_amount;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use uuid::Uuid;

/// Outcome of a confirmed swap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReceipt {
    pub intent_id: Uuid,
    pub approval_tx: Option<TxHash>,
    pub swap_tx: TxHash,
    pub block_number: Option<BlockNumber>,
    /// False when the post-swap balance refresh was skipped or failed.
    pub balances_refreshed: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ExecutorState {
    #[default]
    Idle,
    Validating,
    CheckingAllowance,
    /// `tx` is `None` until the wallet has signed and sent the approval.
    AwaitingApproval { tx: Option<TxHash> },
    AwaitingSwap { tx: Option<TxHash>, approval_tx: Option<TxHash> },
    Confirmed(SwapReceipt),
    Failed { reason: String, approval_tx: Option<TxHash> },
}

impl ExecutorState {
    pub fn is_busy(&self) -> bool {
        !matches!(
            self,
            ExecutorState::Idle | ExecutorState::Confirmed(_) | ExecutorState::Failed { .. }
        )
    }
}

pub struct SwapExecutor {
    session: Arc<WalletSession>,
    quotes: Arc<QuoteEngine>,
    balances: Arc<BalanceBook>,
    policy: ApprovalPolicy,
    confirmation_timeout: Duration,
    in_flight: Mutex<()>,
    state: watch::Sender<ExecutorState>,
}

impl SwapExecutor {
    pub fn new(
        session: Arc<WalletSession>,
        quotes: Arc<QuoteEngine>,
        balances: Arc<BalanceBook>,
        policy: ApprovalPolicy,
        confirmation_timeout: Duration,
    ) -> Self {
        let (state, _) = watch::channel(ExecutorState::Idle);
        Self {
            session,
            quotes,
            balances,
            policy,
            confirmation_timeout,
            in_flight: Mutex::new(()),
            state,
        }
    }

    pub fn policy(&self) -> ApprovalPolicy {
        self.policy
    }

    pub fn state(&self) -> ExecutorState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ExecutorState> {
        self.state.subscribe()
    }

    /// Return a finished executor to `Idle`. No-op while a swap runs.
    pub fn reset(&self) {
        self.state.send_if_modified(|state| {
            if state.is_busy() || *state == ExecutorState::Idle {
                return false;
            }
            *state = ExecutorState::Idle;
            true
        });
    }

    pub async fn execute(&self, intent: &SwapIntent) -> SwapResult<SwapReceipt> {
        let _guard = self.in_flight.try_lock().map_err(|_| {
            log::warn!("Rejecting swap {}: another swap is in flight", intent.id);
            SwapError::SwapInProgress
        })?;

        log::info!(
            "Executing swap {}: {} {} -> {} (min {})",
            intent.id,
            intent.amount_in,
            intent.source.symbol,
            intent.dest.symbol,
            intent.min_output
        );

        let mut approval_tx = None;
        let result = self.run(intent, &mut approval_tx).await;
        match &result {
            Ok(receipt) => {
                log::info!("Swap {} confirmed in {:?}", intent.id, receipt.swap_tx);
                self.set_state(ExecutorState::Confirmed(receipt.clone()));
            }
            Err(err) => {
                log::error!("Swap {} failed: {}", intent.id, err);
                self.quotes.clear();
                self.set_state(ExecutorState::Failed { reason: err.to_string(), approval_tx });
            }
        }
        result
    }

    async fn run(&self, intent: &SwapIntent, approval_tx: &mut Option<TxHash>) -> SwapResult<SwapReceipt> {
        self.set_state(ExecutorState::Validating);
        let snapshot = self.session.snapshot();
        let account = snapshot.account.ok_or(SwapError::NotConnected)?;
        self.session.require_target_network(&snapshot)?;
        let client = snapshot.client.clone().ok_or(SwapError::NotConnected)?;
        let epoch = snapshot.epoch;
        self.validate(intent, account, epoch)?;
        self.check_balance(client.as_ref(), intent, account).await?;
        self.ensure_epoch(epoch)?;

        let wrapped = client.wrapped_native();
        let token_out = intent.dest.address.contract_address(wrapped);

        let swap_tx = if intent.source.is_native_origin(wrapped) {
            self.set_state(ExecutorState::AwaitingSwap { tx: None, approval_tx: None });
            self.ensure_epoch(epoch)?;
            client
                .swap_eth_for_tokens(token_out, intent.min_output, intent.recipient, intent.amount_in)
                .await
                .map_err(submit_error)?
        } else {
            let token_in = intent.source.address.contract_address(wrapped);
            *approval_tx = self
                .approve_if_needed(client.as_ref(), token_in, account, intent.amount_in, epoch)
                .await?;
            self.ensure_epoch(epoch)?;
            self.set_state(ExecutorState::AwaitingSwap { tx: None, approval_tx: *approval_tx });
            client
                .swap_tokens(token_in, token_out, intent.amount_in, intent.min_output, intent.recipient)
                .await
                .map_err(submit_error)?
        };

        log::info!("Swap transaction sent: {:?}", swap_tx);
        self.set_state(ExecutorState::AwaitingSwap { tx: Some(swap_tx), approval_tx: *approval_tx });
        let receipt = client
            .wait_for_receipt(swap_tx, self.confirmation_timeout)
            .await
            .map_err(|err| SwapError::swap_failed(format!("{:?} not confirmed: {}", swap_tx, err)))?;
        if !receipt.success {
            return Err(SwapError::swap_failed(format!("{:?} reverted on-chain", swap_tx)));
        }

        let balances_refreshed = if self.session.epoch() == epoch {
            self.quotes.clear();
            self.refresh_balances(client.as_ref(), intent, account).await
        } else {
            log::info!("Session changed during swap {}, skipping balance refresh", intent.id);
            false
        };

        Ok(SwapReceipt {
            intent_id: intent.id,
            approval_tx: *approval_tx,
            swap_tx,
            block_number: receipt.block_number,
            balances_refreshed,
        })
    }

    fn validate(&self, intent: &SwapIntent, account: Address, epoch: u64) -> SwapResult<()> {
        if intent.recipient != account {
            return Err(SwapError::session_changed(
                "Active account differs from the swap recipient",
            ));
        }
        self.ensure_epoch_matches(intent.session_epoch, epoch)?;
        if intent.amount_in.is_zero() {
            return Err(SwapError::validation("Input amount must be greater than zero"));
        }
        if intent.quoted_output.is_zero() || !self.quotes.is_current_sequence(intent.quote_sequence) {
            return Err(SwapError::quote_unavailable("Quote is stale, wait for a fresh quote"));
        }
        if min_output_amount(intent.quoted_output, intent.slippage) != intent.min_output {
            return Err(SwapError::validation(
                "Minimum output does not match the quote and slippage tolerance",
            ));
        }
        Ok(())
    }

    fn ensure_epoch(&self, started: u64) -> SwapResult<()> {
        self.ensure_epoch_matches(started, self.session.epoch())
    }

    fn ensure_epoch_matches(&self, started: u64, current: u64) -> SwapResult<()> {
        if started == current {
            Ok(())
        } else {
            Err(SwapError::session_changed("Wallet network or connection changed"))
        }
    }

    /// Blocks submission when the balance is known to be short. An unreadable
    /// balance lets the swap proceed; the chain has the final say.
    async fn check_balance(
        &self,
        client: &dyn ChainClient,
        intent: &SwapIntent,
        account: Address,
    ) -> SwapResult<()> {
        match self.balances.fetch(client, &intent.source, account).await {
            Ok(available) if available < intent.amount_in => {
                let decimals = intent.source.decimals;
                Err(SwapError::InsufficientBalance {
                    required: format!("{} {}", format_amount(intent.amount_in, decimals)?, intent.source.symbol),
                    available: format!("{} {}", format_amount(available, decimals)?, intent.source.symbol),
                })
            }
            Ok(_) => Ok(()),
            Err(err) => {
                log::warn!("Could not read {} balance before swap: {}", intent.source.symbol, err);
                Ok(())
            }
        }
    }

    async fn approve_if_needed(
        &self,
        client: &dyn ChainClient,
        token: Address,
        owner: Address,
        amount_in: Amount,
        epoch: u64,
    ) -> SwapResult<Option<TxHash>> {
        self.set_state(ExecutorState::CheckingAllowance);
        let spender = client.swap_helper();
        let allowance = client
            .allowance(token, owner, spender)
            .await
            .map_err(|err| SwapError::approval_failed(format!("Could not read allowance: {}", err)))?;
        self.ensure_epoch(epoch)?;
        if allowance >= amount_in {
            log::debug!("Allowance {} covers {}, skipping approval", allowance, amount_in);
            return Ok(None);
        }

        let amount = self.policy.approval_amount(amount_in);
        log::info!("Approving {} ({} policy) for {:?}", amount, self.policy, spender);
        self.set_state(ExecutorState::AwaitingApproval { tx: None });
        self.ensure_epoch(epoch)?;
        let tx = client
            .approve(token, spender, amount)
            .await
            .map_err(|err| SwapError::approval_failed(err.to_string()))?;

        self.set_state(ExecutorState::AwaitingApproval { tx: Some(tx) });
        let receipt = client
            .wait_for_receipt(tx, self.confirmation_timeout)
            .await
            .map_err(|err| SwapError::approval_failed(format!("{:?} not confirmed: {}", tx, err)))?;
        if !receipt.success {
            return Err(SwapError::approval_failed(format!("{:?} reverted on-chain", tx)));
        }
        log::info!("Approval confirmed: {:?}", tx);
        Ok(Some(tx))
    }

    async fn refresh_balances(&self, client: &dyn ChainClient, intent: &SwapIntent, account: Address) -> bool {
        let (source, dest) = futures::join!(
            self.balances.refresh(client, &intent.source, account),
            self.balances.refresh(client, &intent.dest, account),
        );
        source.is_some() && dest.is_some()
    }

    fn set_state(&self, next: ExecutorState) {
        self.state.send_replace(next);
    }
}

fn submit_error(err: SwapError) -> SwapError {
    if err.is_user_rejection() {
        SwapError::user_rejected("Swap transaction rejected in the wallet")
    } else {
        SwapError::swap_failed(err.to_string())
    }
}
