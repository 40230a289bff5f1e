//! Chain read/write capability for one network

use crate::shared::types::{Address, Amount, ChainId, SwapResult, TxHash, TxReceiptSummary};
use async_trait::async_trait;
use std::time::Duration;

/// JSON-RPC access to the target chain plus the swap helper's fixed call surface
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn chain_id(&self) -> SwapResult<ChainId>;

    async fn native_balance(&self, owner: Address) -> SwapResult<Amount>;

    async fn token_balance(&self, token: Address, owner: Address) -> SwapResult<Amount>;

    async fn token_decimals(&self, token: Address) -> SwapResult<u8>;

    async fn token_symbol(&self, token: Address) -> SwapResult<String>;

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> SwapResult<Amount>;

    async fn approve(&self, token: Address, spender: Address, amount: Amount) -> SwapResult<TxHash>;

    /// `getAmountOut(tokenIn, tokenOut, amountIn)`, read-only.
    async fn get_amount_out(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: Amount,
    ) -> SwapResult<Amount>;

    /// `swapTokens(tokenIn, tokenOut, amountIn, amountOutMin, to)`
    async fn swap_tokens(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: Amount,
        amount_out_min: Amount,
        to: Address,
    ) -> SwapResult<TxHash>;

    /// `swapETHForTokens(tokenOut, amountOutMin, to)` with `value` attached.
    async fn swap_eth_for_tokens(
        &self,
        token_out: Address,
        amount_out_min: Amount,
        to: Address,
        value: Amount,
    ) -> SwapResult<TxHash>;

    /// Block until `tx` is included or `timeout` elapses.
    async fn wait_for_receipt(&self, tx: TxHash, timeout: Duration) -> SwapResult<TxReceiptSummary>;

    /// Spender the swap helper uses for allowances.
    fn swap_helper(&self) -> Address;

    /// Address standing in for the native coin in swap helper calls.
    fn wrapped_native(&self) -> Address;
}
