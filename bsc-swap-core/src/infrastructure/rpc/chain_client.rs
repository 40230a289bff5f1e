//! ethers-backed chain client

use crate::domain::providers::ChainClient;
use crate::shared::constants::{ERC20_ABI, RECEIPT_POLL_INTERVAL_MS, SWAP_HELPER_ABI};
use crate::shared::error::{ProviderRpcError, SwapError};
use crate::shared::types::{Address, Amount, ChainId, SwapResult, TxHash, TxReceiptSummary};
use async_trait::async_trait;
use ethers::abi::{parse_abi, Abi};
use ethers::contract::{AbiError, Contract, ContractError};
use ethers::providers::{Http, Middleware, Provider, RpcError};
use std::sync::Arc;
use std::time::Duration;

type HttpProvider = Provider<Http>;

/// [`ChainClient`] over an HTTP JSON-RPC endpoint. Sends go out as
/// `eth_sendTransaction` from `account`, so the endpoint must hold its key.
pub struct EthersChainClient {
    provider: Arc<HttpProvider>,
    swap_helper: Contract<HttpProvider>,
    erc20_abi: Abi,
    wrapped_native: Address,
    account: Option<Address>,
    poll_interval: Duration,
}

impl EthersChainClient {
    pub fn new(
        provider: Arc<HttpProvider>,
        swap_helper: Address,
        wrapped_native: Address,
    ) -> SwapResult<Self> {
        let helper_abi = parse_abi(SWAP_HELPER_ABI)
            .map_err(|e| SwapError::internal(format!("Invalid swap helper ABI: {}", e)))?;
        let erc20_abi = parse_abi(ERC20_ABI)
            .map_err(|e| SwapError::internal(format!("Invalid ERC-20 ABI: {}", e)))?;
        Ok(Self {
            swap_helper: Contract::new(swap_helper, helper_abi, provider.clone()),
            provider,
            erc20_abi,
            wrapped_native,
            account: None,
            poll_interval: Duration::from_millis(RECEIPT_POLL_INTERVAL_MS),
        })
    }

    pub fn connect(rpc_url: &str, swap_helper: Address, wrapped_native: Address) -> SwapResult<Self> {
        let provider = HttpProvider::try_from(rpc_url)
            .map_err(|e| SwapError::config(format!("Invalid RPC URL {}: {}", rpc_url, e)))?;
        Self::new(Arc::new(provider), swap_helper, wrapped_native)
    }

    /// Account that signs approvals and swaps.
    pub fn with_account(mut self, account: Address) -> Self {
        self.account = Some(account);
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    fn sender(&self) -> SwapResult<Address> {
        self.account.ok_or(SwapError::NotConnected)
    }

    fn erc20(&self, token: Address) -> Contract<HttpProvider> {
        Contract::new(token, self.erc20_abi.clone(), self.provider.clone())
    }

    async fn poll_receipt(&self, tx: TxHash) -> SwapResult<TxReceiptSummary> {
        loop {
            if let Some(receipt) = self.provider.get_transaction_receipt(tx).await? {
                return Ok(TxReceiptSummary {
                    tx_hash: tx,
                    block_number: receipt.block_number.map(|b| b.as_u64()),
                    success: receipt.status.map(|s| s.as_u64() == 1).unwrap_or(false),
                });
            }
            log::trace!("No receipt yet for {:?}", tx);
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

fn abi_error(err: AbiError) -> SwapError {
    SwapError::internal(format!("ABI encoding failed: {}", err))
}

/// Keep the wallet's error code when the node returned one, so rejections
/// stay recognisable upstream.
fn contract_error(err: ContractError<HttpProvider>) -> SwapError {
    let response = match &err {
        ContractError::MiddlewareError { e } => e.as_error_response(),
        ContractError::ProviderError { e } => e.as_error_response(),
        _ => None,
    };
    match response {
        Some(response) => ProviderRpcError::new(response.code, response.message.clone()).into(),
        None => SwapError::network(err.to_string()),
    }
}

#[async_trait]
impl ChainClient for EthersChainClient {
    async fn chain_id(&self) -> SwapResult<ChainId> {
        Ok(self.provider.get_chainid().await?.as_u64())
    }

    async fn native_balance(&self, owner: Address) -> SwapResult<Amount> {
        Ok(self.provider.get_balance(owner, None).await?)
    }

    async fn token_balance(&self, token: Address, owner: Address) -> SwapResult<Amount> {
        self.erc20(token)
            .method::<_, Amount>("balanceOf", owner)
            .map_err(abi_error)?
            .call()
            .await
            .map_err(contract_error)
    }

    async fn token_decimals(&self, token: Address) -> SwapResult<u8> {
        self.erc20(token)
            .method::<_, u8>("decimals", ())
            .map_err(abi_error)?
            .call()
            .await
            .map_err(contract_error)
    }

    async fn token_symbol(&self, token: Address) -> SwapResult<String> {
        self.erc20(token)
            .method::<_, String>("symbol", ())
            .map_err(abi_error)?
            .call()
            .await
            .map_err(contract_error)
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> SwapResult<Amount> {
        self.erc20(token)
            .method::<_, Amount>("allowance", (owner, spender))
            .map_err(abi_error)?
            .call()
            .await
            .map_err(contract_error)
    }

    async fn approve(&self, token: Address, spender: Address, amount: Amount) -> SwapResult<TxHash> {
        let contract = self.erc20(token);
        let call = contract
            .method::<_, bool>("approve", (spender, amount))
            .map_err(abi_error)?
            .from(self.sender()?);
        let pending = call.send().await.map_err(contract_error)?;
        Ok(pending.tx_hash())
    }

    async fn get_amount_out(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: Amount,
    ) -> SwapResult<Amount> {
        self.swap_helper
            .method::<_, Amount>("getAmountOut", (token_in, token_out, amount_in))
            .map_err(abi_error)?
            .call()
            .await
            .map_err(contract_error)
    }

    async fn swap_tokens(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: Amount,
        amount_out_min: Amount,
        to: Address,
    ) -> SwapResult<TxHash> {
        let call = self
            .swap_helper
            .method::<_, TxHash>("swapTokens", (token_in, token_out, amount_in, amount_out_min, to))
            .map_err(abi_error)?
            .from(self.sender()?);
        let pending = call.send().await.map_err(contract_error)?;
        Ok(pending.tx_hash())
    }

    async fn swap_eth_for_tokens(
        &self,
        token_out: Address,
        amount_out_min: Amount,
        to: Address,
        value: Amount,
    ) -> SwapResult<TxHash> {
        let call = self
            .swap_helper
            .method::<_, TxHash>("swapETHForTokens", (token_out, amount_out_min, to))
            .map_err(abi_error)?
            .from(self.sender()?)
            .value(value);
        let pending = call.send().await.map_err(contract_error)?;
        Ok(pending.tx_hash())
    }

    async fn wait_for_receipt(&self, tx: TxHash, timeout: Duration) -> SwapResult<TxReceiptSummary> {
        tokio::time::timeout(timeout, self.poll_receipt(tx)).await?
    }

    fn swap_helper(&self) -> Address {
        self.swap_helper.address()
    }

    fn wrapped_native(&self) -> Address {
        self.wrapped_native
    }
}
