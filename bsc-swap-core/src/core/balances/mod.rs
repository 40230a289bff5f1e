//! Balance book
//!
//! Last-known balances per (owner, token). Reads go through the session's
//! chain client; the cache only backs display and the pre-submit check.

use crate::domain::entities::token::{TokenAddress, TokenDescriptor};
use crate::domain::providers::ChainClient;
use crate::shared::types::{Address, Amount, SwapResult};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct BalanceBook {
    balances: RwLock<HashMap<(Address, TokenAddress), Amount>>,
}

impl BalanceBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `owner`'s balance of `token` and cache it. Native-origin tokens
    /// report the native coin balance.
    pub async fn fetch(
        &self,
        client: &dyn ChainClient,
        token: &TokenDescriptor,
        owner: Address,
    ) -> SwapResult<Amount> {
        let amount = match token.address {
            TokenAddress::Contract(address) if !token.is_native_origin(client.wrapped_native()) => {
                client.token_balance(address, owner).await?
            }
            _ => client.native_balance(owner).await?,
        };
        log::debug!("Balance of {} for {:?}: {}", token.symbol, owner, amount);
        self.balances.write().await.insert((owner, token.address), amount);
        Ok(amount)
    }

    /// Best-effort [`fetch`](Self::fetch). Failures are logged and leave the
    /// cached value untouched.
    pub async fn refresh(
        &self,
        client: &dyn ChainClient,
        token: &TokenDescriptor,
        owner: Address,
    ) -> Option<Amount> {
        match self.fetch(client, token, owner).await {
            Ok(amount) => Some(amount),
            Err(err) => {
                log::warn!("Failed to refresh {} balance: {}", token.symbol, err);
                None
            }
        }
    }

    pub async fn cached(&self, owner: Address, token: &TokenDescriptor) -> Option<Amount> {
        self.balances.read().await.get(&(owner, token.address)).copied()
    }

    pub async fn clear(&self) {
        self.balances.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::token::{TokenRegistry, WBNB};
    use crate::domain::providers::MockChainClient;
    use crate::shared::error::SwapError;
    use crate::testing::{account, ether, ChainCall, FakeChain};

    #[tokio::test]
    async fn test_native_and_wrapped_read_native_balance() {
        let chain = FakeChain::new();
        chain.set_native_balance(ether(3));
        let registry = TokenRegistry::testnet();
        let book = BalanceBook::new();
        let owner = account(1);

        let bnb = registry.by_symbol("BNB").unwrap();
        let wbnb = registry.by_symbol("WBNB").unwrap();
        assert_eq!(book.fetch(chain.as_ref(), bnb, owner).await.unwrap(), ether(3));
        assert_eq!(book.fetch(chain.as_ref(), wbnb, owner).await.unwrap(), ether(3));
        assert_eq!(chain.count(|c| matches!(c, ChainCall::NativeBalance(_))), 2);
        assert_eq!(chain.count(|c| matches!(c, ChainCall::TokenBalance { token, .. } if *token == *WBNB)), 0);
    }

    #[tokio::test]
    async fn test_token_balance_is_cached() {
        let chain = FakeChain::new();
        let registry = TokenRegistry::testnet();
        let busd = registry.by_symbol("BUSD").unwrap();
        let TokenAddress::Contract(busd_address) = busd.address else {
            panic!("BUSD is a contract token");
        };
        chain.set_token_balance(busd_address, ether(42));
        let book = BalanceBook::new();

        assert_eq!(book.cached(account(1), busd).await, None);
        book.fetch(chain.as_ref(), busd, account(1)).await.unwrap();
        assert_eq!(book.cached(account(1), busd).await, Some(ether(42)));
        assert_eq!(book.cached(account(2), busd).await, None);

        book.clear().await;
        assert_eq!(book.cached(account(1), busd).await, None);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_cache() {
        let chain = FakeChain::new();
        let registry = TokenRegistry::testnet();
        let bnb = registry.by_symbol("BNB").unwrap();
        let book = BalanceBook::new();

        book.fetch(chain.as_ref(), bnb, account(1)).await.unwrap();
        chain.fail_balances();
        assert_eq!(book.refresh(chain.as_ref(), bnb, account(1)).await, None);
        assert_eq!(book.cached(account(1), bnb).await, Some(ether(100)));
    }

    #[tokio::test]
    async fn test_contract_token_reads_token_balance() {
        let mut mock = MockChainClient::new();
        mock.expect_wrapped_native().return_const(*WBNB);
        mock.expect_native_balance().never();
        mock.expect_token_balance()
            .times(1)
            .returning(|_, _| Err(SwapError::network("execution reverted")));

        let registry = TokenRegistry::testnet();
        let usdt = registry.by_symbol("USDT").unwrap();
        let book = BalanceBook::new();
        assert_eq!(book.refresh(&mock, usdt, account(1)).await, None);
        assert_eq!(book.cached(account(1), usdt).await, None);
    }
}
