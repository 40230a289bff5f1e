//! Token entity for the swap core

use crate::shared::constants::*;
use crate::shared::types::Address;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Where a token lives: the chain's native coin or an ERC-20 contract
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TokenAddress {
    Native,
    Contract(Address),
}

impl TokenAddress {
    /// The address the swap helper expects; the native coin goes through WBNB.
    pub fn contract_address(&self, wrapped_native: Address) -> Address {
        match self {
            TokenAddress::Native => wrapped_native,
            TokenAddress::Contract(address) => *address,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenDescriptor {
    pub address: TokenAddress,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    pub logo_uri: String,
}

impl TokenDescriptor {
    pub fn native() -> Self {
        Self {
            address: TokenAddress::Native,
            symbol: NATIVE_CURRENCY_SYMBOL.to_string(),
            name: NATIVE_CURRENCY_NAME.to_string(),
            decimals: NATIVE_CURRENCY_DECIMALS,
            logo_uri: String::new(),
        }
    }

    pub fn erc20(address: Address, symbol: &str, name: &str, decimals: u8, logo_uri: &str) -> Self {
        Self {
            address: TokenAddress::Contract(address),
            symbol: symbol.to_string(),
            name: name.to_string(),
            decimals,
            logo_uri: logo_uri.to_string(),
        }
    }

    pub fn is_native(&self) -> bool {
        self.address == TokenAddress::Native
    }

    /// Native-origin swaps go through `swapETHForTokens`. WBNB is treated the
    /// same way, matching the helper's native wrapping.
    pub fn is_native_origin(&self, wrapped_native: Address) -> bool {
        match self.address {
            TokenAddress::Native => true,
            TokenAddress::Contract(address) => address == wrapped_native,
        }
    }

    /// BNB and WBNB resolve to the same helper address, so they count as one.
    pub fn same_token(&self, other: &TokenDescriptor) -> bool {
        self.address.contract_address(*WBNB) == other.address.contract_address(*WBNB)
    }
}

fn parse_address(raw: &str) -> Address {
    Address::from_str(raw).unwrap_or_default()
}

lazy_static! {
    pub static ref WBNB: Address = parse_address(WBNB_ADDRESS);
    static ref TESTNET_TOKENS: Vec<TokenDescriptor> = vec![
        TokenDescriptor::native(),
        TokenDescriptor::erc20(
            parse_address(WBNB_ADDRESS),
            "WBNB",
            "Wrapped BNB",
            18,
            "https://tokens.pancakeswap.finance/images/0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c.png",
        ),
        TokenDescriptor::erc20(
            parse_address(BUSD_ADDRESS),
            "BUSD",
            "BUSD Token",
            18,
            "https://tokens.pancakeswap.finance/images/0xe9e7CEA3DedcA5984780Bafc599bD69ADd087D56.png",
        ),
        TokenDescriptor::erc20(
            parse_address(USDT_ADDRESS),
            "USDT",
            "Tether USD",
            18,
            "https://tokens.pancakeswap.finance/images/0x55d398326f99059fF775485246999027B3197955.png",
        ),
    ];
}

/// Ordered, read-only token list for the target network
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    tokens: Vec<TokenDescriptor>,
}

impl TokenRegistry {
    pub fn testnet() -> Self {
        Self { tokens: TESTNET_TOKENS.clone() }
    }

    pub fn from_tokens(tokens: Vec<TokenDescriptor>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[TokenDescriptor] {
        &self.tokens
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&TokenDescriptor> {
        self.tokens.iter().find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn by_address(&self, address: &TokenAddress) -> Option<&TokenDescriptor> {
        self.tokens.iter().find(|t| &t.address == address)
    }

    /// Tokens selectable opposite `excluded`.
    pub fn selectable_against<'a>(
        &'a self,
        excluded: &'a TokenDescriptor,
    ) -> impl Iterator<Item = &'a TokenDescriptor> + 'a {
        self.tokens.iter().filter(move |t| !t.same_token(excluded))
    }
}
