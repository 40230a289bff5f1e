//! Network entity for the swap core

use crate::shared::constants::*;
use crate::shared::types::ChainId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Everything a wallet needs to know to register and switch to a chain
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkConfig {
    pub chain_id: ChainId,
    pub chain_name: String,
    pub rpc_url: String,
    pub block_explorer: String,
    pub native_currency: NativeCurrency,
}

impl NetworkConfig {
    pub fn bsc_testnet() -> Self {
        Self::bsc_testnet_with_rpc(TARGET_RPC_URL)
    }

    pub fn bsc_testnet_with_rpc(rpc_url: impl Into<String>) -> Self {
        Self {
            chain_id: TARGET_CHAIN_ID,
            chain_name: TARGET_CHAIN_NAME.to_string(),
            rpc_url: rpc_url.into(),
            block_explorer: TARGET_BLOCK_EXPLORER.to_string(),
            native_currency: NativeCurrency {
                name: NATIVE_CURRENCY_NAME.to_string(),
                symbol: NATIVE_CURRENCY_SYMBOL.to_string(),
                decimals: NATIVE_CURRENCY_DECIMALS,
            },
        }
    }

    /// Chain id in the `0x`-prefixed form wallets expect (`0x61` for 97).
    pub fn chain_id_hex(&self) -> String {
        format!("0x{:x}", self.chain_id)
    }

    pub fn matches(&self, chain_id: Option<ChainId>) -> bool {
        chain_id == Some(self.chain_id)
    }

    pub fn add_chain_parameters(&self) -> AddChainParameters {
        AddChainParameters {
            chain_id: self.chain_id_hex(),
            chain_name: self.chain_name.clone(),
            native_currency: self.native_currency.clone(),
            rpc_urls: vec![self.rpc_url.clone()],
            block_explorer_urls: vec![self.block_explorer.clone()],
        }
    }
}

/// Wire form of `wallet_addEthereumChain` parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParameters {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

/// Parse a chain id as wallets report it: `0x`-prefixed hex or plain decimal.
pub fn parse_chain_id(raw: &str) -> Option<ChainId> {
    let raw = raw.trim().trim_matches('"');
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

/// Where the swap helper lives on a given chain
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Deployment {
    pub swap_helper: String,
    pub deployment_tx: String,
    pub deployment_time: String,
    pub verified: bool,
}

/// Testnet is the only populated record; unknown chains fall back to it.
pub fn deployment_for(chain_id: ChainId) -> Deployment {
    match chain_id {
        BSC_MAINNET_CHAIN_ID => Deployment {
            swap_helper: String::new(),
            deployment_tx: String::new(),
            deployment_time: String::new(),
            verified: false,
        },
        _ => Deployment {
            swap_helper: SWAP_HELPER_ADDRESS.to_string(),
            deployment_tx: SWAP_HELPER_DEPLOYMENT_TX.to_string(),
            deployment_time: SWAP_HELPER_DEPLOYMENT_TIME.to_string(),
            verified: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_hex() {
        assert_eq!(NetworkConfig::bsc_testnet().chain_id_hex(), "0x61");
    }

    #[test]
    fn test_add_chain_parameters_wire_format() {
        let params = NetworkConfig::bsc_testnet().add_chain_parameters();
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["chainId"], "0x61");
        assert_eq!(json["chainName"], "BSC Testnet");
        assert_eq!(json["nativeCurrency"]["symbol"], "BNB");
        assert_eq!(json["nativeCurrency"]["decimals"], 18);
        assert_eq!(json["rpcUrls"][0], TARGET_RPC_URL);
        assert_eq!(json["blockExplorerUrls"][0], TARGET_BLOCK_EXPLORER);
    }

    #[test]
    fn test_parse_chain_id() {
        assert_eq!(parse_chain_id("0x61"), Some(97));
        assert_eq!(parse_chain_id("\"0x38\""), Some(56));
        assert_eq!(parse_chain_id("97"), Some(97));
        assert_eq!(parse_chain_id("bsc"), None);
    }

    #[test]
    fn test_matches() {
        let network = NetworkConfig::bsc_testnet();
        assert!(network.matches(Some(97)));
        assert!(!network.matches(Some(56)));
        assert!(!network.matches(None));
    }

    #[test]
    fn test_deployment_lookup() {
        assert_eq!(deployment_for(97).swap_helper, SWAP_HELPER_ADDRESS);
        assert!(deployment_for(56).swap_helper.is_empty());
        assert_eq!(deployment_for(1).swap_helper, SWAP_HELPER_ADDRESS);
    }
}
