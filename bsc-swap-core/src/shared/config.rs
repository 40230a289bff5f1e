//! Runtime configuration for the swap core
//!
//! Values come from the process environment (a `.env` file is honoured) and
//! fall back to the BSC testnet defaults. The target chain itself is fixed.

use crate::shared::constants::*;
use crate::shared::error::SwapError;
use crate::shared::types::{Address, ApprovalPolicy};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapConfig {
    pub rpc_url: String,
    pub swap_helper: Address,
    pub quote_debounce_ms: u64,
    pub confirmation_timeout_secs: u64,
    pub receipt_poll_ms: u64,
    pub default_slippage_bps: u32,
    pub approval_policy: ApprovalPolicy,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            rpc_url: TARGET_RPC_URL.to_string(),
            swap_helper: Address::from_str(SWAP_HELPER_ADDRESS).unwrap_or_default(),
            quote_debounce_ms: QUOTE_DEBOUNCE_MS,
            confirmation_timeout_secs: CONFIRMATION_TIMEOUT_SECS,
            receipt_poll_ms: RECEIPT_POLL_INTERVAL_MS,
            default_slippage_bps: DEFAULT_SLIPPAGE_BPS,
            approval_policy: ApprovalPolicy::default(),
        }
    }
}

impl SwapConfig {
    /// Load configuration from `.env` / environment variables, with safe defaults
    pub fn from_env() -> Result<Self, SwapError> {
        dotenv::dotenv().ok();
        let defaults = Self::default();

        let rpc_url = env::var("SWAP_CORE_RPC_URL").unwrap_or(defaults.rpc_url);
        let swap_helper = match env::var("SWAP_CORE_SWAP_HELPER") {
            Ok(raw) => Address::from_str(raw.trim())
                .map_err(|e| SwapError::config(format!("Invalid SWAP_CORE_SWAP_HELPER: {}", e)))?,
            Err(_) => defaults.swap_helper,
        };
        let approval_policy = match env::var("SWAP_CORE_APPROVAL_POLICY") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.approval_policy,
        };

        let config = Self {
            rpc_url,
            swap_helper,
            quote_debounce_ms: env_number("SWAP_CORE_QUOTE_DEBOUNCE_MS", defaults.quote_debounce_ms)?,
            confirmation_timeout_secs: env_number(
                "SWAP_CORE_CONFIRMATION_TIMEOUT_SECS",
                defaults.confirmation_timeout_secs,
            )?,
            receipt_poll_ms: env_number("SWAP_CORE_RECEIPT_POLL_MS", defaults.receipt_poll_ms)?,
            default_slippage_bps: env_number(
                "SWAP_CORE_DEFAULT_SLIPPAGE_BPS",
                defaults.default_slippage_bps,
            )?,
            approval_policy,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SwapError> {
        if self.rpc_url.is_empty() {
            return Err(SwapError::config("RPC URL cannot be empty"));
        }
        if !self.rpc_url.starts_with("http://") && !self.rpc_url.starts_with("https://") {
            return Err(SwapError::config(format!("RPC URL must be http(s): {}", self.rpc_url)));
        }
        if self.swap_helper == Address::zero() {
            return Err(SwapError::config("Swap helper address cannot be the zero address"));
        }
        if self.default_slippage_bps >= BPS_DENOMINATOR {
            return Err(SwapError::config("Default slippage must be below 100%"));
        }
        if self.confirmation_timeout_secs == 0 || self.receipt_poll_ms == 0 {
            return Err(SwapError::config("Confirmation timeout and poll interval must be non-zero"));
        }
        Ok(())
    }

    pub fn quote_debounce(&self) -> Duration {
        Duration::from_millis(self.quote_debounce_ms)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_ms)
    }
}

fn env_number<T: FromStr>(key: &str, default: T) -> Result<T, SwapError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| SwapError::config(format!("{} must be a number, got {:?}", key, raw))),
        Err(_) => Ok(default),
    }
}
