use serde::{Deserialize, Serialize};

// Basic types for swap operations
pub type Address = ethers::types::Address;
pub type Amount = ethers::types::U256;
pub type TxHash = ethers::types::H256;
pub type ChainId = u64;
pub type BlockNumber = u64;

/// Account and chain notifications pushed by the wallet provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    AccountsChanged(Vec<Address>),
    ChainChanged(ChainId),
    Disconnected,
}

/// Outcome of waiting for a transaction to be included
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceiptSummary {
    pub tx_hash: TxHash,
    pub block_number: Option<BlockNumber>,
    pub success: bool,
}

/// What the network guard did to get onto the target chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkStatus {
    AlreadyOnTarget,
    Switched,
    Added,
}

/// Allowance requested when the swap helper cannot move enough of the input token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ApprovalPolicy {
    /// Approve `U256::MAX` once so later swaps skip the approval step.
    #[default]
    Unlimited,
    /// Approve exactly the input amount of the current swap.
    Exact,
}

impl ApprovalPolicy {
    pub fn approval_amount(&self, amount_in: Amount) -> Amount {
        match self {
            ApprovalPolicy::Unlimited => Amount::MAX,
            ApprovalPolicy::Exact => amount_in,
        }
    }
}

impl std::str::FromStr for ApprovalPolicy {
    type Err = crate::shared::error::SwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unlimited" | "max" => Ok(ApprovalPolicy::Unlimited),
            "exact" => Ok(ApprovalPolicy::Exact),
            other => Err(crate::shared::error::SwapError::config(format!(
                "Unknown approval policy: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ApprovalPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalPolicy::Unlimited => write!(f, "unlimited"),
            ApprovalPolicy::Exact => write!(f, "exact"),
        }
    }
}

// Result types for better error handling
pub type SwapResult<T> = Result<T, crate::shared::error::SwapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_amounts() {
        let amount = Amount::from(1_000u64);
        assert_eq!(ApprovalPolicy::Unlimited.approval_amount(amount), Amount::MAX);
        assert_eq!(ApprovalPolicy::Exact.approval_amount(amount), amount);
    }

    #[test]
    fn test_approval_policy_parsing() {
        assert_eq!("unlimited".parse::<ApprovalPolicy>().unwrap(), ApprovalPolicy::Unlimited);
        assert_eq!(" Exact ".parse::<ApprovalPolicy>().unwrap(), ApprovalPolicy::Exact);
        assert!("infinite-ish".parse::<ApprovalPolicy>().is_err());
        assert_eq!(ApprovalPolicy::default().to_string(), "unlimited");
    }
}
