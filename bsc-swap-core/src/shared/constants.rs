//! Constants for the swap core
//!
//! This module contains all constants used throughout the swap core.

// Target network (BSC Testnet)
pub const TARGET_CHAIN_ID: u64 = 97;
pub const TARGET_CHAIN_NAME: &str = "BSC Testnet";
pub const TARGET_RPC_URL: &str = "https://data-seed-prebsc-1-s1.binance.org:8545/";
pub const TARGET_BLOCK_EXPLORER: &str = "https://testnet.bscscan.com/";
pub const NATIVE_CURRENCY_NAME: &str = "BNB";
pub const NATIVE_CURRENCY_SYMBOL: &str = "BNB";
pub const NATIVE_CURRENCY_DECIMALS: u8 = 18;

pub const BSC_MAINNET_CHAIN_ID: u64 = 56;

// Contract addresses (BSC Testnet)
pub const SWAP_HELPER_ADDRESS: &str = "0x65d31688983Fbc145216833E2b228d89193bb62b";
pub const PANCAKE_ROUTER_ADDRESS: &str = "0xD99D1c33F9fC3444f8101754aBC46c52416550D1";
pub const WBNB_ADDRESS: &str = "0xae13d989daC2f0dEbFf460aC112a837C89BAa7cd";
pub const BUSD_ADDRESS: &str = "0x78867BbEeF44f2326bF8DDd1941a4439382EF2A7";
pub const USDT_ADDRESS: &str = "0x7ef95a0FEE0Dd31b22626fF2E1d8Abc8Df806Fdd";

// Swap helper deployment record
pub const SWAP_HELPER_DEPLOYMENT_TX: &str =
    "0xdda9bc794dbeeb897c907de6a4822765f302e9925a19da418963a4af7e6c1df4";
pub const SWAP_HELPER_DEPLOYMENT_TIME: &str = "2025-09-03T10:33:42.216Z";

// Wallet provider
pub const WALLET_INSTALL_URL: &str = "https://metamask.io/download/";

// Quote timing
pub const QUOTE_DEBOUNCE_MS: u64 = 500;

// Slippage
pub const BPS_DENOMINATOR: u32 = 10_000;
pub const DEFAULT_SLIPPAGE_BPS: u32 = 50; // 0.5%
pub const SLIPPAGE_PRESETS_BPS: &[u32] = &[10, 50, 100, 300];

// Transaction confirmation
pub const CONFIRMATION_TIMEOUT_SECS: u64 = 120;
pub const RECEIPT_POLL_INTERVAL_MS: u64 = 1000;

// Wallet event watcher
pub const WALLET_POLL_INTERVAL_MS: u64 = 2000;
pub const WALLET_EVENT_CAPACITY: usize = 32;

// Human-readable ABI fragments
pub const ERC20_ABI: &[&str] = &[
    "function balanceOf(address owner) view returns (uint256)",
    "function transfer(address to, uint256 amount) returns (bool)",
    "function approve(address spender, uint256 amount) returns (bool)",
    "function allowance(address owner, address spender) view returns (uint256)",
    "function symbol() view returns (string)",
    "function decimals() view returns (uint8)",
];

pub const SWAP_HELPER_ABI: &[&str] = &[
    "function swapTokens(address tokenIn, address tokenOut, uint256 amountIn, uint256 amountOutMin, address to) external",
    "function swapETHForTokens(address tokenOut, uint256 amountOutMin, address to) external payable",
    "function getAmountOut(address tokenIn, address tokenOut, uint256 amountIn) external view returns (uint256)",
    "function feePercent() external view returns (uint256)",
    "function FEE_DENOMINATOR() external view returns (uint256)",
    "event TokenSwap(address indexed user, address indexed tokenIn, address indexed tokenOut, uint256 amountIn, uint256 amountOut, uint256 fee)",
];

// Build information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_network() {
        assert_eq!(TARGET_CHAIN_ID, 97);
        assert_eq!(NATIVE_CURRENCY_SYMBOL, "BNB");
        assert_eq!(NATIVE_CURRENCY_DECIMALS, 18);
    }

    #[test]
    fn test_slippage_presets() {
        assert!(SLIPPAGE_PRESETS_BPS.contains(&DEFAULT_SLIPPAGE_BPS));
        assert!(SLIPPAGE_PRESETS_BPS.iter().all(|bps| *bps < BPS_DENOMINATOR));
    }

    #[test]
    fn test_abi_fragments_parse() {
        assert!(ethers::abi::parse_abi(ERC20_ABI).is_ok());
        assert!(ethers::abi::parse_abi(SWAP_HELPER_ABI).is_ok());
    }
}
