use bsc_swap_core::domain::deployment_for;
use bsc_swap_core::{NetworkConfig, SwapConfig, TokenRegistry};

fn main() -> anyhow::Result<()> {
    let config = SwapConfig::from_env()?;
    let network = NetworkConfig::bsc_testnet();
    let deployment = deployment_for(network.chain_id);

    println!("BSC Swap Core Configuration:\n");
    println!("  Target Network: {} ({} / {})", network.chain_name, network.chain_id, network.chain_id_hex());
    println!("  Wallet RPC URL: {}", config.rpc_url);
    println!("  Swap Helper: {:?}", config.swap_helper);
    println!("  Deployment Tx: {}", if deployment.deployment_tx.is_empty() { "(not set)" } else { &deployment.deployment_tx });
    println!("  Quote Debounce: {} ms", config.quote_debounce_ms);
    println!("  Confirmation Timeout: {} s", config.confirmation_timeout_secs);
    println!("  Receipt Poll Interval: {} ms", config.receipt_poll_ms);
    println!("  Default Slippage: {}%", config.default_slippage_bps as f64 / 100.0);
    println!("  Approval Policy: {}", config.approval_policy);
    println!("\nTokens:");
    for token in TokenRegistry::testnet().tokens() {
        println!("  {:<5} {:<12} {:?}", token.symbol, token.name, token.address);
    }
    Ok(())
}
