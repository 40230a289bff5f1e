//! JSON-RPC backed wallet and chain access

pub mod chain_client;
pub mod wallet_provider;

pub use chain_client::EthersChainClient;
pub use wallet_provider::JsonRpcWalletProvider;
