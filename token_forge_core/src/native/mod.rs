// Native implementations

pub mod rpc_impl;
pub mod wallet;

pub use rpc_impl::NativeLedgerConnection;
pub use wallet::{load_wallet_keypair, KeypairWallet};
