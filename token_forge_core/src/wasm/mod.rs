// WASM-specific implementations
pub mod rpc;
pub mod utils;
pub mod wallet;

// Re-exports
pub use rpc::*;
pub use wallet::*;
