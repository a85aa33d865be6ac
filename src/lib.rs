//! This crate validates XRP Ledger transactions before they are signed.
//! It includes modules for transaction types, the validation rule engine,
//! ledger access, account caching, the validation log, faucet relaying,
//! the JSON-RPC API, and configuration.

pub mod types; // Transaction types, input fields and ledger objects.
pub mod api; // JSON-RPC endpoint.
pub mod validation; // Rule table and validators.
pub mod ledger; // Access to XRPL account and ledger state.
pub mod state; // Short-lived account cache in front of the ledger.
pub mod registry; // SQLite log of validation outcomes.
pub mod faucet; // Test network faucet relay.
pub mod config; // Defines and loads service configuration.

// Re-export commonly used types and configurations for easier access.
pub use types::*;
pub use config::Config;
pub use validation::ValidationService;
