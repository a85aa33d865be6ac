//! Faucet Proxy Module
//!
//! This module forwards account-funding requests to a test network faucet.
//! Browsers cannot call most faucets directly, so the service relays the call.

mod proxy;
pub use proxy::{FaucetError, FaucetProxy};
