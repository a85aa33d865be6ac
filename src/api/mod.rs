//! API Module
//!
//! This module handles the JSON-RPC API for validating transactions.
//! It provides the HTTP endpoint that wallets use before signing.

mod server;
pub use server::{AppState, Server};
