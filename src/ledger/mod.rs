//! Ledger Access Module
//!
//! This module provides read access to live XRP Ledger state for validation:
//! account roots, tickets, escrows, checks and fee/reserve parameters.
//!
//! # Implementations
//! - **RpcClient**: talks to a rippled / Clio node over JSON-RPC
//! - **MemoryLedger**: in-memory state, used by tests and offline runs

mod client;
mod memory;
mod rpc;

pub use client::{LedgerClient, LedgerError};
pub use memory::MemoryLedger;
pub use rpc::RpcClient;
