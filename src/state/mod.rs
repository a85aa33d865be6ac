//! State Management Module
//! 
//! This module provides in-memory caching of account state for fast transaction validation.
//! The cache stores account roots (balance, sequence, flags, signer list) fetched from the ledger.

mod cache;
pub use cache::AccountCache;
