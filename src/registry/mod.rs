//! Validation Registry Module
//! 
//! This module provides a database registry for storing validation outcomes.
//! Allows auditing rejected transactions without keeping the full form inputs.

mod database;
pub use database::{Registry, ValidationRecord};
