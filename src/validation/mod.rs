//! Transaction Validation Module
//!
//! This module validates XRPL transactions before they are signed and submitted.
//! A rule table maps each transaction type to its required fields and a list of
//! composable validators (address format, numeric ranges, multi-signing, tickets,
//! regular/master key constraints, destination tags) that run against live ledger state.

pub mod codec;
mod context;
mod rules;
mod validator;
pub mod validators;


pub use context::ValidationContext;
pub use rules::{RuleTable, TxRule};
pub use validator::ValidationService;
pub use validators::{BoxedValidator, Validator};
