use crate::{AccountInfo, CheckInfo, EscrowInfo, LedgerSnapshot};
use async_trait::async_trait;

/// Errors raised while reading ledger state
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("ledger returned error {code}: {message}")]
    Rpc { code: String, message: String },

    #[error("malformed ledger response: {0}")]
    Malformed(String),
}

/// Read-only view of the validated ledger.
///
/// Lookups of objects that do not exist resolve to `Ok(None)`; errors are
/// reserved for transport and protocol failures.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn account_info(&self, address: &str) -> Result<Option<AccountInfo>, LedgerError>;

    /// Ticket sequences currently owned by `address`.
    async fn account_tickets(&self, address: &str) -> Result<Vec<u32>, LedgerError>;

    async fn ledger_snapshot(&self) -> Result<LedgerSnapshot, LedgerError>;

    async fn escrow(&self, owner: &str, sequence: u32) -> Result<Option<EscrowInfo>, LedgerError>;

    async fn check(&self, check_id: &str) -> Result<Option<CheckInfo>, LedgerError>;
}
