use super::{LedgerClient, LedgerError};
use crate::{AccountInfo, CheckInfo, EscrowInfo, LedgerSnapshot};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// In-memory ledger state
///
/// Holds account roots, tickets, escrows and checks behind async locks so it
/// can be shared with the API server the same way a remote client is.
#[derive(Default)]
pub struct MemoryLedger {
    accounts: RwLock<HashMap<String, AccountInfo>>,
    tickets: RwLock<HashMap<String, Vec<u32>>>,
    escrows: RwLock<HashMap<(String, u32), EscrowInfo>>,
    checks: RwLock<HashMap<String, CheckInfo>>,
    snapshot: RwLock<LedgerSnapshot>,
    account_lookups: AtomicUsize,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_account(&self, info: AccountInfo) {
        let mut accounts = self.accounts.write().await;
        accounts.insert(info.address.clone(), info);
    }

    pub async fn set_tickets(&self, address: &str, tickets: Vec<u32>) {
        self.tickets.write().await.insert(address.to_string(), tickets);
    }

    pub async fn put_escrow(&self, sequence: u32, escrow: EscrowInfo) {
        let mut escrows = self.escrows.write().await;
        escrows.insert((escrow.owner.clone(), sequence), escrow);
    }

    pub async fn put_check(&self, check_id: &str, check: CheckInfo) {
        // Check IDs are hex; lookups are case-insensitive
        self.checks
            .write()
            .await
            .insert(check_id.to_ascii_uppercase(), check);
    }

    pub async fn set_snapshot(&self, snapshot: LedgerSnapshot) {
        *self.snapshot.write().await = snapshot;
    }

    /// Number of `account_info` calls served so far
    pub fn account_lookups(&self) -> usize {
        self.account_lookups.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl LedgerClient for MemoryLedger {
    async fn account_info(&self, address: &str) -> Result<Option<AccountInfo>, LedgerError> {
        self.account_lookups.fetch_add(1, Ordering::Relaxed);
        Ok(self.accounts.read().await.get(address).cloned())
    }

    async fn account_tickets(&self, address: &str) -> Result<Vec<u32>, LedgerError> {
        Ok(self
            .tickets
            .read()
            .await
            .get(address)
            .cloned()
            .unwrap_or_default())
    }

    async fn ledger_snapshot(&self) -> Result<LedgerSnapshot, LedgerError> {
        Ok(*self.snapshot.read().await)
    }

    async fn escrow(&self, owner: &str, sequence: u32) -> Result<Option<EscrowInfo>, LedgerError> {
        let escrows = self.escrows.read().await;
        Ok(escrows.get(&(owner.to_string(), sequence)).cloned())
    }

    async fn check(&self, check_id: &str) -> Result<Option<CheckInfo>, LedgerError> {
        let checks = self.checks.read().await;
        Ok(checks.get(&check_id.to_ascii_uppercase()).cloned())
    }
}
