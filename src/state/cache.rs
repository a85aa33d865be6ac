use crate::{
    AccountInfo, CheckInfo, EscrowInfo, LedgerSnapshot,
    ledger::{LedgerClient, LedgerError},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

struct CachedAccount {
    fetched_at: Instant,
    info: Option<AccountInfo>,
}

/// Account root cache in front of a ledger client
///
/// A form revalidates on every keystroke, so the same account root is
/// requested many times in a short window. Both found and not-found results
/// are kept for `ttl`; every other lookup goes straight to the inner client.
#[derive(Clone)]
pub struct AccountCache {
    inner: Arc<dyn LedgerClient>,
    ttl: Duration,
    accounts: Arc<RwLock<HashMap<String, CachedAccount>>>,
}

impl AccountCache {
    pub fn new(inner: Arc<dyn LedgerClient>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            accounts: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Drops the cached entry for `address`, e.g. after a submission changed it
    pub async fn invalidate(&self, address: &str) {
        self.accounts.write().await.remove(address);
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }
}

#[async_trait]
impl LedgerClient for AccountCache {
    async fn account_info(&self, address: &str) -> Result<Option<AccountInfo>, LedgerError> {
        {
            let accounts = self.accounts.read().await;
            if let Some(entry) = accounts.get(address) {
                if entry.fetched_at.elapsed() < self.ttl {
                    debug!("account cache hit for {}", address);
                    return Ok(entry.info.clone());
                }
            }
        }

        let info = self.inner.account_info(address).await?;
        let mut accounts = self.accounts.write().await;
        // Expired entries are dropped on every refill so the map only holds live accounts
        accounts.retain(|_, entry| entry.fetched_at.elapsed() < self.ttl);
        accounts.insert(
            address.to_string(),
            CachedAccount {
                fetched_at: Instant::now(),
                info: info.clone(),
            },
        );
        Ok(info)
    }

    async fn account_tickets(&self, address: &str) -> Result<Vec<u32>, LedgerError> {
        self.inner.account_tickets(address).await
    }

    async fn ledger_snapshot(&self) -> Result<LedgerSnapshot, LedgerError> {
        self.inner.ledger_snapshot().await
    }

    async fn escrow(&self, owner: &str, sequence: u32) -> Result<Option<EscrowInfo>, LedgerError> {
        self.inner.escrow(owner, sequence).await
    }

    async fn check(&self, check_id: &str) -> Result<Option<CheckInfo>, LedgerError> {
        self.inner.check(check_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;

    const ADDRESS: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";

    fn account() -> AccountInfo {
        AccountInfo {
            address: ADDRESS.to_string(),
            balance_drops: 50_000_000,
            sequence: 1,
            owner_count: 0,
            flags: 0,
            regular_key: None,
            signer_list: None,
        }
    }

    #[tokio::test]
    async fn serves_repeat_lookups_from_cache() {
        let ledger = Arc::new(MemoryLedger::new());
        ledger.put_account(account()).await;
        let cache = AccountCache::new(ledger.clone(), Duration::from_secs(60));

        assert!(cache.account_info(ADDRESS).await.unwrap().is_some());
        assert!(cache.account_info(ADDRESS).await.unwrap().is_some());
        assert_eq!(ledger.account_lookups(), 1);
    }

    #[tokio::test]
    async fn caches_missing_accounts_too() {
        let ledger = Arc::new(MemoryLedger::new());
        let cache = AccountCache::new(ledger.clone(), Duration::from_secs(60));

        assert!(cache.account_info(ADDRESS).await.unwrap().is_none());
        ledger.put_account(account()).await;
        assert!(cache.account_info(ADDRESS).await.unwrap().is_none());

        cache.invalidate(ADDRESS).await;
        assert!(cache.account_info(ADDRESS).await.unwrap().is_some());
        assert_eq!(ledger.account_lookups(), 2);
    }

    #[tokio::test]
    async fn expired_entries_are_refetched() {
        let ledger = Arc::new(MemoryLedger::new());
        ledger.put_account(account()).await;
        let cache = AccountCache::new(ledger.clone(), Duration::ZERO);

        cache.account_info(ADDRESS).await.unwrap();
        cache.account_info(ADDRESS).await.unwrap();
        assert_eq!(ledger.account_lookups(), 2);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn expired_entries_are_evicted() {
        const OTHER: &str = "rf1BiGeXwwQoi8Z2ueFYTEXSwuJYfV2Jpn";
        let ledger = Arc::new(MemoryLedger::new());
        ledger.put_account(account()).await;
        let cache = AccountCache::new(ledger.clone(), Duration::from_millis(50));

        cache.account_info(ADDRESS).await.unwrap();
        cache.account_info(OTHER).await.unwrap();
        assert_eq!(cache.len().await, 2);

        tokio::time::sleep(Duration::from_millis(80)).await;
        cache.account_info(ADDRESS).await.unwrap();
        assert_eq!(cache.len().await, 1);
    }
}
