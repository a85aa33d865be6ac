use super::codec;
use crate::{
    AccountInfo, Field, LedgerSnapshot, TxInputs,
    ledger::{LedgerClient, LedgerError},
};
use std::sync::Arc;

/// Everything a validator may look at
///
/// `account_info` is the source account as loaded when the context was built
/// (`None` when the account is malformed or not on the ledger). Validators
/// needing other ledger objects query `client` themselves.
#[derive(Clone)]
pub struct ValidationContext {
    pub inputs: TxInputs,
    pub account_info: Option<AccountInfo>,
    pub ledger: LedgerSnapshot,
    pub client: Arc<dyn LedgerClient>,
}

impl ValidationContext {
    /// Builds a context, fetching the source account and ledger parameters.
    ///
    /// The account lookup is skipped when the account field is missing or not
    /// a well-formed address; the validators report that case.
    pub async fn load(client: Arc<dyn LedgerClient>, inputs: TxInputs) -> Result<Self, LedgerError> {
        let account_info = match inputs.get(Field::Account) {
            Some(account) if codec::is_valid_classic_address(account) => {
                client.account_info(account).await?
            }
            _ => None,
        };
        let ledger = client.ledger_snapshot().await?;

        Ok(Self {
            inputs,
            account_info,
            ledger,
            client,
        })
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.inputs.get(field)
    }

    pub fn has(&self, field: Field) -> bool {
        self.inputs.has(field)
    }

    /// Source account address, if present
    pub fn account(&self) -> Option<&str> {
        self.get(Field::Account)
    }

    /// Fee in drops, falling back to the ledger base fee when not supplied
    pub fn fee_drops(&self) -> u64 {
        self.get(Field::Fee)
            .and_then(|f| f.parse().ok())
            .unwrap_or(self.ledger.base_fee_drops)
    }
}
