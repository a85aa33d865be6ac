use super::{RuleTable, ValidationContext};
use crate::{TransactionType, TxInputs, ValidationReport, ledger::{LedgerClient, LedgerError}};
use std::sync::Arc;
use tracing::{debug, warn};

/// Runs the rule for a transaction type against a context
pub struct ValidationService {
    rules: RuleTable,
}

impl Default for ValidationService {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationService {
    pub fn new() -> Self {
        Self {
            rules: RuleTable::standard(),
        }
    }

    /// Validate a transaction under construction
    ///
    /// Checks required fields in declaration order, then runs every validator
    /// of the rule. All failures are collected; an empty vector means the
    /// transaction may be submitted.
    pub async fn validate(&self, tx_type: TransactionType, ctx: &ValidationContext) -> Vec<String> {
        debug!("Validating {} transaction", tx_type);

        let Some(rule) = self.rules.get(tx_type) else {
            warn!("No validation rule registered for {}", tx_type);
            return vec![format!("No validation rules defined for {}", tx_type)];
        };

        let mut errors: Vec<String> = rule
            .required_fields
            .iter()
            .filter(|field| !ctx.has(**field))
            .map(|field| format!("{} is required", field))
            .collect();

        for validator in &rule.validators {
            if let Some(error) = validator.check(ctx).await {
                errors.push(error);
            }
        }

        if errors.is_empty() {
            debug!("{} transaction passed validation", tx_type);
        } else {
            warn!("{} transaction failed validation: {:?}", tx_type, errors);
        }
        errors
    }

    /// Loads ledger state for `inputs` and validates them
    ///
    /// # Returns
    /// * `Ok(ValidationReport)` with every rule violation found
    /// * `Err(LedgerError)` if the ledger could not be reached
    pub async fn validate_inputs(
        &self,
        tx_type: TransactionType,
        inputs: TxInputs,
        client: Arc<dyn LedgerClient>,
    ) -> Result<ValidationReport, LedgerError> {
        let ctx = ValidationContext::load(client, inputs).await?;
        let errors = self.validate(tx_type, &ctx).await;
        Ok(ValidationReport::new(tx_type, errors))
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }
}
