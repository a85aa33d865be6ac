//! Validator Library
//!
//! Reusable checks composed by the rule table. Each validator looks at one
//! business rule and returns `None` when it holds or an error message when it
//! does not. Field validators ignore absent fields; presence is enforced by
//! the rule's required-field list.

use super::{ValidationContext, codec};
use crate::{
    Field, LSF_ALLOW_TRUSTLINE_CLAWBACK, LSF_DISABLE_MASTER, LSF_REQUIRE_DEST_TAG,
    TransactionType,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// A single business rule evaluated against a [`ValidationContext`]
#[async_trait]
pub trait Validator: Send + Sync {
    async fn check(&self, ctx: &ValidationContext) -> Option<String>;
}

pub type BoxedValidator = Box<dyn Validator>;

struct FnValidator<F>(F);

#[async_trait]
impl<F> Validator for FnValidator<F>
where
    F: Fn(&ValidationContext) -> Option<String> + Send + Sync,
{
    async fn check(&self, ctx: &ValidationContext) -> Option<String> {
        (self.0)(ctx)
    }
}

/// Lifts a synchronous check into a validator
pub fn from_fn<F>(f: F) -> BoxedValidator
where
    F: Fn(&ValidationContext) -> Option<String> + Send + Sync + 'static,
{
    Box::new(FnValidator(f))
}

const MAX_MEMO_BYTES: usize = 1024;
const MAX_TICKETS: u32 = 250;
const MAX_SIGNER_ENTRIES: usize = 32;
const MAX_DELEGATED_PERMISSIONS: usize = 10;
const MAX_AUTH_ACCOUNTS: usize = 4;
const MAX_ACCEPTED_CREDENTIALS: usize = 10;
pub(super) const MAX_CREDENTIAL_TYPE_BYTES: usize = 64;
const DELETE_SEQUENCE_GAP: u32 = 256;
const MAX_DELETABLE_OWNER_COUNT: u32 = 1000;
const ASF_DISABLE_MASTER: u32 = 4;

/// Transaction types that can never be delegated
const NON_DELEGABLE: &[TransactionType] = &[
    TransactionType::AccountSet,
    TransactionType::SetRegularKey,
    TransactionType::SignerListSet,
    TransactionType::DelegateSet,
    TransactionType::AccountDelete,
];

const GRANULAR_PERMISSIONS: &[&str] = &[
    "TrustlineAuthorize",
    "TrustlineFreeze",
    "TrustlineUnfreeze",
    "AccountDomainSet",
    "AccountEmailHashSet",
    "AccountMessageKeySet",
    "AccountTransferRateSet",
    "AccountTickSizeSet",
    "PaymentMint",
    "PaymentBurn",
    "MPTokenIssuanceLock",
    "MPTokenIssuanceUnlock",
];

fn now() -> DateTime<Utc> {
    Utc::now()
}

fn ripple_time_passed(secs: u32) -> bool {
    codec::from_ripple_time(secs).is_some_and(|t| now() >= t)
}

fn format_ripple_time(secs: u32) -> String {
    codec::from_ripple_time(secs)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| secs.to_string())
}

// ---------------------------------------------------------------------------
// Field format validators
// ---------------------------------------------------------------------------

pub fn is_valid_address(field: Field) -> BoxedValidator {
    from_fn(move |ctx| {
        let value = ctx.get(field)?;
        (!codec::is_valid_classic_address(value))
            .then(|| format!("Invalid {} address: {}", field.label().to_lowercase(), value))
    })
}

pub fn is_valid_secret(field: Field) -> BoxedValidator {
    from_fn(move |ctx| {
        let value = ctx.get(field)?;
        (!codec::is_valid_seed(value)).then(|| format!("{} is not a valid secret", field))
    })
}

/// Decimal number within an inclusive range
pub fn numeric(field: Field, min: Option<f64>, max: Option<f64>) -> BoxedValidator {
    from_fn(move |ctx| {
        let raw = ctx.get(field)?;
        let value = match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => return Some(format!("{} must be a number", field)),
        };
        if let Some(min) = min.filter(|m| value < *m) {
            return Some(format!("{} must be at least {}", field, min));
        }
        if let Some(max) = max.filter(|m| value > *m) {
            return Some(format!("{} must be at most {}", field, max));
        }
        None
    })
}

/// Decimal number strictly greater than zero
pub fn positive(field: Field) -> BoxedValidator {
    from_fn(move |ctx| {
        let raw = ctx.get(field)?;
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v > 0.0 => None,
            Ok(v) if v.is_finite() => Some(format!("{} must be greater than 0", field)),
            _ => Some(format!("{} must be a number", field)),
        }
    })
}

/// Whole number within an inclusive range
pub fn integer(field: Field, min: u64, max: u64) -> BoxedValidator {
    from_fn(move |ctx| {
        let raw = ctx.get(field)?;
        match raw.parse::<u64>() {
            Ok(v) if (min..=max).contains(&v) => None,
            Ok(_) => Some(format!("{} must be between {} and {}", field, min, max)),
            Err(_) => Some(format!("{} must be a whole number", field)),
        }
    })
}

/// Amount whose denomination is given by `currency`.
///
/// XRP amounts are decimal XRP with at most six fractional digits; token
/// amounts are any positive decimal.
pub fn amount(field: Field, currency: Field) -> BoxedValidator {
    from_fn(move |ctx| {
        let raw = ctx.get(field)?;
        if codec::is_xrp(ctx.get(currency)) {
            return match codec::xrp_to_drops(raw) {
                Some(0) => Some(format!("{} must be greater than 0", field)),
                Some(_) => None,
                None => Some(format!(
                    "{} must be a valid XRP amount with at most 6 decimal places",
                    field
                )),
            };
        }
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v > 0.0 => None,
            _ => Some(format!("{} must be a positive number", field)),
        }
    })
}

/// Hex blob of at most `max_bytes` bytes
pub fn hex(field: Field, max_bytes: usize) -> BoxedValidator {
    from_fn(move |ctx| {
        let raw = ctx.get(field)?;
        match codec::hex_len(raw) {
            None => Some(format!("{} must be hex encoded", field)),
            Some(0) => Some(format!("{} must not be empty", field)),
            Some(n) if n > max_bytes => {
                Some(format!("{} must be at most {} bytes", field, max_bytes))
            }
            Some(_) => None,
        }
    })
}

/// Hex blob of exactly `bytes` bytes
pub fn hex_exact(field: Field, bytes: usize) -> BoxedValidator {
    from_fn(move |ctx| {
        let raw = ctx.get(field)?;
        (codec::hex_len(raw) != Some(bytes))
            .then(|| format!("{} must be {} hex characters", field, bytes * 2))
    })
}

pub fn hash256(field: Field) -> BoxedValidator {
    from_fn(move |ctx| {
        let raw = ctx.get(field)?;
        (!codec::is_hash256(raw)).then(|| format!("{} must be a 64 character hex string", field))
    })
}

pub fn currency_code(field: Field) -> BoxedValidator {
    from_fn(move |ctx| {
        let raw = ctx.get(field)?;
        if raw.eq_ignore_ascii_case("XRP") {
            return None;
        }
        (!codec::is_valid_currency_code(raw)).then(|| format!("Invalid currency code: {}", raw))
    })
}

/// Token currencies need an issuer, XRP must not have one
pub fn issued_asset(currency: Field, issuer: Field) -> BoxedValidator {
    from_fn(move |ctx| {
        let xrp = codec::is_xrp(ctx.get(currency));
        match (xrp, ctx.has(issuer)) {
            (true, true) => Some(format!("{} must be empty for XRP", issuer)),
            (false, false) => Some(format!("{} is required for non-XRP currency", issuer)),
            _ => None,
        }
    })
}

/// The (currency, issuer) pairs of a two-asset transaction must differ
pub fn distinct_assets() -> BoxedValidator {
    from_fn(|ctx| {
        let asset = |currency: Field, issuer: Field| {
            let c = ctx.get(currency).unwrap_or("XRP").to_ascii_uppercase();
            let i = ctx.get(issuer).unwrap_or_default().to_string();
            (c, i)
        };
        (asset(Field::Currency, Field::Issuer) == asset(Field::Currency2, Field::Issuer2))
            .then(|| "The two assets must be different".to_string())
    })
}

pub fn not_self(field: Field) -> BoxedValidator {
    from_fn(move |ctx| {
        let value = ctx.get(field)?;
        (Some(value) == ctx.account())
            .then(|| format!("{} cannot be the source account", field))
    })
}

pub fn exactly_one_of(a: Field, b: Field) -> BoxedValidator {
    from_fn(move |ctx| match (ctx.has(a), ctx.has(b)) {
        (true, true) => Some(format!("Specify either {} or {}, not both", a, b)),
        (false, false) => Some(format!("Either {} or {} is required", a, b)),
        _ => None,
    })
}

pub fn at_least_one_of(fields: &'static [Field]) -> BoxedValidator {
    from_fn(move |ctx| {
        if fields.iter().any(|f| ctx.has(*f)) {
            return None;
        }
        let names: Vec<&str> = fields.iter().map(|f| f.label()).collect();
        Some(format!("At least one of {} is required", names.join(", ")))
    })
}

pub fn both_or_neither(a: Field, b: Field) -> BoxedValidator {
    from_fn(move |ctx| {
        (ctx.has(a) != ctx.has(b)).then(|| format!("{} and {} must be provided together", a, b))
    })
}

pub fn time(field: Field) -> BoxedValidator {
    from_fn(move |ctx| {
        let raw = ctx.get(field)?;
        codec::parse_time(raw)
            .is_none()
            .then(|| {
                format!(
                    "{} must be a unix timestamp or RFC 3339 date between 2000-01-01 and 2136-02-07",
                    field
                )
            })
    })
}

pub fn future_time(field: Field) -> BoxedValidator {
    from_fn(move |ctx| {
        let at = codec::parse_time(ctx.get(field)?)?;
        (at <= now()).then(|| format!("{} must be in the future", field))
    })
}

pub fn memo_length() -> BoxedValidator {
    from_fn(|ctx| {
        let memo = ctx.get(Field::Memo)?;
        (memo.len() > MAX_MEMO_BYTES)
            .then(|| format!("Memo must be at most {} bytes", MAX_MEMO_BYTES))
    })
}

// ---------------------------------------------------------------------------
// Signing validators
// ---------------------------------------------------------------------------

/// A seed is needed unless another signing mode supplies the keys
pub fn signing_secret() -> BoxedValidator {
    from_fn(|ctx| {
        if ctx.inputs.use_multi_sign || ctx.inputs.is_regular_key_address {
            return None;
        }
        match ctx.get(Field::Seed) {
            None => Some("Seed is required".to_string()),
            Some(seed) if !codec::is_valid_seed(seed) => Some("Seed is not a valid secret".to_string()),
            Some(_) => None,
        }
    })
}

pub fn account_exists() -> BoxedValidator {
    from_fn(|ctx| {
        let account = ctx.account()?;
        if !codec::is_valid_classic_address(account) || ctx.account_info.is_some() {
            return None;
        }
        Some(format!("Account {} not found on ledger", account))
    })
}

pub fn fee_at_least_base() -> BoxedValidator {
    from_fn(|ctx| {
        let raw = ctx.get(Field::Fee)?;
        match raw.parse::<u64>() {
            Err(_) => Some("Fee must be a whole number of drops".to_string()),
            Ok(fee) if fee < ctx.ledger.base_fee_drops => Some(format!(
                "Fee must be at least {} drops",
                ctx.ledger.base_fee_drops
            )),
            Ok(_) => None,
        }
    })
}

pub fn exclusive_signing_modes() -> BoxedValidator {
    from_fn(|ctx| {
        (ctx.inputs.use_multi_sign && ctx.inputs.is_regular_key_address)
            .then(|| "Choose either multi-signing or regular key signing, not both".to_string())
    })
}

/// Multi-signing inputs must match the account's signer list and meet its quorum
pub fn multi_sign() -> BoxedValidator {
    from_fn(|ctx| {
        if !ctx.inputs.use_multi_sign {
            return None;
        }
        let addresses = &ctx.inputs.multi_sign_addresses;
        let seeds = &ctx.inputs.multi_sign_seeds;

        if addresses.is_empty() {
            return Some("At least one signer address is required for multi-signing".to_string());
        }
        if seeds.len() != addresses.len() {
            return Some("Number of signer seeds must match number of signer addresses".to_string());
        }

        let mut seen = HashSet::new();
        let mut signers = Vec::with_capacity(addresses.len());
        for (i, (address, seed)) in addresses.iter().zip(seeds).enumerate() {
            let address = address.trim();
            if !codec::is_valid_classic_address(address) {
                return Some(format!("Invalid signer address: {}", address));
            }
            if !codec::is_valid_seed(seed.trim()) {
                return Some(format!("Invalid signer seed at position {}", i + 1));
            }
            if !seen.insert(address) {
                return Some(format!("Duplicate signer address: {}", address));
            }
            signers.push(address);
        }

        // Without account state the remaining checks cannot run
        let info = ctx.account_info.as_ref()?;
        let Some(list) = &info.signer_list else {
            return Some("Multi-signing is not enabled for this account (no signer list)".to_string());
        };

        let mut weight: u32 = 0;
        for address in signers {
            match list.entries.iter().find(|e| e.account == address) {
                Some(entry) => weight += entry.weight as u32,
                None => return Some(format!("{} is not in the account's signer list", address)),
            }
        }
        (weight < list.quorum).then(|| {
            format!(
                "Signer weights ({}) do not meet the quorum ({})",
                weight, list.quorum
            )
        })
    })
}

pub fn regular_key_signing() -> BoxedValidator {
    from_fn(|ctx| {
        if !ctx.inputs.is_regular_key_address {
            return None;
        }
        let Some(address) = ctx.get(Field::RegularKeyAddress) else {
            return Some("Regular key address is required".to_string());
        };
        if !codec::is_valid_classic_address(address) {
            return Some(format!("Invalid regular key address: {}", address));
        }
        match ctx.get(Field::RegularKeySeed) {
            None => return Some("Regular key seed is required".to_string()),
            Some(seed) if !codec::is_valid_seed(seed) => {
                return Some("Regular key seed is not a valid secret".to_string());
            }
            Some(_) => {}
        }

        let info = ctx.account_info.as_ref()?;
        match info.regular_key.as_deref() {
            None => Some("No regular key is set on this account".to_string()),
            Some(key) if key != address => {
                Some("Regular key address does not match the account's regular key".to_string())
            }
            Some(_) => None,
        }
    })
}

pub fn master_key_disabled_requires_alt_signing() -> BoxedValidator {
    from_fn(|ctx| {
        let info = ctx.account_info.as_ref()?;
        let alternative = ctx.inputs.use_multi_sign || ctx.inputs.is_regular_key_address;
        (info.has_flag(LSF_DISABLE_MASTER) && !alternative).then(|| {
            "Master key is disabled; sign with the regular key or multi-sign".to_string()
        })
    })
}

struct TicketValidation;

#[async_trait]
impl Validator for TicketValidation {
    async fn check(&self, ctx: &ValidationContext) -> Option<String> {
        let raw = ctx.get(Field::TicketSequence)?;
        let ticket = match raw.parse::<u32>() {
            Ok(t) if t > 0 => t,
            _ => return Some("Ticket sequence must be a positive integer".to_string()),
        };
        let account = ctx.account()?;
        ctx.account_info.as_ref()?;

        match ctx.client.account_tickets(account).await {
            Ok(tickets) if tickets.contains(&ticket) => None,
            Ok(_) => Some(format!("Ticket {} does not exist on account {}", ticket, account)),
            Err(e) => Some(format!("Unable to load tickets: {}", e)),
        }
    }
}

/// The referenced ticket must be owned by the source account
pub fn ticket_validation() -> BoxedValidator {
    Box::new(TicketValidation)
}

// ---------------------------------------------------------------------------
// Destination and balance validators
// ---------------------------------------------------------------------------

struct RequireDestinationTag;

#[async_trait]
impl Validator for RequireDestinationTag {
    async fn check(&self, ctx: &ValidationContext) -> Option<String> {
        let destination = ctx.get(Field::Destination)?;
        if ctx.has(Field::DestinationTag) || !codec::is_valid_classic_address(destination) {
            return None;
        }
        match ctx.client.account_info(destination).await {
            Ok(Some(info)) if info.has_flag(LSF_REQUIRE_DEST_TAG) => {
                Some("Destination account requires a destination tag".to_string())
            }
            Ok(_) => None,
            Err(e) => Some(format!("Unable to load destination account: {}", e)),
        }
    }
}

pub fn require_destination_tag_if_needed() -> BoxedValidator {
    Box::new(RequireDestinationTag)
}

struct AccountOnLedger(Field);

#[async_trait]
impl Validator for AccountOnLedger {
    async fn check(&self, ctx: &ValidationContext) -> Option<String> {
        let address = ctx.get(self.0)?;
        if !codec::is_valid_classic_address(address) {
            return None;
        }
        match ctx.client.account_info(address).await {
            Ok(Some(_)) => None,
            Ok(None) => Some(format!("{} account {} not found on ledger", self.0, address)),
            Err(e) => Some(format!("Unable to load {} account: {}", self.0.label().to_lowercase(), e)),
        }
    }
}

/// The account named by `field` must already exist
pub fn account_on_ledger(field: Field) -> BoxedValidator {
    Box::new(AccountOnLedger(field))
}

struct FundsNewDestination;

#[async_trait]
impl Validator for FundsNewDestination {
    async fn check(&self, ctx: &ValidationContext) -> Option<String> {
        let destination = ctx.get(Field::Destination)?;
        if !codec::is_valid_classic_address(destination) {
            return None;
        }
        match ctx.client.account_info(destination).await {
            Ok(Some(_)) => return None,
            Ok(None) => {}
            Err(e) => return Some(format!("Unable to load destination account: {}", e)),
        }

        if !codec::is_xrp(ctx.get(Field::Currency)) {
            return Some(format!(
                "Destination account {} does not exist and cannot receive tokens",
                destination
            ));
        }
        let drops = codec::xrp_to_drops(ctx.get(Field::Amount)?)?;
        (drops < ctx.ledger.base_reserve_drops).then(|| {
            format!(
                "Destination account {} does not exist; send at least {} XRP to create it",
                destination,
                codec::drops_to_xrp(ctx.ledger.base_reserve_drops)
            )
        })
    }
}

/// Payments to unfunded accounts must deliver at least the base reserve in XRP
pub fn funds_new_destination() -> BoxedValidator {
    Box::new(FundsNewDestination)
}

/// XRP `field` plus fee must fit in the balance above the account reserve
pub fn sufficient_xrp_balance(field: Field) -> BoxedValidator {
    from_fn(move |ctx| {
        if !codec::is_xrp(ctx.get(Field::Currency)) {
            return None;
        }
        let info = ctx.account_info.as_ref()?;
        let drops = codec::xrp_to_drops(ctx.get(field)?)?;

        let reserve = (info.owner_count as u64)
            .saturating_mul(ctx.ledger.owner_reserve_drops)
            .saturating_add(ctx.ledger.base_reserve_drops);
        let available = info.balance_drops.saturating_sub(reserve);
        let required = drops.saturating_add(ctx.fee_drops());

        (required > available).then(|| {
            format!(
                "Insufficient XRP balance: {} XRP available after reserve, {} XRP required",
                codec::drops_to_xrp(available),
                codec::drops_to_xrp(required)
            )
        })
    })
}

// ---------------------------------------------------------------------------
// Account configuration validators
// ---------------------------------------------------------------------------

/// Numeric value of an AccountSet flag field, so "4" and "04" compare equal
fn flag(ctx: &ValidationContext, field: Field) -> Option<u32> {
    ctx.get(field)?.parse().ok()
}

pub fn account_set_flags() -> BoxedValidator {
    from_fn(|ctx| {
        if let (Some(set), Some(clear)) = (flag(ctx, Field::SetFlag), flag(ctx, Field::ClearFlag)) {
            if set == clear {
                return Some("Set flag and Clear flag cannot be the same".to_string());
            }
        }
        if let Some(rate) = ctx.get(Field::TransferRate) {
            let ok = rate
                .parse::<u64>()
                .is_ok_and(|r| r == 0 || (1_000_000_000..=2_000_000_000).contains(&r));
            if !ok {
                return Some(
                    "Transfer rate must be 0 or between 1000000000 and 2000000000".to_string(),
                );
            }
        }
        if let Some(tick) = ctx.get(Field::TickSize) {
            let ok = tick
                .parse::<u8>()
                .is_ok_and(|t| t == 0 || (3..=15).contains(&t));
            if !ok {
                return Some("Tick size must be 0 or between 3 and 15".to_string());
            }
        }
        if let Some(domain) = ctx.get(Field::Domain) {
            if domain.len() > 256 || !domain.is_ascii() {
                return Some("Domain must be at most 256 ASCII characters".to_string());
            }
        }
        None
    })
}

pub fn disable_master_allowed() -> BoxedValidator {
    from_fn(|ctx| {
        if flag(ctx, Field::SetFlag) != Some(ASF_DISABLE_MASTER) {
            return None;
        }
        let info = ctx.account_info.as_ref()?;
        (info.regular_key.is_none() && info.signer_list.is_none()).then(|| {
            "Cannot disable the master key without a regular key or signer list".to_string()
        })
    })
}

/// Clearing the regular key must not leave the account without a signing key
pub fn regular_key_removal_allowed() -> BoxedValidator {
    from_fn(|ctx| {
        if ctx.has(Field::RegularKey) {
            return None;
        }
        let info = ctx.account_info.as_ref()?;
        (info.has_flag(LSF_DISABLE_MASTER) && info.signer_list.is_none()).then(|| {
            "Cannot remove the regular key while the master key is disabled and no signer list exists"
                .to_string()
        })
    })
}

pub fn signer_entries() -> BoxedValidator {
    from_fn(|ctx| {
        let quorum: u32 = ctx.get(Field::SignerQuorum)?.parse().ok()?;
        let entries = &ctx.inputs.signer_entries;

        if quorum == 0 {
            return (!entries.is_empty()).then(|| {
                "Signer entries must be empty when deleting the signer list (quorum 0)".to_string()
            });
        }
        if entries.is_empty() {
            return Some("At least one signer entry is required".to_string());
        }
        if entries.len() > MAX_SIGNER_ENTRIES {
            return Some(format!(
                "At most {} signer entries are allowed",
                MAX_SIGNER_ENTRIES
            ));
        }

        let mut seen = HashSet::new();
        let mut total: u32 = 0;
        for entry in entries {
            let address = entry.account.trim();
            if !codec::is_valid_classic_address(address) {
                return Some(format!("Invalid signer address: {}", address));
            }
            if Some(address) == ctx.account() {
                return Some("The account cannot be in its own signer list".to_string());
            }
            if !seen.insert(address) {
                return Some(format!("Duplicate signer address: {}", address));
            }
            match entry.weight.trim().parse::<u16>() {
                Ok(w) if w >= 1 => total += w as u32,
                _ => {
                    return Some(format!(
                        "Signer weight for {} must be between 1 and 65535",
                        address
                    ));
                }
            }
        }
        (total < quorum).then(|| {
            format!(
                "Signer quorum {} exceeds total signer weight {}",
                quorum, total
            )
        })
    })
}

pub fn account_deletable() -> BoxedValidator {
    from_fn(|ctx| {
        let info = ctx.account_info.as_ref()?;
        let ledger = &ctx.ledger;
        if info.sequence.saturating_add(DELETE_SEQUENCE_GAP) > ledger.ledger_index {
            return Some(format!(
                "Account sequence {} must be at least {} below the current ledger index {}",
                info.sequence, DELETE_SEQUENCE_GAP, ledger.ledger_index
            ));
        }
        if info.owner_count > MAX_DELETABLE_OWNER_COUNT {
            return Some(format!(
                "Account owns {} objects; accounts with more than {} cannot be deleted",
                info.owner_count, MAX_DELETABLE_OWNER_COUNT
            ));
        }
        if let Some(fee) = ctx.get(Field::Fee).and_then(|f| f.parse::<u64>().ok()) {
            if fee < ledger.owner_reserve_drops {
                return Some(format!(
                    "Account deletion requires a fee of at least {} drops",
                    ledger.owner_reserve_drops
                ));
            }
        }
        None
    })
}

struct TicketCount;

#[async_trait]
impl Validator for TicketCount {
    async fn check(&self, ctx: &ValidationContext) -> Option<String> {
        let requested: u32 = ctx.get(Field::TicketCount)?.parse().ok()?;
        let account = ctx.account()?;
        ctx.account_info.as_ref()?;

        match ctx.client.account_tickets(account).await {
            Ok(existing) if (existing.len() as u32).saturating_add(requested) > MAX_TICKETS => {
                Some(format!(
                    "Account already holds {} tickets; at most {} are allowed",
                    existing.len(),
                    MAX_TICKETS
                ))
            }
            Ok(_) => None,
            Err(e) => Some(format!("Unable to load tickets: {}", e)),
        }
    }
}

/// Existing plus requested tickets must stay within the per-account limit
pub fn ticket_count() -> BoxedValidator {
    Box::new(TicketCount)
}

pub fn delegate_permissions() -> BoxedValidator {
    from_fn(|ctx| {
        let permissions = &ctx.inputs.permissions;
        if permissions.is_empty() {
            return Some("At least one permission is required".to_string());
        }
        if permissions.len() > MAX_DELEGATED_PERMISSIONS {
            return Some(format!(
                "At most {} permissions may be delegated",
                MAX_DELEGATED_PERMISSIONS
            ));
        }

        let mut seen = HashSet::new();
        for permission in permissions {
            let permission = permission.trim();
            if !seen.insert(permission) {
                return Some(format!("Duplicate permission: {}", permission));
            }
            if GRANULAR_PERMISSIONS.contains(&permission) {
                continue;
            }
            match permission.parse::<TransactionType>() {
                Ok(tx_type) if NON_DELEGABLE.contains(&tx_type) => {
                    return Some(format!("Permission {} cannot be delegated", permission));
                }
                Ok(_) => {}
                Err(_) => return Some(format!("Unknown permission: {}", permission)),
            }
        }
        None
    })
}

pub fn clawback_enabled() -> BoxedValidator {
    from_fn(|ctx| {
        let info = ctx.account_info.as_ref()?;
        (!info.has_flag(LSF_ALLOW_TRUSTLINE_CLAWBACK))
            .then(|| "Clawback is not enabled on this account".to_string())
    })
}

// ---------------------------------------------------------------------------
// Escrow and check validators
// ---------------------------------------------------------------------------

pub fn escrow_create_times() -> BoxedValidator {
    from_fn(|ctx| {
        if !ctx.has(Field::FinishAfter) && !ctx.has(Field::Condition) {
            return Some("Escrow requires Finish after or a Condition".to_string());
        }
        let finish = ctx.get(Field::FinishAfter).and_then(codec::parse_time);
        let cancel = ctx.get(Field::CancelAfter).and_then(codec::parse_time);
        match (finish, cancel) {
            (Some(f), Some(c)) if c <= f => {
                Some("Cancel after must be later than Finish after".to_string())
            }
            _ => None,
        }
    })
}

/// Looks up the escrow addressed by the Owner and Escrow sequence fields
async fn load_escrow(ctx: &ValidationContext) -> Result<Option<crate::EscrowInfo>, String> {
    let (Some(owner), Some(sequence)) = (ctx.get(Field::Owner), ctx.get(Field::EscrowSequence))
    else {
        return Ok(None);
    };
    let Ok(sequence) = sequence.parse::<u32>() else {
        return Ok(None);
    };
    if !codec::is_valid_classic_address(owner) {
        return Ok(None);
    }
    match ctx.client.escrow(owner, sequence).await {
        Ok(Some(escrow)) => Ok(Some(escrow)),
        Ok(None) => Err(format!("Escrow {} not found for owner {}", sequence, owner)),
        Err(e) => Err(format!("Unable to load escrow: {}", e)),
    }
}

struct EscrowFinishable;

#[async_trait]
impl Validator for EscrowFinishable {
    async fn check(&self, ctx: &ValidationContext) -> Option<String> {
        let escrow = match load_escrow(ctx).await {
            Ok(escrow) => escrow?,
            Err(message) => return Some(message),
        };
        if let Some(finish) = escrow.finish_after {
            if !ripple_time_passed(finish) {
                return Some(format!(
                    "Escrow cannot be finished before {}",
                    format_ripple_time(finish)
                ));
            }
        }
        if escrow.cancel_after.is_some_and(ripple_time_passed) {
            return Some("Escrow has expired and can only be cancelled".to_string());
        }
        if escrow.condition.is_some() && !ctx.has(Field::Fulfillment) {
            return Some("Escrow is conditional; a Fulfillment is required".to_string());
        }
        None
    }
}

pub fn escrow_finishable() -> BoxedValidator {
    Box::new(EscrowFinishable)
}

struct EscrowCancellable;

#[async_trait]
impl Validator for EscrowCancellable {
    async fn check(&self, ctx: &ValidationContext) -> Option<String> {
        let escrow = match load_escrow(ctx).await {
            Ok(escrow) => escrow?,
            Err(message) => return Some(message),
        };
        match escrow.cancel_after {
            None => Some("Escrow has no Cancel after time and cannot be cancelled".to_string()),
            Some(cancel) if !ripple_time_passed(cancel) => Some(format!(
                "Escrow cannot be cancelled before {}",
                format_ripple_time(cancel)
            )),
            Some(_) => None,
        }
    }
}

pub fn escrow_cancellable() -> BoxedValidator {
    Box::new(EscrowCancellable)
}

async fn load_check(ctx: &ValidationContext) -> Result<Option<crate::CheckInfo>, String> {
    let Some(check_id) = ctx.get(Field::CheckId).filter(|id| codec::is_hash256(id)) else {
        return Ok(None);
    };
    match ctx.client.check(check_id).await {
        Ok(Some(check)) => Ok(Some(check)),
        Ok(None) => Err(format!("Check {} not found", check_id)),
        Err(e) => Err(format!("Unable to load check: {}", e)),
    }
}

struct CheckCashable;

#[async_trait]
impl Validator for CheckCashable {
    async fn check(&self, ctx: &ValidationContext) -> Option<String> {
        let check = match load_check(ctx).await {
            Ok(check) => check?,
            Err(message) => return Some(message),
        };
        if ctx.account() != Some(check.destination.as_str()) {
            return Some("Only the check destination can cash it".to_string());
        }
        check
            .expiration
            .is_some_and(ripple_time_passed)
            .then(|| "Check has expired".to_string())
    }
}

pub fn check_cashable() -> BoxedValidator {
    Box::new(CheckCashable)
}

struct CheckCancellable;

#[async_trait]
impl Validator for CheckCancellable {
    async fn check(&self, ctx: &ValidationContext) -> Option<String> {
        let check = match load_check(ctx).await {
            Ok(check) => check?,
            Err(message) => return Some(message),
        };
        if check.expiration.is_some_and(ripple_time_passed) {
            return None;
        }
        let account = ctx.account()?;
        (account != check.account && account != check.destination).then(|| {
            "Only the check creator or destination can cancel an unexpired check".to_string()
        })
    }
}

pub fn check_cancellable() -> BoxedValidator {
    Box::new(CheckCancellable)
}

// ---------------------------------------------------------------------------
// AMM, DID and credential validators
// ---------------------------------------------------------------------------

pub fn bid_range() -> BoxedValidator {
    from_fn(|ctx| {
        let min = ctx.get(Field::BidMin).and_then(|v| v.parse::<f64>().ok());
        let max = ctx.get(Field::BidMax).and_then(|v| v.parse::<f64>().ok());
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Some("Bid min cannot exceed Bid max".to_string());
            }
        }

        let accounts = &ctx.inputs.auth_accounts;
        if accounts.len() > MAX_AUTH_ACCOUNTS {
            return Some(format!(
                "At most {} auth accounts are allowed",
                MAX_AUTH_ACCOUNTS
            ));
        }
        for account in accounts {
            let account = account.trim();
            if !codec::is_valid_classic_address(account) {
                return Some(format!("Invalid auth account: {}", account));
            }
            if Some(account) == ctx.account() {
                return Some("Auth accounts cannot include the source account".to_string());
            }
        }
        None
    })
}

/// Each accepted credential is written as `issuer:credentialTypeHex`
pub fn accepted_credentials() -> BoxedValidator {
    from_fn(|ctx| {
        let credentials = &ctx.inputs.accepted_credentials;
        if credentials.is_empty() || credentials.len() > MAX_ACCEPTED_CREDENTIALS {
            return Some(format!(
                "Between 1 and {} accepted credentials are required",
                MAX_ACCEPTED_CREDENTIALS
            ));
        }

        let mut seen = HashSet::new();
        for credential in credentials {
            let credential = credential.trim();
            let Some((issuer, kind)) = credential.split_once(':') else {
                return Some(format!(
                    "Accepted credential {} must be written as issuer:type",
                    credential
                ));
            };
            if !codec::is_valid_classic_address(issuer) {
                return Some(format!("Invalid credential issuer: {}", issuer));
            }
            if !codec::hex_len(kind).is_some_and(|n| (1..=MAX_CREDENTIAL_TYPE_BYTES).contains(&n)) {
                return Some(format!(
                    "Credential type {} must be 1 to {} hex encoded bytes",
                    kind, MAX_CREDENTIAL_TYPE_BYTES
                ));
            }
            if !seen.insert((issuer, kind.to_ascii_uppercase())) {
                return Some(format!("Duplicate accepted credential: {}", credential));
            }
        }
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LedgerSnapshot, TxInputs, ledger::MemoryLedger};
    use std::sync::Arc;

    fn context(inputs: TxInputs) -> ValidationContext {
        ValidationContext {
            inputs,
            account_info: None,
            ledger: LedgerSnapshot::default(),
            client: Arc::new(MemoryLedger::new()),
        }
    }

    #[tokio::test]
    async fn field_validators_skip_absent_fields() {
        let ctx = context(TxInputs::default());
        for validator in [
            is_valid_address(Field::Destination),
            numeric(Field::Amount, Some(0.0), None),
            integer(Field::DestinationTag, 0, u32::MAX as u64),
            hex(Field::Uri, 256),
            hash256(Field::InvoiceId),
            time(Field::FinishAfter),
        ] {
            assert_eq!(validator.check(&ctx).await, None);
        }
    }

    #[tokio::test]
    async fn numeric_reports_range_violations() {
        let ctx = context(TxInputs {
            trading_fee: Some("1001".into()),
            amount: Some("abc".into()),
            ..Default::default()
        });
        assert_eq!(
            integer(Field::TradingFee, 0, 1000).check(&ctx).await.as_deref(),
            Some("Trading fee must be between 0 and 1000")
        );
        assert_eq!(
            numeric(Field::Amount, Some(0.0), None).check(&ctx).await.as_deref(),
            Some("Amount must be a number")
        );
    }

    #[tokio::test]
    async fn xrp_amounts_limit_decimals() {
        let ctx = context(TxInputs {
            amount: Some("1.1234567".into()),
            ..Default::default()
        });
        assert!(amount(Field::Amount, Field::Currency).check(&ctx).await.is_some());

        let ctx = context(TxInputs {
            amount: Some("1.1234567".into()),
            currency: Some("USD".into()),
            ..Default::default()
        });
        assert_eq!(amount(Field::Amount, Field::Currency).check(&ctx).await, None);
    }

    #[tokio::test]
    async fn exactly_one_of_both_directions() {
        let validator = exactly_one_of(Field::Authorize, Field::Unauthorize);
        let neither = context(TxInputs::default());
        assert_eq!(
            validator.check(&neither).await.as_deref(),
            Some("Either Authorize or Unauthorize is required")
        );

        let both = context(TxInputs {
            authorize: Some("rf1BiGeXwwQoi8Z2ueFYTEXSwuJYfV2Jpn".into()),
            unauthorize: Some("rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe".into()),
            ..Default::default()
        });
        assert!(validator.check(&both).await.unwrap().contains("not both"));
    }

    #[tokio::test]
    async fn issued_assets_need_issuers() {
        let ctx = context(TxInputs {
            currency: Some("USD".into()),
            ..Default::default()
        });
        assert_eq!(
            issued_asset(Field::Currency, Field::Issuer).check(&ctx).await.as_deref(),
            Some("Issuer is required for non-XRP currency")
        );
    }

    #[tokio::test]
    async fn delegate_permissions_reject_protected_types() {
        let ctx = context(TxInputs {
            permissions: vec!["Payment".into(), "SetRegularKey".into()],
            ..Default::default()
        });
        assert_eq!(
            delegate_permissions().check(&ctx).await.as_deref(),
            Some("Permission SetRegularKey cannot be delegated")
        );

        let ctx = context(TxInputs {
            permissions: vec!["TrustlineFreeze".into(), "TrustlineFreeze".into()],
            ..Default::default()
        });
        assert_eq!(
            delegate_permissions().check(&ctx).await.as_deref(),
            Some("Duplicate permission: TrustlineFreeze")
        );
    }

    #[tokio::test]
    async fn escrow_cancel_must_follow_finish() {
        let ctx = context(TxInputs {
            finish_after: Some("2000000000".into()),
            cancel_after: Some("1999999999".into()),
            ..Default::default()
        });
        assert_eq!(
            escrow_create_times().check(&ctx).await.as_deref(),
            Some("Cancel after must be later than Finish after")
        );
    }

    #[tokio::test]
    async fn accepted_credentials_format() {
        let ctx = context(TxInputs {
            accepted_credentials: vec!["rf1BiGeXwwQoi8Z2ueFYTEXSwuJYfV2Jpn:4B5943".into()],
            ..Default::default()
        });
        assert_eq!(accepted_credentials().check(&ctx).await, None);

        let ctx = context(TxInputs {
            accepted_credentials: vec!["rf1BiGeXwwQoi8Z2ueFYTEXSwuJYfV2Jpn".into()],
            ..Default::default()
        });
        assert!(accepted_credentials().check(&ctx).await.unwrap().contains("issuer:type"));
    }
}
