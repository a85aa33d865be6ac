use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account root flag: incoming payments must carry a destination tag.
pub const LSF_REQUIRE_DEST_TAG: u32 = 0x0002_0000;
/// Account root flag: the master key pair cannot sign.
pub const LSF_DISABLE_MASTER: u32 = 0x0010_0000;
/// Account root flag: the issuer may claw back trust line balances.
pub const LSF_ALLOW_TRUSTLINE_CLAWBACK: u32 = 0x8000_0000;

/// Seconds between the unix epoch and the ripple epoch (2000-01-01T00:00:00Z).
pub const RIPPLE_EPOCH_OFFSET: i64 = 946_684_800;

macro_rules! transaction_types {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Transaction types the rule table knows about.
        ///
        /// Names follow the XRPL canonical `TransactionType` strings.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum TransactionType {
            $(#[serde(rename = $name)] $variant,)+
        }

        impl TransactionType {
            pub const ALL: &'static [TransactionType] = &[$(TransactionType::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(TransactionType::$variant => $name,)+
                }
            }
        }

        impl FromStr for TransactionType {
            type Err = UnknownTransactionType;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(TransactionType::$variant),)+
                    other => Err(UnknownTransactionType(other.to_string())),
                }
            }
        }
    };
}

transaction_types! {
    Payment => "Payment",
    AccountSet => "AccountSet",
    AccountDelete => "AccountDelete",
    SetRegularKey => "SetRegularKey",
    SignerListSet => "SignerListSet",
    TrustSet => "TrustSet",
    OfferCreate => "OfferCreate",
    OfferCancel => "OfferCancel",
    CheckCreate => "CheckCreate",
    CheckCash => "CheckCash",
    CheckCancel => "CheckCancel",
    EscrowCreate => "EscrowCreate",
    EscrowFinish => "EscrowFinish",
    EscrowCancel => "EscrowCancel",
    TicketCreate => "TicketCreate",
    DepositPreauth => "DepositPreauth",
    PaymentChannelCreate => "PaymentChannelCreate",
    PaymentChannelFund => "PaymentChannelFund",
    PaymentChannelClaim => "PaymentChannelClaim",
    DelegateSet => "DelegateSet",
    AmmCreate => "AMMCreate",
    AmmDeposit => "AMMDeposit",
    AmmWithdraw => "AMMWithdraw",
    AmmVote => "AMMVote",
    AmmBid => "AMMBid",
    AmmDelete => "AMMDelete",
    Clawback => "Clawback",
    NfTokenMint => "NFTokenMint",
    NfTokenBurn => "NFTokenBurn",
    NfTokenCreateOffer => "NFTokenCreateOffer",
    NfTokenCancelOffer => "NFTokenCancelOffer",
    NfTokenAcceptOffer => "NFTokenAcceptOffer",
    MpTokenIssuanceCreate => "MPTokenIssuanceCreate",
    MpTokenIssuanceDestroy => "MPTokenIssuanceDestroy",
    MpTokenAuthorize => "MPTokenAuthorize",
    CredentialCreate => "CredentialCreate",
    CredentialAccept => "CredentialAccept",
    CredentialDelete => "CredentialDelete",
    DidSet => "DIDSet",
    DidDelete => "DIDDelete",
    PermissionedDomainSet => "PermissionedDomainSet",
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported transaction type: {0}")]
pub struct UnknownTransactionType(pub String);

/// Signer supplied for a `SignerListSet` transaction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerEntryInput {
    pub account: String,
    pub weight: String,
}

/// Form inputs collected for a transaction under construction.
///
/// Every scalar arrives as text exactly as the user typed it; the validators
/// are responsible for parsing. Text that is empty after trimming is treated
/// as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TxInputs {
    // Signing
    pub account: Option<String>,
    pub seed: Option<String>,
    pub fee: Option<String>,
    pub memo: Option<String>,
    pub ticket_sequence: Option<String>,
    pub use_multi_sign: bool,
    pub multi_sign_addresses: Vec<String>,
    pub multi_sign_seeds: Vec<String>,
    pub is_regular_key_address: bool,
    pub regular_key_address: Option<String>,
    pub regular_key_seed: Option<String>,

    // Payments and amounts
    pub destination: Option<String>,
    pub destination_tag: Option<String>,
    pub source_tag: Option<String>,
    pub invoice_id: Option<String>,
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub issuer: Option<String>,
    pub amount2: Option<String>,
    pub currency2: Option<String>,
    pub issuer2: Option<String>,
    pub send_max: Option<String>,
    pub deliver_min: Option<String>,
    pub expiration: Option<String>,

    // Account settings
    pub domain: Option<String>,
    pub transfer_rate: Option<String>,
    pub tick_size: Option<String>,
    pub set_flag: Option<String>,
    pub clear_flag: Option<String>,
    pub regular_key: Option<String>,
    pub signer_quorum: Option<String>,
    pub signer_entries: Vec<SignerEntryInput>,
    pub authorize: Option<String>,
    pub unauthorize: Option<String>,
    pub permissions: Vec<String>,

    // Offers, checks, escrows, tickets
    pub offer_sequence: Option<String>,
    pub check_id: Option<String>,
    pub owner: Option<String>,
    pub escrow_sequence: Option<String>,
    pub finish_after: Option<String>,
    pub cancel_after: Option<String>,
    pub condition: Option<String>,
    pub fulfillment: Option<String>,
    pub ticket_count: Option<String>,

    // Payment channels
    pub channel_id: Option<String>,
    pub public_key: Option<String>,
    pub settle_delay: Option<String>,
    pub balance: Option<String>,
    pub signature: Option<String>,

    // AMM
    pub trading_fee: Option<String>,
    pub lp_token_amount: Option<String>,
    pub bid_min: Option<String>,
    pub bid_max: Option<String>,
    pub auth_accounts: Vec<String>,

    // Tokens
    pub holder: Option<String>,
    pub nftoken_id: Option<String>,
    pub nftoken_taxon: Option<String>,
    pub nftoken_offer_id: Option<String>,
    pub nftoken_sell_offer: bool,
    pub transfer_fee: Option<String>,
    pub uri: Option<String>,
    pub mpt_issuance_id: Option<String>,
    pub maximum_amount: Option<String>,
    pub asset_scale: Option<String>,

    // Credentials, DIDs, domains
    pub subject: Option<String>,
    pub credential_type: Option<String>,
    pub did_document: Option<String>,
    pub data: Option<String>,
    pub domain_id: Option<String>,
    pub accepted_credentials: Vec<String>,
}

impl TxInputs {
    /// Trimmed value of a text field, `None` when missing or blank.
    pub fn get(&self, field: Field) -> Option<&str> {
        field
            .slot(self)
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn has(&self, field: Field) -> bool {
        self.get(field).is_some()
    }
}

/// A named text field of [`TxInputs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Account,
    Seed,
    Fee,
    Memo,
    TicketSequence,
    RegularKeyAddress,
    RegularKeySeed,
    Destination,
    DestinationTag,
    SourceTag,
    InvoiceId,
    Amount,
    Currency,
    Issuer,
    Amount2,
    Currency2,
    Issuer2,
    SendMax,
    DeliverMin,
    Expiration,
    Domain,
    TransferRate,
    TickSize,
    SetFlag,
    ClearFlag,
    RegularKey,
    SignerQuorum,
    Authorize,
    Unauthorize,
    OfferSequence,
    CheckId,
    Owner,
    EscrowSequence,
    FinishAfter,
    CancelAfter,
    Condition,
    Fulfillment,
    TicketCount,
    ChannelId,
    PublicKey,
    SettleDelay,
    Balance,
    Signature,
    TradingFee,
    LpTokenAmount,
    BidMin,
    BidMax,
    Holder,
    NftokenId,
    NftokenTaxon,
    NftokenOfferId,
    TransferFee,
    Uri,
    MptIssuanceId,
    MaximumAmount,
    AssetScale,
    Subject,
    CredentialType,
    DidDocument,
    Data,
    DomainId,
}

impl Field {
    fn slot(self, inputs: &TxInputs) -> &Option<String> {
        match self {
            Field::Account => &inputs.account,
            Field::Seed => &inputs.seed,
            Field::Fee => &inputs.fee,
            Field::Memo => &inputs.memo,
            Field::TicketSequence => &inputs.ticket_sequence,
            Field::RegularKeyAddress => &inputs.regular_key_address,
            Field::RegularKeySeed => &inputs.regular_key_seed,
            Field::Destination => &inputs.destination,
            Field::DestinationTag => &inputs.destination_tag,
            Field::SourceTag => &inputs.source_tag,
            Field::InvoiceId => &inputs.invoice_id,
            Field::Amount => &inputs.amount,
            Field::Currency => &inputs.currency,
            Field::Issuer => &inputs.issuer,
            Field::Amount2 => &inputs.amount2,
            Field::Currency2 => &inputs.currency2,
            Field::Issuer2 => &inputs.issuer2,
            Field::SendMax => &inputs.send_max,
            Field::DeliverMin => &inputs.deliver_min,
            Field::Expiration => &inputs.expiration,
            Field::Domain => &inputs.domain,
            Field::TransferRate => &inputs.transfer_rate,
            Field::TickSize => &inputs.tick_size,
            Field::SetFlag => &inputs.set_flag,
            Field::ClearFlag => &inputs.clear_flag,
            Field::RegularKey => &inputs.regular_key,
            Field::SignerQuorum => &inputs.signer_quorum,
            Field::Authorize => &inputs.authorize,
            Field::Unauthorize => &inputs.unauthorize,
            Field::OfferSequence => &inputs.offer_sequence,
            Field::CheckId => &inputs.check_id,
            Field::Owner => &inputs.owner,
            Field::EscrowSequence => &inputs.escrow_sequence,
            Field::FinishAfter => &inputs.finish_after,
            Field::CancelAfter => &inputs.cancel_after,
            Field::Condition => &inputs.condition,
            Field::Fulfillment => &inputs.fulfillment,
            Field::TicketCount => &inputs.ticket_count,
            Field::ChannelId => &inputs.channel_id,
            Field::PublicKey => &inputs.public_key,
            Field::SettleDelay => &inputs.settle_delay,
            Field::Balance => &inputs.balance,
            Field::Signature => &inputs.signature,
            Field::TradingFee => &inputs.trading_fee,
            Field::LpTokenAmount => &inputs.lp_token_amount,
            Field::BidMin => &inputs.bid_min,
            Field::BidMax => &inputs.bid_max,
            Field::Holder => &inputs.holder,
            Field::NftokenId => &inputs.nftoken_id,
            Field::NftokenTaxon => &inputs.nftoken_taxon,
            Field::NftokenOfferId => &inputs.nftoken_offer_id,
            Field::TransferFee => &inputs.transfer_fee,
            Field::Uri => &inputs.uri,
            Field::MptIssuanceId => &inputs.mpt_issuance_id,
            Field::MaximumAmount => &inputs.maximum_amount,
            Field::AssetScale => &inputs.asset_scale,
            Field::Subject => &inputs.subject,
            Field::CredentialType => &inputs.credential_type,
            Field::DidDocument => &inputs.did_document,
            Field::Data => &inputs.data,
            Field::DomainId => &inputs.domain_id,
        }
    }

    /// Human readable name used in error messages
    pub fn label(self) -> &'static str {
        match self {
            Field::Account => "Account",
            Field::Seed => "Seed",
            Field::Fee => "Fee",
            Field::Memo => "Memo",
            Field::TicketSequence => "Ticket sequence",
            Field::RegularKeyAddress => "Regular key address",
            Field::RegularKeySeed => "Regular key seed",
            Field::Destination => "Destination",
            Field::DestinationTag => "Destination tag",
            Field::SourceTag => "Source tag",
            Field::InvoiceId => "Invoice ID",
            Field::Amount => "Amount",
            Field::Currency => "Currency",
            Field::Issuer => "Issuer",
            Field::Amount2 => "Second amount",
            Field::Currency2 => "Second currency",
            Field::Issuer2 => "Second issuer",
            Field::SendMax => "Send max",
            Field::DeliverMin => "Deliver min",
            Field::Expiration => "Expiration",
            Field::Domain => "Domain",
            Field::TransferRate => "Transfer rate",
            Field::TickSize => "Tick size",
            Field::SetFlag => "Set flag",
            Field::ClearFlag => "Clear flag",
            Field::RegularKey => "Regular key",
            Field::SignerQuorum => "Signer quorum",
            Field::Authorize => "Authorize",
            Field::Unauthorize => "Unauthorize",
            Field::OfferSequence => "Offer sequence",
            Field::CheckId => "Check ID",
            Field::Owner => "Owner",
            Field::EscrowSequence => "Escrow sequence",
            Field::FinishAfter => "Finish after",
            Field::CancelAfter => "Cancel after",
            Field::Condition => "Condition",
            Field::Fulfillment => "Fulfillment",
            Field::TicketCount => "Ticket count",
            Field::ChannelId => "Channel ID",
            Field::PublicKey => "Public key",
            Field::SettleDelay => "Settle delay",
            Field::Balance => "Balance",
            Field::Signature => "Signature",
            Field::TradingFee => "Trading fee",
            Field::LpTokenAmount => "LP token amount",
            Field::BidMin => "Bid min",
            Field::BidMax => "Bid max",
            Field::Holder => "Holder",
            Field::NftokenId => "NFToken ID",
            Field::NftokenTaxon => "NFToken taxon",
            Field::NftokenOfferId => "NFToken offer ID",
            Field::TransferFee => "Transfer fee",
            Field::Uri => "URI",
            Field::MptIssuanceId => "MPT issuance ID",
            Field::MaximumAmount => "Maximum amount",
            Field::AssetScale => "Asset scale",
            Field::Subject => "Subject",
            Field::CredentialType => "Credential type",
            Field::DidDocument => "DID document",
            Field::Data => "Data",
            Field::DomainId => "Domain ID",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Signer list attached to an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignerList {
    pub quorum: u32,
    pub entries: Vec<SignerEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignerEntry {
    pub account: String,
    pub weight: u16,
}

/// Account root as seen on the validated ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub address: String,
    pub balance_drops: u64,
    pub sequence: u32,
    pub owner_count: u32,
    pub flags: u32,
    pub regular_key: Option<String>,
    pub signer_list: Option<SignerList>,
}

impl AccountInfo {
    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }
}

/// Ledger-wide parameters needed for fee and reserve checks (all in drops)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub ledger_index: u32,
    pub base_fee_drops: u64,
    pub base_reserve_drops: u64,
    pub owner_reserve_drops: u64,
}

impl Default for LedgerSnapshot {
    fn default() -> Self {
        Self {
            ledger_index: 0,
            base_fee_drops: 10,
            base_reserve_drops: 1_000_000,
            owner_reserve_drops: 200_000,
        }
    }
}

/// Escrow object; times are in seconds since the ripple epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscrowInfo {
    pub owner: String,
    pub destination: String,
    pub finish_after: Option<u32>,
    pub cancel_after: Option<u32>,
    pub condition: Option<String>,
}

/// Check object; expiration is in seconds since the ripple epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInfo {
    pub account: String,
    pub destination: String,
    pub expiration: Option<u32>,
}

/// Outcome of validating one transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub transaction_type: TransactionType,
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn new(transaction_type: TransactionType, errors: Vec<String>) -> Self {
        Self {
            transaction_type,
            valid: errors.is_empty(),
            errors,
        }
    }
}
