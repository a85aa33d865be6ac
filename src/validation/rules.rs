//! Rule Table
//!
//! Maps every supported transaction type to the fields it requires and the
//! validators it runs. The table is built once at startup; every rule starts
//! with the shared signing checks.

use super::validators::*;
use super::codec;
use crate::{Field, TransactionType};
use std::collections::HashMap;

const U32_MAX: u64 = u32::MAX as u64;
const MAX_TRADING_FEE: u64 = 1000;
const MAX_TRANSFER_FEE: u64 = 50_000;
const MAX_URI_BYTES: usize = 256;
const MAX_CONDITION_BYTES: usize = 256;
const MAX_MPT_METADATA_BYTES: usize = 1024;
const PUBLIC_KEY_BYTES: usize = 33;
const MPT_ISSUANCE_ID_BYTES: usize = 24;

/// Required fields and validators for one transaction type
pub struct TxRule {
    pub required_fields: Vec<Field>,
    pub validators: Vec<BoxedValidator>,
}

/// Transaction type to rule mapping
pub struct RuleTable {
    rules: HashMap<TransactionType, TxRule>,
}

/// Checks shared by every transaction: who signs and with what
fn signing() -> Vec<BoxedValidator> {
    vec![
        is_valid_address(Field::Account),
        account_exists(),
        signing_secret(),
        fee_at_least_base(),
        memo_length(),
        exclusive_signing_modes(),
        multi_sign(),
        regular_key_signing(),
        master_key_disabled_requires_alt_signing(),
        ticket_validation(),
    ]
}

fn rule(required: &[Field], validators: Vec<BoxedValidator>) -> TxRule {
    let mut required_fields = vec![Field::Account];
    required_fields.extend_from_slice(required);

    let mut all = signing();
    all.extend(validators);

    TxRule {
        required_fields,
        validators: all,
    }
}

/// Both sides of an AMM pool
fn amm_assets() -> Vec<BoxedValidator> {
    vec![
        currency_code(Field::Currency),
        currency_code(Field::Currency2),
        issued_asset(Field::Currency, Field::Issuer),
        issued_asset(Field::Currency2, Field::Issuer2),
        is_valid_address(Field::Issuer),
        is_valid_address(Field::Issuer2),
        distinct_assets(),
    ]
}

fn with(mut base: Vec<BoxedValidator>, extra: Vec<BoxedValidator>) -> Vec<BoxedValidator> {
    base.extend(extra);
    base
}

fn xrp_payment_not_self() -> BoxedValidator {
    from_fn(|ctx| {
        let destination = ctx.get(Field::Destination)?;
        (codec::is_xrp(ctx.get(Field::Currency)) && Some(destination) == ctx.account())
            .then(|| "Cannot send XRP to the source account".to_string())
    })
}

fn token_only(message: &'static str) -> BoxedValidator {
    from_fn(move |ctx| {
        (ctx.has(Field::Currency) && codec::is_xrp(ctx.get(Field::Currency)))
            .then(|| message.to_string())
    })
}

fn nft_offer_owner() -> BoxedValidator {
    from_fn(|ctx| match (ctx.inputs.nftoken_sell_offer, ctx.has(Field::Owner)) {
        (false, false) => Some("Owner is required for buy offers".to_string()),
        (true, true) => Some("Owner must be empty for sell offers".to_string()),
        _ => None,
    })
}

fn channel_claim_signature() -> BoxedValidator {
    from_fn(|ctx| {
        (ctx.has(Field::Signature) && !(ctx.has(Field::PublicKey) && ctx.has(Field::Balance)))
            .then(|| "Signature requires Public key and Balance".to_string())
    })
}

impl RuleTable {
    /// Builds the rules for every [`TransactionType`]
    pub fn standard() -> Self {
        use Field::*;
        use TransactionType as T;

        let mut rules = HashMap::new();

        rules.insert(
            T::Payment,
            rule(
                &[Destination, Amount],
                vec![
                    is_valid_address(Destination),
                    xrp_payment_not_self(),
                    amount(Amount, Currency),
                    currency_code(Currency),
                    issued_asset(Currency, Issuer),
                    is_valid_address(Issuer),
                    positive(SendMax),
                    positive(DeliverMin),
                    integer(DestinationTag, 0, U32_MAX),
                    integer(SourceTag, 0, U32_MAX),
                    hash256(InvoiceId),
                    require_destination_tag_if_needed(),
                    funds_new_destination(),
                    sufficient_xrp_balance(Amount),
                ],
            ),
        );

        rules.insert(
            T::AccountSet,
            rule(
                &[],
                vec![
                    integer(SetFlag, 1, 16),
                    integer(ClearFlag, 1, 16),
                    account_set_flags(),
                    disable_master_allowed(),
                ],
            ),
        );

        rules.insert(
            T::AccountDelete,
            rule(
                &[Destination],
                vec![
                    is_valid_address(Destination),
                    not_self(Destination),
                    integer(DestinationTag, 0, U32_MAX),
                    account_on_ledger(Destination),
                    require_destination_tag_if_needed(),
                    account_deletable(),
                ],
            ),
        );

        rules.insert(
            T::SetRegularKey,
            rule(
                &[],
                vec![
                    is_valid_address(RegularKey),
                    not_self(RegularKey),
                    regular_key_removal_allowed(),
                ],
            ),
        );

        rules.insert(
            T::SignerListSet,
            rule(
                &[SignerQuorum],
                vec![integer(SignerQuorum, 0, U32_MAX), signer_entries()],
            ),
        );

        rules.insert(
            T::TrustSet,
            rule(
                &[Currency, Issuer, Amount],
                vec![
                    currency_code(Currency),
                    token_only("Trust lines cannot be created for XRP"),
                    is_valid_address(Issuer),
                    not_self(Issuer),
                    numeric(Amount, Some(0.0), None),
                ],
            ),
        );

        rules.insert(
            T::OfferCreate,
            rule(
                &[Amount, Amount2],
                vec![
                    currency_code(Currency),
                    currency_code(Currency2),
                    issued_asset(Currency, Issuer),
                    issued_asset(Currency2, Issuer2),
                    is_valid_address(Issuer),
                    is_valid_address(Issuer2),
                    amount(Amount, Currency),
                    amount(Amount2, Currency2),
                    distinct_assets(),
                    integer(OfferSequence, 1, U32_MAX),
                    time(Expiration),
                    future_time(Expiration),
                ],
            ),
        );

        rules.insert(
            T::OfferCancel,
            rule(&[OfferSequence], vec![integer(OfferSequence, 1, U32_MAX)]),
        );

        rules.insert(
            T::CheckCreate,
            rule(
                &[Destination, SendMax],
                vec![
                    is_valid_address(Destination),
                    not_self(Destination),
                    amount(SendMax, Currency),
                    currency_code(Currency),
                    issued_asset(Currency, Issuer),
                    is_valid_address(Issuer),
                    integer(DestinationTag, 0, U32_MAX),
                    hash256(InvoiceId),
                    time(Expiration),
                    future_time(Expiration),
                    account_on_ledger(Destination),
                    require_destination_tag_if_needed(),
                ],
            ),
        );

        rules.insert(
            T::CheckCash,
            rule(
                &[CheckId],
                vec![
                    hash256(CheckId),
                    exactly_one_of(Amount, DeliverMin),
                    amount(Amount, Currency),
                    amount(DeliverMin, Currency),
                    check_cashable(),
                ],
            ),
        );

        rules.insert(
            T::CheckCancel,
            rule(&[CheckId], vec![hash256(CheckId), check_cancellable()]),
        );

        rules.insert(
            T::EscrowCreate,
            rule(
                &[Destination, Amount],
                vec![
                    is_valid_address(Destination),
                    amount(Amount, Currency),
                    integer(DestinationTag, 0, U32_MAX),
                    time(FinishAfter),
                    time(CancelAfter),
                    future_time(FinishAfter),
                    future_time(CancelAfter),
                    escrow_create_times(),
                    hex(Condition, MAX_CONDITION_BYTES),
                    account_on_ledger(Destination),
                    require_destination_tag_if_needed(),
                    sufficient_xrp_balance(Amount),
                ],
            ),
        );

        rules.insert(
            T::EscrowFinish,
            rule(
                &[Owner, EscrowSequence],
                vec![
                    is_valid_address(Owner),
                    integer(EscrowSequence, 1, U32_MAX),
                    both_or_neither(Condition, Fulfillment),
                    hex(Condition, MAX_CONDITION_BYTES),
                    hex(Fulfillment, MAX_CONDITION_BYTES),
                    escrow_finishable(),
                ],
            ),
        );

        rules.insert(
            T::EscrowCancel,
            rule(
                &[Owner, EscrowSequence],
                vec![
                    is_valid_address(Owner),
                    integer(EscrowSequence, 1, U32_MAX),
                    escrow_cancellable(),
                ],
            ),
        );

        rules.insert(
            T::TicketCreate,
            rule(&[TicketCount], vec![integer(TicketCount, 1, 250), ticket_count()]),
        );

        rules.insert(
            T::DepositPreauth,
            rule(
                &[],
                vec![
                    exactly_one_of(Authorize, Unauthorize),
                    is_valid_address(Authorize),
                    is_valid_address(Unauthorize),
                    not_self(Authorize),
                    not_self(Unauthorize),
                    account_on_ledger(Authorize),
                ],
            ),
        );

        rules.insert(
            T::PaymentChannelCreate,
            rule(
                &[Destination, Amount, SettleDelay, PublicKey],
                vec![
                    is_valid_address(Destination),
                    not_self(Destination),
                    amount(Amount, Currency),
                    integer(SettleDelay, 0, U32_MAX),
                    hex_exact(PublicKey, PUBLIC_KEY_BYTES),
                    integer(DestinationTag, 0, U32_MAX),
                    time(CancelAfter),
                    future_time(CancelAfter),
                    account_on_ledger(Destination),
                    require_destination_tag_if_needed(),
                    sufficient_xrp_balance(Amount),
                ],
            ),
        );

        rules.insert(
            T::PaymentChannelFund,
            rule(
                &[ChannelId, Amount],
                vec![
                    hash256(ChannelId),
                    amount(Amount, Currency),
                    time(Expiration),
                    future_time(Expiration),
                    sufficient_xrp_balance(Amount),
                ],
            ),
        );

        rules.insert(
            T::PaymentChannelClaim,
            rule(
                &[ChannelId],
                vec![
                    hash256(ChannelId),
                    amount(Amount, Currency),
                    amount(Balance, Currency),
                    hex(Signature, 72),
                    hex_exact(PublicKey, PUBLIC_KEY_BYTES),
                    channel_claim_signature(),
                ],
            ),
        );

        rules.insert(
            T::DelegateSet,
            rule(
                &[Authorize],
                vec![
                    is_valid_address(Authorize),
                    not_self(Authorize),
                    delegate_permissions(),
                    account_on_ledger(Authorize),
                ],
            ),
        );

        rules.insert(
            T::AmmCreate,
            rule(
                &[Amount, Amount2, TradingFee],
                with(
                    amm_assets(),
                    vec![
                        amount(Amount, Currency),
                        amount(Amount2, Currency2),
                        integer(TradingFee, 0, MAX_TRADING_FEE),
                    ],
                ),
            ),
        );

        rules.insert(
            T::AmmDeposit,
            rule(
                &[],
                with(
                    amm_assets(),
                    vec![
                        at_least_one_of(&[Amount, Amount2, LpTokenAmount]),
                        amount(Amount, Currency),
                        amount(Amount2, Currency2),
                        positive(LpTokenAmount),
                        integer(TradingFee, 0, MAX_TRADING_FEE),
                    ],
                ),
            ),
        );

        rules.insert(
            T::AmmWithdraw,
            rule(
                &[],
                with(
                    amm_assets(),
                    vec![
                        at_least_one_of(&[Amount, Amount2, LpTokenAmount]),
                        amount(Amount, Currency),
                        amount(Amount2, Currency2),
                        positive(LpTokenAmount),
                    ],
                ),
            ),
        );

        rules.insert(
            T::AmmVote,
            rule(
                &[TradingFee],
                with(amm_assets(), vec![integer(TradingFee, 0, MAX_TRADING_FEE)]),
            ),
        );

        rules.insert(
            T::AmmBid,
            rule(
                &[],
                with(
                    amm_assets(),
                    vec![positive(BidMin), positive(BidMax), bid_range()],
                ),
            ),
        );

        rules.insert(T::AmmDelete, rule(&[], amm_assets()));

        rules.insert(
            T::Clawback,
            rule(
                &[Amount, Currency, Holder],
                vec![
                    currency_code(Currency),
                    token_only("XRP cannot be clawed back"),
                    positive(Amount),
                    is_valid_address(Holder),
                    not_self(Holder),
                    clawback_enabled(),
                ],
            ),
        );

        rules.insert(
            T::NfTokenMint,
            rule(
                &[NftokenTaxon],
                vec![
                    integer(NftokenTaxon, 0, U32_MAX),
                    integer(TransferFee, 0, MAX_TRANSFER_FEE),
                    hex(Uri, MAX_URI_BYTES),
                    is_valid_address(Issuer),
                    not_self(Issuer),
                ],
            ),
        );

        rules.insert(
            T::NfTokenBurn,
            rule(&[NftokenId], vec![hash256(NftokenId), is_valid_address(Owner)]),
        );

        rules.insert(
            T::NfTokenCreateOffer,
            rule(
                &[NftokenId, Amount],
                vec![
                    hash256(NftokenId),
                    nft_offer_owner(),
                    numeric(Amount, Some(0.0), None),
                    currency_code(Currency),
                    issued_asset(Currency, Issuer),
                    is_valid_address(Issuer),
                    is_valid_address(Owner),
                    not_self(Owner),
                    is_valid_address(Destination),
                    not_self(Destination),
                    time(Expiration),
                    future_time(Expiration),
                ],
            ),
        );

        rules.insert(
            T::NfTokenCancelOffer,
            rule(&[NftokenOfferId], vec![hash256(NftokenOfferId)]),
        );

        rules.insert(
            T::NfTokenAcceptOffer,
            rule(&[NftokenOfferId], vec![hash256(NftokenOfferId)]),
        );

        rules.insert(
            T::MpTokenIssuanceCreate,
            rule(
                &[],
                vec![
                    integer(AssetScale, 0, u8::MAX as u64),
                    integer(MaximumAmount, 1, i64::MAX as u64),
                    integer(TransferFee, 0, MAX_TRANSFER_FEE),
                    hex(Data, MAX_MPT_METADATA_BYTES),
                ],
            ),
        );

        rules.insert(
            T::MpTokenIssuanceDestroy,
            rule(
                &[MptIssuanceId],
                vec![hex_exact(MptIssuanceId, MPT_ISSUANCE_ID_BYTES)],
            ),
        );

        rules.insert(
            T::MpTokenAuthorize,
            rule(
                &[MptIssuanceId],
                vec![
                    hex_exact(MptIssuanceId, MPT_ISSUANCE_ID_BYTES),
                    is_valid_address(Holder),
                    not_self(Holder),
                ],
            ),
        );

        rules.insert(
            T::CredentialCreate,
            rule(
                &[Subject, CredentialType],
                vec![
                    is_valid_address(Subject),
                    hex(CredentialType, MAX_CREDENTIAL_TYPE_BYTES),
                    hex(Uri, MAX_URI_BYTES),
                    time(Expiration),
                    future_time(Expiration),
                    account_on_ledger(Subject),
                ],
            ),
        );

        rules.insert(
            T::CredentialAccept,
            rule(
                &[Issuer, CredentialType],
                vec![
                    is_valid_address(Issuer),
                    hex(CredentialType, MAX_CREDENTIAL_TYPE_BYTES),
                ],
            ),
        );

        rules.insert(
            T::CredentialDelete,
            rule(
                &[CredentialType],
                vec![
                    at_least_one_of(&[Subject, Issuer]),
                    is_valid_address(Subject),
                    is_valid_address(Issuer),
                    hex(CredentialType, MAX_CREDENTIAL_TYPE_BYTES),
                ],
            ),
        );

        rules.insert(
            T::DidSet,
            rule(
                &[],
                vec![
                    at_least_one_of(&[Uri, DidDocument, Data]),
                    hex(Uri, MAX_URI_BYTES),
                    hex(DidDocument, MAX_URI_BYTES),
                    hex(Data, MAX_URI_BYTES),
                ],
            ),
        );

        rules.insert(T::DidDelete, rule(&[], Vec::new()));

        rules.insert(
            T::PermissionedDomainSet,
            rule(&[], vec![hash256(DomainId), accepted_credentials()]),
        );

        Self { rules }
    }

    pub fn get(&self, tx_type: TransactionType) -> Option<&TxRule> {
        self.rules.get(&tx_type)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
