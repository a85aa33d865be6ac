//! Format checks for XRPL-encoded values
//!
//! Addresses and seeds use base58 with the XRPL alphabet and a 4-byte
//! double SHA-256 checksum.

use bs58::Alphabet;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

const ACCOUNT_ID_VERSION: u8 = 0x00;
const FAMILY_SEED_VERSION: u8 = 0x21;
const ED25519_SEED_PREFIX: [u8; 3] = [0x01, 0xE1, 0x4B];
const SEED_ENTROPY_LEN: usize = 16;

/// 100 billion XRP, the total supply
const MAX_XRP_DROPS: u64 = 100_000_000_000 * DROPS_PER_XRP;
const DROPS_PER_XRP: u64 = 1_000_000;

/// Decodes base58check data and returns the payload without the checksum
fn decode_checked(encoded: &str) -> Option<Vec<u8>> {
    let data = bs58::decode(encoded)
        .with_alphabet(Alphabet::RIPPLE)
        .into_vec()
        .ok()?;
    if data.len() < 5 {
        return None;
    }

    let (payload, checksum) = data.split_at(data.len() - 4);
    let expected = Sha256::digest(Sha256::digest(payload));
    if expected[..4] != *checksum {
        return None;
    }
    Some(payload.to_vec())
}

pub fn is_valid_classic_address(address: &str) -> bool {
    if !address.starts_with('r') {
        return false;
    }
    match decode_checked(address) {
        Some(payload) => payload.len() == 21 && payload[0] == ACCOUNT_ID_VERSION,
        None => false,
    }
}

/// Accepts secp256k1 family seeds (`s...`) and ed25519 seeds (`sEd...`)
pub fn is_valid_seed(seed: &str) -> bool {
    if !seed.starts_with('s') {
        return false;
    }
    let Some(payload) = decode_checked(seed) else {
        return false;
    };

    match payload.len() {
        n if n == 1 + SEED_ENTROPY_LEN => payload[0] == FAMILY_SEED_VERSION,
        n if n == ED25519_SEED_PREFIX.len() + SEED_ENTROPY_LEN => {
            payload[..3] == ED25519_SEED_PREFIX
        }
        _ => false,
    }
}

/// Decodes hex and returns the byte length
pub fn hex_len(value: &str) -> Option<usize> {
    hex::decode(value).ok().map(|bytes| bytes.len())
}

pub fn is_hash256(value: &str) -> bool {
    value.len() == 64 && hex_len(value) == Some(32)
}

/// Standard three-character code or a 160-bit hex code
pub fn is_valid_currency_code(code: &str) -> bool {
    if code.len() == 3 {
        return !code.eq_ignore_ascii_case("XRP")
            && code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "?!@#$%^&*<>(){}[]|".contains(c));
    }
    code.len() == 40 && hex_len(code) == Some(20) && code.chars().any(|c| c != '0')
}

pub fn is_xrp(currency: Option<&str>) -> bool {
    currency.is_none_or(|c| c.eq_ignore_ascii_case("XRP"))
}

/// Converts a decimal XRP string into drops.
///
/// At most six fractional digits are allowed; the result must not exceed the
/// total XRP supply.
pub fn xrp_to_drops(value: &str) -> Option<u64> {
    let (whole, fraction) = match value.split_once('.') {
        Some((w, f)) => (w, f),
        None => (value, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if fraction.len() > 6
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let whole: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let fraction: u64 = if fraction.is_empty() {
        0
    } else {
        format!("{:0<6}", fraction).parse().ok()?
    };

    let drops = whole.checked_mul(DROPS_PER_XRP)?.checked_add(fraction)?;
    (drops <= MAX_XRP_DROPS).then_some(drops)
}

/// Formats drops as a decimal XRP string without trailing zeros
pub fn drops_to_xrp(drops: u64) -> String {
    let whole = drops / DROPS_PER_XRP;
    let fraction = drops % DROPS_PER_XRP;
    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:06}", fraction);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

/// Parses unix seconds or an RFC 3339 timestamp.
///
/// Only times the ledger can store (whole seconds since the Ripple epoch
/// that fit in a `u32`) are accepted.
pub fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    let time = match value.parse::<i64>() {
        Ok(secs) => DateTime::from_timestamp(secs, 0)?,
        Err(_) => DateTime::parse_from_rfc3339(value).ok()?.with_timezone(&Utc),
    };
    to_ripple_time(time).map(|_| time)
}

pub fn from_ripple_time(secs: u32) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs as i64 + crate::RIPPLE_EPOCH_OFFSET, 0)
}

/// Seconds since the Ripple epoch, `None` before 2000-01-01 or past the `u32` range
pub fn to_ripple_time(time: DateTime<Utc>) -> Option<u32> {
    u32::try_from(time.timestamp() - crate::RIPPLE_EPOCH_OFFSET).ok()
}
