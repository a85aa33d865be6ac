//! XRPL JSON-RPC client
//!
//! Issues `account_info`, `account_objects`, `server_info` and `ledger_entry`
//! requests against the validated ledger and maps the responses onto the
//! crate's ledger types.

use super::{LedgerClient, LedgerError};
use crate::{AccountInfo, CheckInfo, EscrowInfo, LedgerSnapshot, SignerEntry, SignerList};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

/// Error codes that mean "the object does not exist"
const NOT_FOUND_CODES: &[&str] = &["actNotFound", "entryNotFound", "objectNotFound"];

/// Page size requested from `account_objects`
const OBJECTS_PAGE_LIMIT: u32 = 400;

/// JSON-RPC client for a rippled or Clio server
pub struct RpcClient {
    http: reqwest::Client,
    url: String,
}

impl RpcClient {
    /// Creates a client for the server at `url` (e.g. "https://s.altnet.rippletest.net:51234")
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Sends one request and returns its `result` object.
    ///
    /// Returns `Ok(None)` when the server reports a not-found error.
    async fn call(&self, method: &str, params: Value) -> Result<Option<Value>, LedgerError> {
        debug!("XRPL request {} {}", method, params);

        let body = json!({ "method": method, "params": [params] });
        let response: Value = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        extract_result(response)
    }
}

/// Pulls `result` out of a JSON-RPC response body
fn extract_result(mut response: Value) -> Result<Option<Value>, LedgerError> {
    let result = response
        .get_mut("result")
        .map(Value::take)
        .ok_or_else(|| LedgerError::Malformed("missing result".to_string()))?;

    if result.get("status").and_then(Value::as_str) == Some("error") {
        let code = result
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        if NOT_FOUND_CODES.contains(&code.as_str()) {
            return Ok(None);
        }
        let message = result
            .get("error_message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        warn!("XRPL error {}: {}", code, message);
        return Err(LedgerError::Rpc { code, message });
    }

    Ok(Some(result))
}

fn decode<T: for<'de> Deserialize<'de>>(value: Value, what: &str) -> Result<T, LedgerError> {
    serde_json::from_value(value).map_err(|e| LedgerError::Malformed(format!("{}: {}", what, e)))
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AccountRootJson {
    account: String,
    balance: String,
    sequence: u32,
    owner_count: u32,
    flags: u32,
    regular_key: Option<String>,
    #[serde(rename = "signer_lists", default)]
    signer_lists: Vec<SignerListJson>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SignerListJson {
    signer_quorum: u32,
    signer_entries: Vec<SignerEntryWrapper>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SignerEntryWrapper {
    signer_entry: SignerEntryJson,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SignerEntryJson {
    account: String,
    signer_weight: u16,
}

impl From<SignerListJson> for SignerList {
    fn from(list: SignerListJson) -> Self {
        SignerList {
            quorum: list.signer_quorum,
            entries: list
                .signer_entries
                .into_iter()
                .map(|w| SignerEntry {
                    account: w.signer_entry.account,
                    weight: w.signer_entry.signer_weight,
                })
                .collect(),
        }
    }
}

/// Parses an `account_info` result.
///
/// API v1 nests `signer_lists` inside `account_data`, API v2 places it next
/// to it; both are accepted.
fn parse_account_info(mut result: Value) -> Result<AccountInfo, LedgerError> {
    let top_level_lists = result.get_mut("signer_lists").map(Value::take);
    let data = result
        .get_mut("account_data")
        .map(Value::take)
        .ok_or_else(|| LedgerError::Malformed("missing account_data".to_string()))?;
    let root: AccountRootJson = decode(data, "account_data")?;

    let mut lists = root.signer_lists;
    if let Some(value) = top_level_lists {
        lists.extend(decode::<Vec<SignerListJson>>(value, "signer_lists")?);
    }

    let balance_drops = root
        .balance
        .parse()
        .map_err(|_| LedgerError::Malformed(format!("balance {:?}", root.balance)))?;

    Ok(AccountInfo {
        address: root.account,
        balance_drops,
        sequence: root.sequence,
        owner_count: root.owner_count,
        flags: root.flags,
        regular_key: root.regular_key,
        signer_list: lists.into_iter().next().map(SignerList::from),
    })
}

#[derive(Deserialize)]
struct ValidatedLedgerJson {
    seq: u32,
    base_fee_xrp: f64,
    reserve_base_xrp: f64,
    reserve_inc_xrp: f64,
}

fn xrp_f64_to_drops(xrp: f64) -> u64 {
    (xrp * 1_000_000.0).round() as u64
}

fn parse_server_info(mut result: Value) -> Result<LedgerSnapshot, LedgerError> {
    let ledger = result
        .pointer_mut("/info/validated_ledger")
        .map(Value::take)
        .ok_or_else(|| LedgerError::Malformed("server has no validated ledger".to_string()))?;
    let ledger: ValidatedLedgerJson = decode(ledger, "validated_ledger")?;

    Ok(LedgerSnapshot {
        ledger_index: ledger.seq,
        base_fee_drops: xrp_f64_to_drops(ledger.base_fee_xrp),
        base_reserve_drops: xrp_f64_to_drops(ledger.reserve_base_xrp),
        owner_reserve_drops: xrp_f64_to_drops(ledger.reserve_inc_xrp),
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EscrowJson {
    account: String,
    destination: String,
    finish_after: Option<u32>,
    cancel_after: Option<u32>,
    condition: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CheckJson {
    account: String,
    destination: String,
    expiration: Option<u32>,
}

fn take_node(mut result: Value) -> Result<Value, LedgerError> {
    result
        .get_mut("node")
        .map(Value::take)
        .ok_or_else(|| LedgerError::Malformed("missing node".to_string()))
}

#[async_trait]
impl LedgerClient for RpcClient {
    async fn account_info(&self, address: &str) -> Result<Option<AccountInfo>, LedgerError> {
        let params = json!({
            "account": address,
            "ledger_index": "validated",
            "signer_lists": true,
        });
        match self.call("account_info", params).await? {
            Some(result) => parse_account_info(result).map(Some),
            None => Ok(None),
        }
    }

    async fn account_tickets(&self, address: &str) -> Result<Vec<u32>, LedgerError> {
        let mut tickets = Vec::new();
        let mut marker: Option<Value> = None;

        loop {
            let mut params = json!({
                "account": address,
                "type": "ticket",
                "ledger_index": "validated",
                "limit": OBJECTS_PAGE_LIMIT,
            });
            if let Some(m) = marker.take() {
                params["marker"] = m;
            }

            let Some(mut result) = self.call("account_objects", params).await? else {
                return Ok(tickets);
            };

            if let Some(Value::Array(objects)) = result.get("account_objects") {
                tickets.extend(
                    objects
                        .iter()
                        .filter_map(|o| o.get("TicketSequence").and_then(Value::as_u64))
                        .filter_map(|t| u32::try_from(t).ok()),
                );
            }

            match result.get_mut("marker").map(Value::take) {
                Some(m) if !m.is_null() => marker = Some(m),
                _ => return Ok(tickets),
            }
        }
    }

    async fn ledger_snapshot(&self) -> Result<LedgerSnapshot, LedgerError> {
        let result = self
            .call("server_info", json!({}))
            .await?
            .ok_or_else(|| LedgerError::Malformed("empty server_info".to_string()))?;
        parse_server_info(result)
    }

    async fn escrow(&self, owner: &str, sequence: u32) -> Result<Option<EscrowInfo>, LedgerError> {
        let params = json!({
            "escrow": { "owner": owner, "seq": sequence },
            "ledger_index": "validated",
        });
        let Some(result) = self.call("ledger_entry", params).await? else {
            return Ok(None);
        };
        let escrow: EscrowJson = decode(take_node(result)?, "escrow")?;
        Ok(Some(EscrowInfo {
            owner: escrow.account,
            destination: escrow.destination,
            finish_after: escrow.finish_after,
            cancel_after: escrow.cancel_after,
            condition: escrow.condition,
        }))
    }

    async fn check(&self, check_id: &str) -> Result<Option<CheckInfo>, LedgerError> {
        let params = json!({ "check": check_id, "ledger_index": "validated" });
        let Some(result) = self.call("ledger_entry", params).await? else {
            return Ok(None);
        };
        let check: CheckJson = decode(take_node(result)?, "check")?;
        Ok(Some(CheckInfo {
            account: check.account,
            destination: check.destination,
            expiration: check.expiration,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_errors_become_none() {
        let response = json!({
            "result": {
                "error": "actNotFound",
                "error_message": "Account not found.",
                "status": "error"
            }
        });
        assert!(extract_result(response).unwrap().is_none());
    }

    #[test]
    fn other_errors_are_reported() {
        let response = json!({
            "result": { "error": "noNetwork", "error_message": "Not synced.", "status": "error" }
        });
        match extract_result(response) {
            Err(LedgerError::Rpc { code, message }) => {
                assert_eq!(code, "noNetwork");
                assert_eq!(message, "Not synced.");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parses_account_info_with_v2_signer_lists() {
        let result = json!({
            "account_data": {
                "Account": "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh",
                "Balance": "99999999999999940",
                "Flags": 1048576,
                "OwnerCount": 1,
                "Sequence": 7,
                "RegularKey": "rf1BiGeXwwQoi8Z2ueFYTEXSwuJYfV2Jpn"
            },
            "signer_lists": [{
                "SignerQuorum": 2,
                "SignerEntries": [
                    { "SignerEntry": { "Account": "rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe", "SignerWeight": 1 } },
                    { "SignerEntry": { "Account": "rf1BiGeXwwQoi8Z2ueFYTEXSwuJYfV2Jpn", "SignerWeight": 1 } }
                ]
            }],
            "status": "success"
        });

        let info = parse_account_info(result).unwrap();
        assert_eq!(info.balance_drops, 99_999_999_999_999_940);
        assert_eq!(info.sequence, 7);
        assert_eq!(info.regular_key.as_deref(), Some("rf1BiGeXwwQoi8Z2ueFYTEXSwuJYfV2Jpn"));
        let list = info.signer_list.unwrap();
        assert_eq!(list.quorum, 2);
        assert_eq!(list.entries.len(), 2);
        assert_eq!(list.entries[0].account, "rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe");
    }

    #[test]
    fn parses_server_info_reserves_in_drops() {
        let result = json!({
            "info": {
                "validated_ledger": {
                    "seq": 9000,
                    "base_fee_xrp": 0.00001,
                    "reserve_base_xrp": 1,
                    "reserve_inc_xrp": 0.2
                }
            }
        });

        let snapshot = parse_server_info(result).unwrap();
        assert_eq!(snapshot.ledger_index, 9000);
        assert_eq!(snapshot.base_fee_drops, 10);
        assert_eq!(snapshot.base_reserve_drops, 1_000_000);
        assert_eq!(snapshot.owner_reserve_drops, 200_000);
    }
}
