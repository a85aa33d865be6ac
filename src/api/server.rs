//! API Server Module
//!
//! This module implements a JSON-RPC server for transaction validation.
//! It provides an HTTP endpoint that accepts unsigned transaction inputs,
//! runs them through the rule table against live ledger state, and returns
//! every problem found.

use crate::{
    TransactionType, TxInputs,
    config::Config,
    faucet::FaucetProxy,
    ledger::LedgerClient,
    registry::Registry,
    validation::ValidationService,
};
use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Number of log rows returned by `recentValidations` when no limit is given
const DEFAULT_RECENT_LIMIT: u32 = 20;

const INVALID_PARAMS: i32 = -32602;
const METHOD_NOT_FOUND: i32 = -32601;
const SERVER_ERROR: i32 = -32000;

/// Shared application state that is accessible across all request handlers
///
/// - `service`: The rule engine
/// - `ledger`: Source of account and ledger state (usually a cached RPC client)
/// - `registry`: Optional validation log
/// - `faucet`: Optional faucet relay
#[derive(Clone)]
pub struct AppState {
    service: Arc<ValidationService>,
    ledger: Arc<dyn LedgerClient>,
    registry: Option<Arc<Registry>>,
    faucet: Option<Arc<FaucetProxy>>,
}

/// The main API server struct
///
/// Encapsulates the server configuration and application state.
pub struct Server {
    config: Config,
    state: AppState,
}

impl Server {
    /// Creates a new API server instance
    ///
    /// # Arguments
    /// * `config` - Server configuration (host, port, faucet URL)
    /// * `ledger` - Ledger state source used by the validators
    /// * `registry` - Validation log, if one is configured
    ///
    /// # Returns
    /// A new `Server` instance with the standard rule table
    pub fn new(config: Config, ledger: Arc<dyn LedgerClient>, registry: Option<Registry>) -> Self {
        let faucet = config
            .faucet
            .as_ref()
            .map(|faucet| Arc::new(FaucetProxy::new(faucet.url.clone())));

        let state = AppState {
            service: Arc::new(ValidationService::new()),
            ledger,
            registry: registry.map(Arc::new),
            faucet,
        };

        Self { config, state }
    }

    /// Router with the single JSON-RPC endpoint at "/"
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", post(handle_rpc))
            .with_state(self.state.clone())
    }

    /// Starts the API server and begins listening for incoming requests
    ///
    /// # Returns
    /// `Ok(())` when the server shuts down, or an error if binding fails
    pub async fn start(self) -> anyhow::Result<()> {
        let app = self.router();

        let addr = format!("{}:{}", self.config.api.host, self.config.api.port);
        info!("API server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// JSON-RPC 2.0 request structure
///
/// - `jsonrpc`: Protocol version (should be "2.0")
/// - `method`: The RPC method to call (e.g., "validateTransaction")
/// - `params`: Method parameters (may be omitted)
/// - `id`: Request identifier for matching responses
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    #[serde(default)]
    params: Value,
    #[serde(default)]
    id: Value,
}

/// JSON-RPC 2.0 response structure
///
/// Either `result` or `error` will be populated, but not both.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
    id: Value,
}

/// JSON-RPC error object
///
/// - `code`: Error code (-32601 method not found, -32602 invalid params, -32000 server error)
/// - `message`: Human-readable error description
#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

impl JsonRpcResponse {
    fn success(id: Value, result: impl Serialize) -> Json<Self> {
        match serde_json::to_value(result) {
            Ok(result) => Json(Self {
                jsonrpc: "2.0".to_string(),
                result: Some(result),
                error: None,
                id,
            }),
            Err(e) => Self::failure(id, SERVER_ERROR, format!("Failed to encode result: {}", e)),
        }
    }

    fn failure(id: Value, code: i32, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
            id,
        })
    }
}

/// Parameters of `validateTransaction`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateParams {
    transaction_type: String,
    #[serde(default)]
    inputs: TxInputs,
}

#[derive(Debug, Default, Deserialize)]
struct RecentParams {
    limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct FundParams {
    destination: Option<String>,
}

/// Main RPC request handler
///
/// Routes the request to the appropriate handler based on the method name.
async fn handle_rpc(
    State(state): State<AppState>,
    Json(request): Json<JsonRpcRequest>,
) -> Json<JsonRpcResponse> {
    info!("Received RPC request: {}", request.method);
    if request.jsonrpc != "2.0" {
        warn!("Request uses jsonrpc version {:?}", request.jsonrpc);
    }

    match request.method.as_str() {
        "validateTransaction" => handle_validate_transaction(state, request).await,
        "listTransactionTypes" => handle_list_transaction_types(state, request),
        "recentValidations" => handle_recent_validations(state, request).await,
        "fundAccount" => handle_fund_account(state, request).await,
        _ => JsonRpcResponse::failure(request.id, METHOD_NOT_FOUND, "Method not found"),
    }
}

/// Decodes method params, treating a missing params member as an empty object
fn parse_params<T: for<'de> Deserialize<'de>>(params: Value) -> Result<T, serde_json::Error> {
    let params = if params.is_null() { json!({}) } else { params };
    serde_json::from_value(params)
}

/// Handles the "validateTransaction" RPC method
///
/// This function:
/// 1. Deserializes the transaction type and inputs
/// 2. Loads account and ledger state, then runs every rule for the type
/// 3. Records the outcome in the registry, if configured
///
/// A transaction that fails validation is still a successful RPC call; the
/// report's `valid` flag and `errors` list carry the outcome.
async fn handle_validate_transaction(state: AppState, request: JsonRpcRequest) -> Json<JsonRpcResponse> {
    let params: ValidateParams = match parse_params(request.params) {
        Ok(params) => params,
        Err(e) => {
            error!("Failed to deserialize validation params: {}", e);
            return JsonRpcResponse::failure(request.id, INVALID_PARAMS, format!("Invalid params: {}", e));
        }
    };

    let tx_type: TransactionType = match params.transaction_type.parse() {
        Ok(tx_type) => tx_type,
        Err(e) => {
            warn!("{}", e);
            return JsonRpcResponse::failure(request.id, INVALID_PARAMS, e.to_string());
        }
    };

    let account = params.inputs.account.clone();
    let report = match state
        .service
        .validate_inputs(tx_type, params.inputs, state.ledger.clone())
        .await
    {
        Ok(report) => report,
        Err(e) => {
            error!("Ledger lookup failed while validating {}: {}", tx_type, e);
            return JsonRpcResponse::failure(request.id, SERVER_ERROR, format!("Ledger error: {}", e));
        }
    };

    if let Some(registry) = &state.registry {
        // The log is best effort; the caller still gets the report
        if let Err(e) = registry.record(account.as_deref(), &report).await {
            warn!("Failed to record validation: {:?}", e);
        }
    }

    JsonRpcResponse::success(request.id, report)
}

/// Handles the "listTransactionTypes" RPC method
fn handle_list_transaction_types(state: AppState, request: JsonRpcRequest) -> Json<JsonRpcResponse> {
    let names: Vec<&str> = TransactionType::ALL
        .iter()
        .filter(|tx_type| state.service.rules().get(**tx_type).is_some())
        .map(TransactionType::as_str)
        .collect();
    JsonRpcResponse::success(request.id, names)
}

/// Handles the "recentValidations" RPC method
async fn handle_recent_validations(state: AppState, request: JsonRpcRequest) -> Json<JsonRpcResponse> {
    let Some(registry) = &state.registry else {
        return JsonRpcResponse::failure(request.id, SERVER_ERROR, "Validation log is not configured");
    };

    let params: RecentParams = match parse_params(request.params) {
        Ok(params) => params,
        Err(e) => {
            return JsonRpcResponse::failure(request.id, INVALID_PARAMS, format!("Invalid params: {}", e));
        }
    };

    match registry.recent(params.limit.unwrap_or(DEFAULT_RECENT_LIMIT)).await {
        Ok(records) => JsonRpcResponse::success(request.id, records),
        Err(e) => {
            error!("Failed to read validation log: {:?}", e);
            JsonRpcResponse::failure(request.id, SERVER_ERROR, format!("Database error: {}", e))
        }
    }
}

/// Handles the "fundAccount" RPC method
///
/// Relays the request to the configured faucet and returns its response unchanged.
async fn handle_fund_account(state: AppState, request: JsonRpcRequest) -> Json<JsonRpcResponse> {
    let Some(faucet) = &state.faucet else {
        return JsonRpcResponse::failure(request.id, SERVER_ERROR, "Faucet is not configured");
    };

    let params: FundParams = match parse_params(request.params) {
        Ok(params) => params,
        Err(e) => {
            return JsonRpcResponse::failure(request.id, INVALID_PARAMS, format!("Invalid params: {}", e));
        }
    };

    match faucet.fund(params.destination.as_deref()).await {
        Ok(body) => JsonRpcResponse::success(request.id, body),
        Err(e) => {
            warn!("Faucet funding failed: {}", e);
            JsonRpcResponse::failure(request.id, SERVER_ERROR, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        AccountInfo, LedgerSnapshot,
        config::{ApiConfig, LedgerConfig},
        ledger::MemoryLedger,
    };
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    const ALICE: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";
    const BOB: &str = "rf1BiGeXwwQoi8Z2ueFYTEXSwuJYfV2Jpn";
    const SEED: &str = "snoPBrXtMeMyMHUVTgbuqAfg1SUTb";

    fn test_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            ledger: LedgerConfig {
                rpc_url: "http://127.0.0.1:9".to_string(),
                cache_ttl_secs: 0,
            },
            faucet: None,
            database: None,
        }
    }

    async fn ledger() -> Arc<MemoryLedger> {
        let ledger = Arc::new(MemoryLedger::new());
        for address in [ALICE, BOB] {
            ledger
                .put_account(AccountInfo {
                    address: address.to_string(),
                    balance_drops: 100_000_000,
                    sequence: 1,
                    owner_count: 0,
                    flags: 0,
                    regular_key: None,
                    signer_list: None,
                })
                .await;
        }
        ledger.set_snapshot(LedgerSnapshot::default()).await;
        ledger
    }

    async fn call(app: Router, body: Value) -> Value {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn rpc(method: &str, params: Value) -> Value {
        json!({ "jsonrpc": "2.0", "method": method, "params": params, "id": 1 })
    }

    #[tokio::test]
    async fn validates_a_payment() {
        let server = Server::new(test_config(), ledger().await, None);
        let response = call(
            server.router(),
            rpc(
                "validateTransaction",
                json!({
                    "transactionType": "Payment",
                    "inputs": { "account": ALICE, "seed": SEED, "destination": BOB, "amount": "10" }
                }),
            ),
        )
        .await;

        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["transactionType"], "Payment");
        assert_eq!(response["result"]["valid"], true);
        assert_eq!(response["result"]["errors"], json!([]));
    }

    #[tokio::test]
    async fn reports_validation_errors_as_a_result() {
        let server = Server::new(test_config(), ledger().await, None);
        let response = call(
            server.router(),
            rpc(
                "validateTransaction",
                json!({ "transactionType": "Payment", "inputs": { "account": ALICE, "seed": SEED } }),
            ),
        )
        .await;

        assert!(response.get("error").is_none());
        assert_eq!(response["result"]["valid"], false);
        let errors = response["result"]["errors"].as_array().unwrap();
        assert!(errors.iter().any(|e| e == "Destination is required"));
    }

    #[tokio::test]
    async fn unknown_type_is_invalid_params() {
        let server = Server::new(test_config(), ledger().await, None);
        let response = call(
            server.router(),
            rpc("validateTransaction", json!({ "transactionType": "Teleport" })),
        )
        .await;

        assert_eq!(response["error"]["code"], INVALID_PARAMS);
        assert_eq!(response["error"]["message"], "Unsupported transaction type: Teleport");
    }

    #[tokio::test]
    async fn lists_every_registered_type() {
        let server = Server::new(test_config(), ledger().await, None);
        let response = call(server.router(), rpc("listTransactionTypes", Value::Null)).await;

        let names = response["result"].as_array().unwrap();
        assert_eq!(names.len(), TransactionType::ALL.len());
        assert!(names.iter().any(|n| n == "AMMCreate"));
    }

    #[tokio::test]
    async fn optional_backends_report_server_errors() {
        let server = Server::new(test_config(), ledger().await, None);

        let recent = call(server.router(), rpc("recentValidations", json!({}))).await;
        assert_eq!(recent["error"]["code"], SERVER_ERROR);

        let fund = call(server.router(), rpc("fundAccount", json!({}))).await;
        assert_eq!(fund["error"]["code"], SERVER_ERROR);
        assert_eq!(fund["error"]["message"], "Faucet is not configured");
    }

    #[tokio::test]
    async fn records_validations_in_the_registry() {
        let registry = Registry::connect("sqlite::memory:").await.unwrap();
        let server = Server::new(test_config(), ledger().await, Some(registry));

        call(
            server.router(),
            rpc(
                "validateTransaction",
                json!({ "transactionType": "AccountSet", "inputs": { "account": ALICE, "seed": SEED } }),
            ),
        )
        .await;

        let recent = call(server.router(), rpc("recentValidations", json!({ "limit": 5 }))).await;
        let rows = recent["result"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["transactionType"], "AccountSet");
        assert_eq!(rows[0]["account"], ALICE);
    }

    #[tokio::test]
    async fn unknown_method_is_not_found() {
        let server = Server::new(test_config(), ledger().await, None);
        let response = call(server.router(), rpc("sendTransaction", json!({}))).await;
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);
    }
}
