use crate::validation::codec;
use serde_json::{Value, json};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum FaucetError {
    #[error("Invalid destination address: {0}")]
    InvalidDestination(String),

    #[error("faucet request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("faucet responded with status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Stateless relay to a faucet endpoint
///
/// One request in, one request out. No retries.
pub struct FaucetProxy {
    http: reqwest::Client,
    url: String,
}

impl FaucetProxy {
    /// Creates a proxy for the faucet at `url` (e.g. "https://faucet.altnet.rippletest.net/accounts")
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Funds `destination`, or asks the faucet to create a new account when `None`
    ///
    /// # Returns
    /// The faucet's JSON response body, unchanged
    pub async fn fund(&self, destination: Option<&str>) -> Result<Value, FaucetError> {
        let body = match destination {
            Some(address) if !codec::is_valid_classic_address(address) => {
                return Err(FaucetError::InvalidDestination(address.to_string()));
            }
            Some(address) => json!({ "destination": address }),
            None => json!({}),
        };

        info!("Requesting faucet funding for {}", destination.unwrap_or("a new account"));
        let response = self.http.post(&self.url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Faucet returned {}: {}", status, body);
            return Err(FaucetError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_malformed_destination_without_calling_out() {
        // Port 9 (discard) is never contacted; validation fails first
        let proxy = FaucetProxy::new("http://127.0.0.1:9/accounts");
        let err = proxy.fund(Some("not-an-address")).await.unwrap_err();
        assert!(matches!(err, FaucetError::InvalidDestination(_)));
        assert_eq!(err.to_string(), "Invalid destination address: not-an-address");
    }
}
