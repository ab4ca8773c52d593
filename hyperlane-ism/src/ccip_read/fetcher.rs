use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use hyperlane_core::utils::hex_to_bytes;
use hyperlane_core::{IsmError, IsmResult};

/// Gateways that do not answer within this long are skipped
pub const GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);

/// One request to an off-chain gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OffchainRequest {
    /// The URL template carried the call data
    Get {
        /// Interpolated URL
        url: String,
    },
    /// The call data travels in a JSON body
    Post {
        /// Interpolated URL
        url: String,
        /// Hex encoded lookup sender
        sender: String,
        /// Hex encoded call data
        data: String,
    },
}

impl OffchainRequest {
    pub fn url(&self) -> &str {
        match self {
            OffchainRequest::Get { url } | OffchainRequest::Post { url, .. } => url,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct OffchainResponse {
    data: String,
}

/// Performs gateway requests on behalf of the metadata builder.
#[async_trait]
pub trait OffchainFetcher: Send + Sync {
    /// The metadata returned by the gateway
    async fn fetch(&self, request: &OffchainRequest) -> IsmResult<Vec<u8>>;
}

/// [`OffchainFetcher`] speaking HTTP with `{"data": "0x.."}` responses.
#[derive(Debug, Clone)]
pub struct HttpOffchainFetcher {
    client: Client,
}

impl HttpOffchainFetcher {
    pub fn new() -> IsmResult<Self> {
        let client = Client::builder()
            .timeout(GATEWAY_TIMEOUT)
            .build()
            .map_err(|err| IsmError::OffchainLookupFailed(err.to_string()))?;
        Ok(Self { client })
    }
}

fn lookup_failed(err: impl ToString) -> IsmError {
    IsmError::OffchainLookupFailed(err.to_string())
}

#[async_trait]
impl OffchainFetcher for HttpOffchainFetcher {
    async fn fetch(&self, request: &OffchainRequest) -> IsmResult<Vec<u8>> {
        let response = match request {
            OffchainRequest::Get { url } => self.client.get(url).send().await,
            OffchainRequest::Post { url, sender, data } => {
                self.client
                    .post(url)
                    .header("Content-Type", "application/json")
                    .json(&json!({ "sender": sender, "data": data }))
                    .send()
                    .await
            }
        }
        .and_then(|response| response.error_for_status())
        .map_err(lookup_failed)?;

        let OffchainResponse { data } = response.json().await.map_err(lookup_failed)?;
        hex_to_bytes(&data).map_err(lookup_failed)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn requests_expose_their_url() {
        let get = OffchainRequest::Get {
            url: "https://a.example/0x01".into(),
        };
        let post = OffchainRequest::Post {
            url: "https://b.example".into(),
            sender: "0x00".into(),
            data: "0x01".into(),
        };
        assert_eq!(get.url(), "https://a.example/0x01");
        assert_eq!(post.url(), "https://b.example");
    }

    #[test]
    fn responses_decode_from_json() {
        let response: OffchainResponse = serde_json::from_str(r#"{"data":"0xdead"}"#).unwrap();
        assert_eq!(hex_to_bytes(&response.data).unwrap(), vec![0xde, 0xad]);
    }

    #[tokio::test]
    async fn unreachable_gateways_fail_the_lookup() {
        let fetcher = HttpOffchainFetcher::new().unwrap();
        let request = OffchainRequest::Get {
            url: "http://127.0.0.1:9/unreachable".into(),
        };
        assert!(matches!(
            fetcher.fetch(&request).await,
            Err(IsmError::OffchainLookupFailed(_))
        ));
    }
}
