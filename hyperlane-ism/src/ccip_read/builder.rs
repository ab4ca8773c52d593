use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use regex::{RegexSet, RegexSetBuilder};
use tracing::{info, instrument, warn};

use hyperlane_core::utils::bytes_to_hex;
use hyperlane_core::{
    h256_to_address, CcipReadIsm, HyperlaneMessage, IsmError, IsmResult, OffchainLookup,
};

use super::{OffchainFetcher, OffchainRequest};

/// Gateways on the local host or addressed by raw IP are never contacted.
const SUSPICIOUS_URL_PATTERNS: &[&str] = &[
    r"^[a-z]+://localhost([:/]|$)",
    r"^[a-z]+://127\.",
    r"^[a-z]+://0\.0\.0\.0",
    r"^[a-z]+://\[?::1\]?",
    r"^[a-z]+://\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}([:/]|$)",
];

/// Builds metadata for [`CcipReadIsm`]s by asking their gateways.
pub struct CcipReadMetadataBuilder {
    fetcher: Arc<dyn OffchainFetcher>,
    denylist: RegexSet,
}

impl CcipReadMetadataBuilder {
    pub fn new(fetcher: Arc<dyn OffchainFetcher>) -> IsmResult<Self> {
        let denylist = RegexSetBuilder::new(SUSPICIOUS_URL_PATTERNS)
            .case_insensitive(true)
            .build()
            .map_err(|err| IsmError::OffchainLookupFailed(err.to_string()))?;
        Ok(Self { fetcher, denylist })
    }

    /// Whether `url` points somewhere gateways must not live
    pub fn is_suspicious(&self, url: &str) -> bool {
        self.denylist.is_match(url)
    }

    /// The request made for `url` under `info`. Templates containing
    /// `{data}` are fetched with GET, anything else is POSTed.
    pub fn request_for(url: &str, info: &OffchainLookup) -> OffchainRequest {
        // Gateways expect the 20 byte address, in full
        let sender = bytes_to_hex(h256_to_address(info.sender).as_bytes());
        let data = bytes_to_hex(&info.call_data);
        let interpolated = url.replace("{sender}", &sender).replace("{data}", &data);
        if url.contains("{data}") {
            OffchainRequest::Get { url: interpolated }
        } else {
            OffchainRequest::Post {
                url: interpolated,
                sender,
                data,
            }
        }
    }

    /// Metadata for `info`, from the first gateway that answers.
    #[instrument(skip_all, fields(sender = ?info.sender, urls = info.urls.len()))]
    pub async fn build(&self, info: &OffchainLookup) -> IsmResult<Vec<u8>> {
        for url in info.urls.iter() {
            if self.is_suspicious(url) {
                warn!(url = url.as_str(), "Refusing to query suspicious gateway");
                continue;
            }
            let request = Self::request_for(url, info);
            match self.fetcher.fetch(&request).await {
                Ok(metadata) => {
                    info!(url = request.url(), "Fetched offchain metadata");
                    return Ok(metadata);
                }
                // try the next URL
                Err(err) => warn!(url = request.url(), error = %err, "Gateway failed"),
            }
        }
        Err(IsmError::OffchainLookupFailed(format!(
            "none of {} gateway(s) returned metadata",
            info.urls.len()
        )))
    }

    /// Ask `ism` what to look up for `message`, then look it up.
    pub async fn build_for(
        &self,
        ism: &dyn CcipReadIsm,
        message: &HyperlaneMessage,
    ) -> IsmResult<Vec<u8>> {
        let info = ism.get_offchain_verify_info(message)?;
        self.build(&info).await
    }
}

impl Debug for CcipReadMetadataBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CcipReadMetadataBuilder")
            .field("denylist", &self.denylist.patterns())
            .finish_non_exhaustive()
    }
}
