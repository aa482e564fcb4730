//! Client for an NFT indexer speaking the Digital Asset Standard (DAS)
//! JSON-RPC API, used to tell collections and tokens apart.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::database::GatingType;

/// What the indexer knows about an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInfo {
    pub name: Option<String>,
    pub gating_type: GatingType,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<Asset>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct Asset {
    interface: String,
    #[serde(default)]
    content: Option<AssetContent>,
}

#[derive(Deserialize)]
struct AssetContent {
    #[serde(default)]
    metadata: Option<AssetMetadata>,
}

#[derive(Deserialize)]
struct AssetMetadata {
    #[serde(default)]
    name: Option<String>,
}

impl From<Asset> for AssetInfo {
    fn from(asset: Asset) -> Self {
        let gating_type = match asset.interface.as_str() {
            "FungibleToken" | "FungibleAsset" => GatingType::Token,
            _ => GatingType::Collection,
        };
        let name = asset
            .content
            .and_then(|c| c.metadata)
            .and_then(|m| m.name)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        AssetInfo { name, gating_type }
    }
}

fn client_or_plain(built: Result<reqwest::Client, reqwest::Error>) -> reqwest::Client {
    built.unwrap_or_else(|e| {
        log::warn!("Failed to build the indexer client, using one without a timeout: {e}");
        reqwest::Client::new()
    })
}

#[derive(Clone, Debug)]
pub struct Indexer {
    client: reqwest::Client,
    endpoint: Url,
}

impl Indexer {
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        let client = client_or_plain(
            reqwest::Client::builder()
                .timeout(Duration::from_secs(15))
                .build(),
        );
        Indexer { client, endpoint }
    }

    /// Look up an asset by address. Returns `None` if the indexer doesn't
    /// know it.
    pub async fn get_asset(&self, address: &str) -> Result<Option<AssetInfo>, reqwest::Error> {
        let response: RpcResponse = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({
                "jsonrpc": "2.0",
                "id": "blink-gate",
                "method": "getAsset",
                "params": { "id": address },
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(parse_response(address, response))
    }
}

fn parse_response(address: &str, response: RpcResponse) -> Option<AssetInfo> {
    if let Some(error) = response.error {
        log::debug!(
            "Indexer has no asset {address}: {} (code {})",
            error.message,
            error.code
        );
        return None;
    }
    response.result.map(AssetInfo::from)
}
