//! services/api/src/adapters/web3_storage.rs
//!
//! This module contains the adapter that archives chat exchanges to IPFS
//! through the web3.storage upload API. It implements the `ArchiveService` port.

use async_trait::async_trait;
use reqwest::{multipart, Client};
use sentiment_chain_core::domain::ChatTurn;
use sentiment_chain_core::ports::{ArchiveService, PortError, PortResult};
use serde::Deserialize;
use tracing::info;

const ARCHIVE_FILE_NAME: &str = "sentiment_analysis.json";

#[derive(Deserialize)]
struct UploadResponse {
    cid: Option<String>,
}

/// An adapter that implements `ArchiveService` using web3.storage.
#[derive(Clone)]
pub struct Web3StorageAdapter {
    client: Client,
    upload_url: String,
    token: String,
    gateway_domain: String,
}

impl Web3StorageAdapter {
    pub fn new(client: Client, base_url: &str, token: String, gateway_domain: &str) -> Self {
        Self {
            client,
            upload_url: format!("{}/upload", base_url.trim_end_matches('/')),
            token,
            gateway_domain: gateway_domain.trim_matches('.').to_string(),
        }
    }
}

#[async_trait]
impl ArchiveService for Web3StorageAdapter {
    async fn archive(&self, turn: &ChatTurn) -> PortResult<String> {
        let json =
            serde_json::to_vec(turn).map_err(|e| PortError::Unexpected(e.to_string()))?;
        let part = multipart::Part::bytes(json)
            .file_name(ARCHIVE_FILE_NAME)
            .mime_str("application/json")
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.upload_url)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PortError::Unavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| PortError::Upstream(e.to_string()))?;

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| PortError::Upstream(e.to_string()))?;
        let cid = body
            .cid
            .filter(|c| !c.is_empty())
            .ok_or_else(|| PortError::Upstream("Upload response carried no cid".to_string()))?;

        info!(%cid, "Uploaded chat exchange to IPFS");
        Ok(cid)
    }

    fn gateway_url(&self, cid: &str) -> String {
        format!("https://{}.{}", cid, self.gateway_domain)
    }
}
