use cid::Cid;
use multihash_codetable::{Code, MultihashDigest};
use serde::Deserialize;
use shared_types::FeatureFlags;

use crate::config::{PinataAuth, Settings};

/// Multicodec code for raw bytes.
const RAW_CODEC: u64 = 0x55;

/// Content-addressed archival of case attachments.
///
/// `pin` never retries. Callers log a failure and carry on without the
/// identifier.
#[derive(Debug, Clone)]
pub enum ArchivalClient {
    Pinata(PinataClient),
    /// Computes the CIDv1 in process. Nothing leaves the host.
    Local,
}

impl ArchivalClient {
    /// Pinata when the `pinata` flag is on and credentials are configured,
    /// local content addressing otherwise.
    pub fn from_settings(flags: &FeatureFlags, settings: &Settings) -> Self {
        match (&settings.pinata_auth, flags.pinata) {
            (Some(auth), true) => {
                tracing::info!(url = %settings.pinata_url, "Archiving attachments to Pinata");
                ArchivalClient::Pinata(PinataClient::new(settings.pinata_url.clone(), auth.clone()))
            }
            (None, true) => {
                tracing::warn!("pinata flag is on but no Pinata credentials are set, using local CIDs");
                ArchivalClient::Local
            }
            _ => ArchivalClient::Local,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            ArchivalClient::Pinata(_) => "pinata",
            ArchivalClient::Local => "local",
        }
    }

    #[tracing::instrument(skip(self, bytes), fields(backend = self.backend_name(), size = bytes.len()))]
    pub async fn pin(&self, filename: &str, bytes: Vec<u8>) -> Result<String, String> {
        match self {
            ArchivalClient::Pinata(client) => client.pin_file(filename, bytes).await,
            ArchivalClient::Local => Ok(local_cid(&bytes)),
        }
    }
}

/// CIDv1 (raw codec, sha2-256) of `data`.
pub fn local_cid(data: &[u8]) -> String {
    let hash = Code::Sha2_256.digest(data);
    Cid::new_v1(RAW_CODEC, hash).to_string()
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Client for Pinata's `pinFileToIPFS` endpoint.
#[derive(Debug, Clone)]
pub struct PinataClient {
    http: reqwest::Client,
    url: String,
    auth: PinataAuth,
}

impl PinataClient {
    pub fn new(url: String, auth: PinataAuth) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
            auth,
        }
    }

    async fn pin_file(&self, filename: &str, bytes: Vec<u8>) -> Result<String, String> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let metadata = serde_json::json!({ "name": filename }).to_string();
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("pinataMetadata", metadata);

        let request = self.http.post(&self.url).multipart(form);
        let request = match &self.auth {
            PinataAuth::Jwt(token) => request.bearer_auth(token),
            PinataAuth::KeyPair { api_key, secret } => request
                .header("pinata_api_key", api_key)
                .header("pinata_secret_api_key", secret),
        };

        let response = request
            .send()
            .await
            .map_err(|e| format!("Pinata request failed: {e}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("Pinata API error ({status}): {body}"));
        }

        let body: PinResponse = response
            .json()
            .await
            .map_err(|e| format!("Pinata response was not understood: {e}"))?;

        tracing::info!(filename, cid = %body.ipfs_hash, "File pinned");
        Ok(body.ipfs_hash)
    }
}
