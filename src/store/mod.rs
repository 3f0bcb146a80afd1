//! Document store client for the product catalog.
//!
//! Speaks the Cosmos-style REST dialect: documents are created and queried
//! under `/dbs/{db}/colls/{coll}/docs`, with each request carrying an
//! `authorization` header signed with the master key. The store itself
//! (persistence, consistency, conflict handling) is an external concern.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

use crate::config::StoreSettings;

/// REST API version sent with every request.
const API_VERSION: &str = "2018-12-31";

type HmacSha256 = Hmac<Sha256>;

/// Errors that can occur talking to the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store auth error: {0}")]
    Auth(String),

    #[error("Store connection error: {0}")]
    Connection(String),

    #[error("Store API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Store response parse error: {0}")]
    Parse(String),
}

/// Query response envelope returned by the store.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(rename = "Documents", default)]
    documents: Vec<Value>,
}

/// Client for the external document store.
pub struct DocumentStoreClient {
    settings: StoreSettings,
    client: Client,
}

impl DocumentStoreClient {
    /// Create a new store client with the given connection settings.
    pub fn new(settings: StoreSettings) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { settings, client }
    }

    /// Get the connection settings.
    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// Resource link of the configured container, as it appears in both
    /// request paths and auth signatures.
    fn resource_link(&self) -> String {
        format!(
            "dbs/{}/colls/{}",
            self.settings.database, self.settings.container
        )
    }

    /// URL of the documents resource within the configured container.
    fn docs_url(&self) -> String {
        format!(
            "{}/{}/docs",
            self.settings.endpoint.trim_end_matches('/'),
            self.resource_link()
        )
    }

    /// Master-key authorization token, URL-encoded for the header.
    ///
    /// Each request is signed: HMAC-SHA256 over the lowercased verb, the
    /// resource type, the resource link, and the lowercased date, keyed
    /// with the base64-decoded master key. The date signed here must be
    /// the same value sent in the `x-ms-date` header.
    fn auth_token(
        &self,
        verb: &str,
        resource_type: &str,
        resource_link: &str,
        date: &str,
    ) -> Result<String, StoreError> {
        let key = BASE64
            .decode(&self.settings.key)
            .map_err(|e| StoreError::Auth(format!("master key is not valid base64: {e}")))?;

        let payload = format!(
            "{}\n{}\n{}\n{}\n\n",
            verb.to_lowercase(),
            resource_type,
            resource_link,
            date.to_lowercase()
        );

        let mut mac = HmacSha256::new_from_slice(&key)
            .map_err(|e| StoreError::Auth(e.to_string()))?;
        mac.update(payload.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());

        Ok(urlencoding::encode(&format!("type=master&ver=1.0&sig={signature}")).into_owned())
    }

    /// Current time in the RFC 1123 form the store expects.
    fn request_date() -> String {
        Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
    }

    /// Insert a document into the container, exactly as supplied.
    ///
    /// No validation and no conflict handling; duplicate inserts are the
    /// store's concern.
    pub async fn create_item(&self, item: &Value) -> Result<(), StoreError> {
        let date = Self::request_date();
        let token = self.auth_token("post", "docs", &self.resource_link(), &date)?;
        let mut request = self
            .client
            .post(self.docs_url())
            .header("authorization", token)
            .header("x-ms-date", date)
            .header("x-ms-version", API_VERSION)
            .json(item);

        // Partition key header is a one-element JSON array of the
        // document's category value, when it has one.
        if let Some(category) = item.get("category") {
            let pk = serde_json::to_string(&serde_json::json!([category]))
                .map_err(|e| StoreError::Parse(e.to_string()))?;
            request = request.header("x-ms-documentdb-partitionkey", pk);
        }

        debug!("Creating item in {}", self.docs_url());
        let resp = request
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Api { status, body });
        }

        Ok(())
    }

    /// Run a parameterized query against the container, cross-partition
    /// enabled, and return all matching documents. No pagination.
    pub async fn query_items(
        &self,
        query: &str,
        parameters: &[(&str, Value)],
    ) -> Result<Vec<Value>, StoreError> {
        let params: Vec<Value> = parameters
            .iter()
            .map(|(name, value)| serde_json::json!({ "name": name, "value": value }))
            .collect();
        let payload = serde_json::to_vec(&serde_json::json!({
            "query": query,
            "parameters": params,
        }))
        .map_err(|e| StoreError::Parse(e.to_string()))?;

        debug!("Querying {}: {}", self.docs_url(), query);
        let date = Self::request_date();
        let token = self.auth_token("post", "docs", &self.resource_link(), &date)?;
        let resp = self
            .client
            .post(self.docs_url())
            .header("authorization", token)
            .header("x-ms-date", date)
            .header("x-ms-version", API_VERSION)
            .header(reqwest::header::CONTENT_TYPE, "application/query+json")
            .header("x-ms-documentdb-isquery", "True")
            .header("x-ms-documentdb-query-enablecrosspartition", "True")
            .body(payload)
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Api { status, body });
        }

        let envelope: QueryResponse = resp
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        Ok(envelope.documents)
    }

    /// Check whether the configured container is reachable.
    pub async fn ping(&self) -> bool {
        let url = format!(
            "{}/{}",
            self.settings.endpoint.trim_end_matches('/'),
            self.resource_link()
        );
        let date = Self::request_date();
        let token = match self.auth_token("get", "colls", &self.resource_link(), &date) {
            Ok(token) => token,
            Err(_) => return false,
        };
        let resp = self
            .client
            .get(&url)
            .header("authorization", token)
            .header("x-ms-date", date)
            .header("x-ms-version", API_VERSION)
            .send()
            .await;
        match resp {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}
