//! Retrieval service client
//!
//! Direct HTTP client for the external retrieval service. The service owns
//! ranking/search; this side only sends a query and receives ranked
//! evidence. It is treated as a black box that may be slow or return
//! nothing; an empty result is a normal outcome, never an error.

use crate::error::AppError;
use anyhow::anyhow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A retrieved text fragment used to ground an answer or summary.
///
/// Opaque beyond `id` and `text`; the relevance score is carried through
/// for the trace but never interpreted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceHit {
    /// Document identifier assigned by the retrieval service
    pub id: String,
    /// Evidence text fragment
    pub text: String,
    /// Relevance score (higher is more relevant)
    #[serde(default)]
    pub score: f64,
}

/// Contract for the external retrieval collaborator.
///
/// Returns hits in relevance-descending order; an empty vector (never
/// null) when nothing matches the query for the tenant.
#[async_trait]
pub trait RetrievalClient: Send + Sync {
    /// Retrieve up to `top_k` ranked evidence hits for a tenant's query
    async fn retrieve(
        &self,
        query: &str,
        tenant_id: &str,
        top_k: usize,
    ) -> Result<Vec<EvidenceHit>, AppError>;
}

#[derive(Serialize)]
struct RetrieveRequest<'a> {
    query: &'a str,
    tenant_id: &'a str,
    top_k: usize,
}

#[derive(Deserialize)]
struct RetrieveResponse {
    #[serde(default)]
    hits: Vec<EvidenceHit>,
}

/// HTTP implementation of [`RetrievalClient`]
pub struct HttpRetrievalClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRetrievalClient {
    /// Build a client for the retrieval service at `base_url`.
    ///
    /// The base URL is injectable so tests can point the client at a mock
    /// server.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RetrievalClient for HttpRetrievalClient {
    async fn retrieve(
        &self,
        query: &str,
        tenant_id: &str,
        top_k: usize,
    ) -> Result<Vec<EvidenceHit>, AppError> {
        let url = format!("{}/retrieve", self.base_url);

        tracing::debug!(
            url = %url,
            tenant_id = %tenant_id,
            top_k = top_k,
            query_len = query.len(),
            "Calling retrieval service"
        );

        let response = self
            .client
            .post(&url)
            .json(&RetrieveRequest {
                query,
                tenant_id,
                top_k,
            })
            .send()
            .await
            .map_err(|e| {
                AppError::Connectivity(format!("Retrieval service request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());

            tracing::error!(
                status_code = status.as_u16(),
                error_body = %error_body,
                "Retrieval service returned error status"
            );

            return Err(AppError::Connectivity(format!(
                "Retrieval service returned status {}: {}",
                status.as_u16(),
                error_body
            )));
        }

        let parsed: RetrieveResponse = response.json().await.map_err(|e| {
            AppError::Internal(anyhow!(
                "Failed to parse retrieval service response: {}",
                e
            ))
        })?;

        tracing::debug!(
            tenant_id = %tenant_id,
            hit_count = parsed.hits.len(),
            "Retrieval completed"
        );

        Ok(parsed.hits)
    }
}
