//! HTTP client for network-based API calls

use crate::{ClientError, ClientResult};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::models::{QueueEntry, QueueEntryCreate, QueueStatus, QueueStatusUpdate};

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP client for making network requests to the Waitlist Server
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client for the given base URL
    /// (e.g. "http://localhost:4000")
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.url(path);
        let response = self.client.get(&url).send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = self.url(path);
        let response = self.client.post(&url).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = self.url(path);
        let response = self.client.put(&url).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Make a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.url(path);
        let response = self.client.delete(&url).send().await?;
        Self::handle_response(response).await
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            return match status {
                StatusCode::BAD_REQUEST => Err(ClientError::Validation(text)),
                _ => Err(ClientError::Internal(text)),
            };
        }

        response.json().await.map_err(Into::into)
    }

    // ========== Queue API ==========

    /// Fetch a single queue entry; `None` if unknown id
    pub async fn get_queue(&self, id: &str) -> ClientResult<Option<QueueEntry>> {
        self.get(&format!("/api/queue/{}", id)).await
    }

    /// Fetch all queue entries, ordered by position ascending
    pub async fn get_all_queues(&self) -> ClientResult<Vec<QueueEntry>> {
        self.get("/api/queue").await
    }

    /// Current estimated wait in minutes (15 × waiting parties)
    pub async fn get_current_wait_time(&self) -> ClientResult<i64> {
        self.get("/api/queue/wait-time").await
    }

    /// Join the queue
    pub async fn add_to_queue(&self, entry: &QueueEntryCreate) -> ClientResult<QueueEntry> {
        self.post("/api/queue", entry).await
    }

    /// Advance (or cancel) an entry's status; `None` if unknown id
    pub async fn update_queue_status(
        &self,
        id: &str,
        status: QueueStatus,
    ) -> ClientResult<Option<QueueEntry>> {
        self.put(
            &format!("/api/queue/{}/status", id),
            &QueueStatusUpdate { status },
        )
        .await
    }

    /// Remove an entry, returning the removed record; `None` if unknown id
    pub async fn remove_from_queue(&self, id: &str) -> ClientResult<Option<QueueEntry>> {
        self.delete(&format!("/api/queue/{}", id)).await
    }
}
