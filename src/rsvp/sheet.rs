//! Client for the external spreadsheet API that stores RSVPs.
//!
//! The service is write-only from our side: one POST per record with
//! the flattened row as JSON.

use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use super::models::SheetRecord;

#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry, doubled after each attempt
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff.saturating_mul(2u32.saturating_pow(attempt))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForwardError {
    /// Timeouts, connection failures, 5xx and 429. Worth trying again later.
    #[error("Spreadsheet service unavailable: {0}")]
    Unavailable(String),

    /// Any other non-success status. Retrying the same record won't help.
    #[error("Spreadsheet service rejected the record: {0}")]
    Rejected(String),
}

#[derive(Clone, Debug)]
pub struct SheetClient {
    client: Client,
    url: String,
    retry: RetryPolicy,
}

impl SheetClient {
    pub fn new(url: &str, timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
            retry,
        })
    }

    async fn send(&self, record: &SheetRecord) -> Result<(), ForwardError> {
        let resp = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(record)
            .send()
            .await
            .map_err(|e| ForwardError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            Err(ForwardError::Unavailable(format!("status {}", status)))
        } else {
            Err(ForwardError::Rejected(format!("status {}", status)))
        }
    }

    /// Send a record, retrying with exponential backoff while the
    /// service looks temporarily unavailable.
    pub async fn forward(&self, record: &SheetRecord) -> Result<(), ForwardError> {
        let mut attempt = 0;
        loop {
            match self.send(record).await {
                Ok(()) => return Ok(()),
                Err(ForwardError::Unavailable(reason)) if attempt < self.retry.max_retries => {
                    let delay = self.retry.backoff(attempt);
                    tracing::warn!(
                        "Spreadsheet write failed ({}), retrying in {:?} (attempt {}/{})",
                        reason,
                        delay,
                        attempt + 1,
                        self.retry.max_retries
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SheetRecord {
        SheetRecord {
            fecha: "07/10/2025, 12:30".to_string(),
            nombre: "Ana López".to_string(),
            invitados: "2".to_string(),
            mensaje: "Sin mensaje".to_string(),
            asiste_civil: "Sí".to_string(),
            asiste_almuerzo: "No".to_string(),
            limitaciones_gastronomicas: "No aplica (no asiste al almuerzo)".to_string(),
        }
    }

    fn client(url: &str) -> SheetClient {
        SheetClient::new(
            url,
            Duration::from_secs(5),
            RetryPolicy {
                max_retries: 2,
                initial_backoff: Duration::from_millis(1),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_millis(250));
        assert_eq!(policy.backoff(1), Duration::from_millis(500));
        assert_eq!(policy.backoff(2), Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_forward_posts_record_as_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/sheet")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "Nombre": "Ana López",
                "Asiste_Civil": "Sí",
                "Asiste_Almuerzo": "No"
            })))
            .with_status(201)
            .with_body(r#"{"created":1}"#)
            .expect(1)
            .create_async()
            .await;

        let url = format!("{}/api/v1/sheet", server.url());
        let result = client(&url).forward(&record()).await;

        assert!(result.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_forward_retries_server_errors() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let result = client(&server.url()).forward(&record()).await;

        assert!(matches!(result, Err(ForwardError::Unavailable(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_forward_does_not_retry_client_errors() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(400)
            .expect(1)
            .create_async()
            .await;

        let result = client(&server.url()).forward(&record()).await;

        assert!(matches!(result, Err(ForwardError::Rejected(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_forward_unreachable_is_unavailable() {
        // Nothing listens on port 9 locally
        let result = client("http://127.0.0.1:9/").forward(&record()).await;
        assert!(matches!(result, Err(ForwardError::Unavailable(_))));
    }
}
