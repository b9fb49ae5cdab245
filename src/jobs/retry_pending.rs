use std::time::Duration;

use async_trait::async_trait;

use super::PeriodicJob;
use crate::rsvp::RsvpService;
use crate::rsvp::sheet::ForwardError;

/// Re-sends RSVPs that were accepted while the spreadsheet service was
/// down. Records that still can't be delivered go back on the queue.
#[derive(Debug)]
pub struct RetryPendingSubmissions;

#[async_trait]
impl PeriodicJob for RetryPendingSubmissions {
    fn interval(&self) -> Duration {
        // Run every minute
        Duration::from_secs(60)
    }

    async fn run_job(&self, service: &RsvpService) {
        let Some(sheet) = service.sheet() else {
            return;
        };

        let queued = service.pending().len();
        if queued == 0 {
            return;
        }
        tracing::info!("Retrying {} pending RSVPs", queued);

        // Records stay queued while in flight so new submissions can't
        // take their slot
        while let Some(record) = service.pending().front() {
            match sheet.forward(&record).await {
                Ok(()) => {
                    tracing::info!("Pending RSVP for {} recorded", record.nombre);
                    service.pending().pop_front();
                }
                Err(ForwardError::Unavailable(reason)) => {
                    tracing::warn!(
                        "Spreadsheet still unavailable ({}), keeping {} pending RSVPs",
                        reason,
                        service.pending().len()
                    );
                    break;
                }
                Err(e @ ForwardError::Rejected(_)) => {
                    tracing::error!("Dropping pending RSVP for {}: {} {:?}", record.nombre, e, record);
                    service.pending().pop_front();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::rsvp::SheetRecord;
    use crate::rsvp::pending::PendingQueue;
    use crate::rsvp::rate_limit::{RateLimitConfig, RateLimiter};
    use crate::rsvp::sheet::{RetryPolicy, SheetClient};

    fn record(name: &str) -> SheetRecord {
        SheetRecord {
            fecha: "07/10/2025, 12:30".to_string(),
            nombre: name.to_string(),
            invitados: "1".to_string(),
            mensaje: "Sin mensaje".to_string(),
            asiste_civil: "Sí".to_string(),
            asiste_almuerzo: "No".to_string(),
            limitaciones_gastronomicas: "No aplica (no asiste al almuerzo)".to_string(),
        }
    }

    fn service_with(url: &str, retry: RetryPolicy, capacity: usize) -> RsvpService {
        let sheet = SheetClient::new(url, Duration::from_secs(5), retry).unwrap();
        RsvpService::new(
            Arc::new(RateLimiter::new(RateLimitConfig::default())),
            Some(sheet),
            PendingQueue::new(capacity),
        )
    }

    fn service(url: &str) -> RsvpService {
        let retry = RetryPolicy {
            max_retries: 0,
            initial_backoff: Duration::from_millis(1),
        };
        service_with(url, retry, 10)
    }

    #[tokio::test]
    async fn test_delivers_pending_records() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(201)
            .expect(2)
            .create_async()
            .await;

        let service = service(&server.url());
        service.pending().push(record("Ana")).unwrap();
        service.pending().push(record("Jan")).unwrap();

        RetryPendingSubmissions.run_job(&service).await;

        mock.assert_async().await;
        assert!(service.pending().is_empty());
    }

    #[tokio::test]
    async fn test_keeps_records_while_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("POST", "/").with_status(503).create_async().await;

        let service = service(&server.url());
        service.pending().push(record("Ana")).unwrap();

        RetryPendingSubmissions.run_job(&service).await;

        assert_eq!(service.pending().len(), 1);
    }

    #[tokio::test]
    async fn test_drops_rejected_records() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("POST", "/").with_status(422).create_async().await;

        let service = service(&server.url());
        service.pending().push(record("Ana")).unwrap();

        RetryPendingSubmissions.run_job(&service).await;

        assert!(service.pending().is_empty());
    }

    #[tokio::test]
    async fn test_keeps_order_when_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let service = service(&server.url());
        service.pending().push(record("Ana")).unwrap();
        service.pending().push(record("Jan")).unwrap();

        RetryPendingSubmissions.run_job(&service).await;

        // Stops at the first failure instead of hammering the sheet
        mock.assert_async().await;
        assert_eq!(service.pending().len(), 2);
        assert_eq!(service.pending().front().unwrap().nombre, "Ana");
    }

    #[tokio::test]
    async fn test_in_flight_record_keeps_its_slot() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("POST", "/").with_status(503).create_async().await;

        let retry = RetryPolicy {
            max_retries: 1,
            initial_backoff: Duration::from_millis(300),
        };
        let service = service_with(&server.url(), retry, 1);
        service.pending().push(record("Ana")).unwrap();

        let job_service = service.clone();
        let job = tokio::spawn(async move {
            RetryPendingSubmissions.run_job(&job_service).await;
        });

        // The job is waiting on its backoff, the queue must still be full
        tokio::time::sleep(Duration::from_millis(100)).await;
        let rejected = service.pending().push(record("Jan")).unwrap_err();
        assert_eq!(rejected.nombre, "Jan");

        job.await.unwrap();
        assert_eq!(service.pending().len(), 1);
        assert_eq!(service.pending().front().unwrap().nombre, "Ana");
    }
}
