//! Submission pipeline: throttle, validate, sanitize, enrich, forward.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::error::RsvpError;
use super::models::{DietaryRestriction, RsvpRequest, SheetRecord, Submission};
use super::pending::PendingQueue;
use super::rate_limit::RateLimiter;
use super::sanitize::clean;
use super::sheet::{ForwardError, SheetClient};
use super::validate::validate;

/// Timestamps in the sheet are local to the venue
pub const LOCAL_TIMEZONE: Tz = chrono_tz::America::Argentina::Buenos_Aires;

const YES: &str = "Sí";
const NO: &str = "No";
const NO_MESSAGE: &str = "Sin mensaje";
const NOT_AT_LUNCH: &str = "No aplica (no asiste al almuerzo)";

/// What gets echoed back to the guest after a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub nombre: String,
    pub invitados: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Written to the spreadsheet
    Forwarded(Receipt),
    /// Accepted and queued, the spreadsheet write is still outstanding
    Pending(Receipt),
}

impl Outcome {
    pub fn receipt(&self) -> &Receipt {
        match self {
            Outcome::Forwarded(r) | Outcome::Pending(r) => r,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RsvpService {
    limiter: Arc<RateLimiter>,
    sheet: Option<SheetClient>,
    pending: PendingQueue,
}

impl RsvpService {
    pub fn new(limiter: Arc<RateLimiter>, sheet: Option<SheetClient>, pending: PendingQueue) -> Self {
        Self {
            limiter,
            sheet,
            pending,
        }
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn sheet(&self) -> Option<&SheetClient> {
        self.sheet.as_ref()
    }

    pub fn pending(&self) -> &PendingQueue {
        &self.pending
    }

    pub fn check_rate(&self, client_id: &str) -> Result<(), RsvpError> {
        if self.limiter.allow(client_id) {
            Ok(())
        } else {
            tracing::warn!("Rate limit exceeded for client {}", client_id);
            Err(RsvpError::RateLimited)
        }
    }

    pub async fn submit(&self, client_id: &str, req: RsvpRequest) -> Result<Outcome, RsvpError> {
        self.check_rate(client_id)?;
        self.process(req, Utc::now()).await
    }

    /// Everything after the rate limit check.
    pub async fn process(&self, req: RsvpRequest, now: DateTime<Utc>) -> Result<Outcome, RsvpError> {
        let submission = validate(&req).map_err(|errors| {
            let details: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
            tracing::warn!("Rejected RSVP: {}", details.join("; "));
            RsvpError::Validation(details)
        })?;

        let record = to_sheet_record(&submission, now);

        let Some(sheet) = &self.sheet else {
            tracing::error!("Spreadsheet endpoint not configured, dropping RSVP");
            return Err(RsvpError::Configuration);
        };

        let receipt = Receipt {
            nombre: record.nombre.clone(),
            invitados: record.invitados.clone(),
        };

        match sheet.forward(&record).await {
            Ok(()) => {
                tracing::info!(
                    "RSVP recorded for {} ({} guests)",
                    receipt.nombre,
                    receipt.invitados
                );
                Ok(Outcome::Forwarded(receipt))
            }
            Err(ForwardError::Unavailable(reason)) => match self.pending.push(record) {
                Ok(()) => {
                    tracing::warn!(
                        "Spreadsheet unavailable ({}), queued RSVP for {}",
                        reason,
                        receipt.nombre
                    );
                    Ok(Outcome::Pending(receipt))
                }
                Err(_) => {
                    tracing::error!("Pending queue full, RSVP for {} not stored", receipt.nombre);
                    Err(RsvpError::Upstream(reason))
                }
            },
            Err(e @ ForwardError::Rejected(_)) => {
                tracing::error!("RSVP for {} not stored: {}", receipt.nombre, e);
                Err(RsvpError::Upstream(e.to_string()))
            }
        }
    }
}

fn yes_no(flag: bool) -> String {
    let answer = if flag { YES } else { NO };
    answer.to_string()
}

fn dietary_summary(submission: &Submission) -> String {
    if !submission.attend_lunch {
        return NOT_AT_LUNCH.to_string();
    }
    if submission.dietary == DietaryRestriction::None {
        return submission.dietary.label().to_string();
    }
    let details = submission
        .dietary_details
        .as_deref()
        .map(clean)
        .filter(|d| !d.is_empty());
    match details {
        Some(d) => format!("{}: {}", submission.dietary.label(), d),
        None => submission.dietary.label().to_string(),
    }
}

/// Flatten a validated submission into the row stored in the sheet.
pub fn to_sheet_record(submission: &Submission, now: DateTime<Utc>) -> SheetRecord {
    let mensaje = submission
        .message
        .as_deref()
        .map(clean)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| NO_MESSAGE.to_string());

    SheetRecord {
        fecha: now
            .with_timezone(&LOCAL_TIMEZONE)
            .format("%d/%m/%Y, %H:%M")
            .to_string(),
        nombre: clean(&submission.name),
        invitados: submission.guest_count.to_string(),
        mensaje,
        asiste_civil: yes_no(submission.attend_civil),
        asiste_almuerzo: yes_no(submission.attend_lunch),
        limitaciones_gastronomicas: dietary_summary(submission),
    }
}
