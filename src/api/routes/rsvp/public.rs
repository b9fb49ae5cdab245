//! Public types for the RSVP API
use serde::{Deserialize, Serialize};

pub use crate::rsvp::models::RsvpRequest;
use crate::rsvp::{Outcome, Receipt};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RsvpData {
    pub nombre: String,
    pub invitados: String,
}

impl From<&Receipt> for RsvpData {
    fn from(receipt: &Receipt) -> Self {
        Self {
            nombre: receipt.nombre.clone(),
            invitados: receipt.invitados.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RsvpResponse {
    pub success: bool,
    pub message: String,
    // Only present when the spreadsheet write is still outstanding
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pending: bool,
    pub data: RsvpData,
}

impl From<&Outcome> for RsvpResponse {
    fn from(outcome: &Outcome) -> Self {
        let (message, pending) = match outcome {
            Outcome::Forwarded(_) => ("RSVP enviado exitosamente", false),
            Outcome::Pending(_) => ("RSVP recibido, confirmación pendiente", true),
        };
        Self {
            success: true,
            message: message.to_string(),
            pending,
            data: outcome.receipt().into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
            details: None,
        }
    }

    pub fn with_details(error: &str, details: Vec<String>) -> Self {
        Self {
            error: error.to_string(),
            details: Some(details),
        }
    }
}
