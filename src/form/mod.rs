//! Headless RSVP form: field values, inline errors and the
//! confirm-before-submit flow.
//!
//! ```text
//! Editing --submit (all valid)--> Confirming --confirm--> Submitting
//!    ^                              |                     |      |
//!    +------------cancel------------+                     |   success
//!    +-------------------------failure--------------------+      v
//!    +-----------------tick after RESET_DELAY-------------- Submitted
//! ```
//!
//! The reset after a successful submission clears every field so the
//! same device is ready for the next guest.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde_json::Value;
use thiserror::Error;

use crate::rsvp::models::{DietaryRestriction, RsvpRequest};
use crate::rsvp::validate::{Field, validate_field};

/// How long the thank-you state stays up before the form clears itself
pub const RESET_DELAY: Duration = Duration::from_secs(5);

const DEFAULT_GUESTS: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Editing,
    Confirming,
    Submitting,
    Submitted { at: Instant },
}

impl FormState {
    fn name(&self) -> &'static str {
        match self {
            FormState::Editing => "editing",
            FormState::Confirming => "confirming",
            FormState::Submitting => "submitting",
            FormState::Submitted { .. } => "submitted",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("{0} field(s) need attention")]
    Invalid(usize),
}

#[derive(Debug, Clone)]
pub struct RsvpForm {
    name: String,
    guests: String,
    message: String,
    attend_civil: bool,
    attend_lunch: bool,
    dietary: DietaryRestriction,
    dietary_details: String,
    errors: BTreeMap<Field, &'static str>,
    state: FormState,
    notice: Option<String>,
}

impl Default for RsvpForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            guests: DEFAULT_GUESTS.to_string(),
            message: String::new(),
            attend_civil: false,
            attend_lunch: false,
            dietary: DietaryRestriction::None,
            dietary_details: String::new(),
            errors: BTreeMap::new(),
            state: FormState::Editing,
            notice: None,
        }
    }
}

impl RsvpForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn error(&self, field: Field) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    pub fn errors(&self) -> &BTreeMap<Field, &'static str> {
        &self.errors
    }

    /// Message from the last failed submission, if any
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn guests(&self) -> &str {
        &self.guests
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn attend_civil(&self) -> bool {
        self.attend_civil
    }

    pub fn attend_lunch(&self) -> bool {
        self.attend_lunch
    }

    pub fn dietary(&self) -> DietaryRestriction {
        self.dietary
    }

    pub fn dietary_details(&self) -> &str {
        &self.dietary_details
    }

    fn ensure(&self, action: &'static str, allowed: bool) -> Result<(), FormError> {
        if allowed {
            Ok(())
        } else {
            Err(FormError::InvalidTransition {
                action,
                state: self.state.name(),
            })
        }
    }

    fn editable(&self) -> Result<(), FormError> {
        self.ensure("edit", self.state == FormState::Editing)
    }

    fn revalidate(&mut self, fields: &[Field]) {
        let payload = self.payload();
        for field in fields {
            match validate_field(*field, &payload) {
                Some(e) => self.errors.insert(*field, e.message),
                None => self.errors.remove(field),
            };
        }
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), FormError> {
        self.editable()?;
        self.name = name.to_string();
        self.revalidate(&[Field::Name]);
        Ok(())
    }

    pub fn set_guests(&mut self, guests: &str) -> Result<(), FormError> {
        self.editable()?;
        self.guests = guests.to_string();
        self.revalidate(&[Field::Guests]);
        Ok(())
    }

    pub fn set_message(&mut self, message: &str) -> Result<(), FormError> {
        self.editable()?;
        self.message = message.to_string();
        self.revalidate(&[Field::Message]);
        Ok(())
    }

    pub fn set_attend_civil(&mut self, attend: bool) -> Result<(), FormError> {
        self.editable()?;
        self.attend_civil = attend;
        self.revalidate(&[Field::Events]);
        Ok(())
    }

    pub fn set_attend_lunch(&mut self, attend: bool) -> Result<(), FormError> {
        self.editable()?;
        self.attend_lunch = attend;
        self.revalidate(&[Field::Events, Field::Dietary]);
        Ok(())
    }

    pub fn set_dietary(&mut self, dietary: DietaryRestriction) -> Result<(), FormError> {
        self.editable()?;
        self.dietary = dietary;
        self.revalidate(&[Field::Dietary]);
        Ok(())
    }

    pub fn set_dietary_details(&mut self, details: &str) -> Result<(), FormError> {
        self.editable()?;
        self.dietary_details = details.to_string();
        self.revalidate(&[Field::Dietary]);
        Ok(())
    }

    /// Wire payload for the current values. Dietary choices are only
    /// sent for guests attending the lunch.
    pub fn payload(&self) -> RsvpRequest {
        let (dietary, details) = if self.attend_lunch {
            let details = Some(self.dietary_details.clone()).filter(|d| !d.trim().is_empty());
            (self.dietary, details)
        } else {
            (DietaryRestriction::None, None)
        };

        RsvpRequest {
            nombre: Some(self.name.clone()),
            invitados: Some(Value::String(self.guests.clone())),
            mensaje: Some(self.message.clone()).filter(|m| !m.trim().is_empty()),
            attend_civil: self.attend_civil,
            attend_lunch: self.attend_lunch,
            dietary_restrictions: Some(dietary.as_str().to_string()),
            dietary_details: details,
        }
    }

    /// Validate every field and move on to the confirmation step.
    pub fn submit(&mut self) -> Result<(), FormError> {
        self.ensure("submit", self.state == FormState::Editing)?;
        self.revalidate(&Field::ALL);
        if !self.errors.is_empty() {
            return Err(FormError::Invalid(self.errors.len()));
        }
        self.notice = None;
        self.state = FormState::Confirming;
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), FormError> {
        self.ensure("cancel", self.state == FormState::Confirming)?;
        self.state = FormState::Editing;
        Ok(())
    }

    /// Confirm the summary. Returns the payload to send.
    pub fn confirm(&mut self) -> Result<RsvpRequest, FormError> {
        self.ensure("confirm", self.state == FormState::Confirming)?;
        self.state = FormState::Submitting;
        Ok(self.payload())
    }

    pub fn succeed(&mut self, now: Instant) -> Result<(), FormError> {
        self.ensure("complete", self.state == FormState::Submitting)?;
        self.state = FormState::Submitted { at: now };
        Ok(())
    }

    /// Back to editing with everything the guest typed still there.
    pub fn fail(&mut self, notice: &str) -> Result<(), FormError> {
        self.ensure("fail", self.state == FormState::Submitting)?;
        self.notice = Some(notice.to_string());
        self.state = FormState::Editing;
        Ok(())
    }

    /// When the form should clear itself, if it is waiting to.
    pub fn reset_at(&self) -> Option<Instant> {
        match self.state {
            FormState::Submitted { at } => Some(at + RESET_DELAY),
            _ => None,
        }
    }

    /// Advance timers. Returns true if the form was cleared.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.reset_at() {
            Some(deadline) if now >= deadline => {
                *self = Self::default();
                true
            }
            _ => false,
        }
    }
}
