//! Field rules for RSVP submissions.
//!
//! The same rules run on every keystroke in the form and again on the
//! server before anything is forwarded. Only the server run is
//! authoritative.

use serde_json::Value;

use super::models::{DietaryRestriction, RsvpRequest, Submission};
use super::sanitize::clean;

pub const MIN_NAME_LEN: usize = 2;
pub const MIN_GUESTS: u8 = 1;
pub const MAX_GUESTS: u8 = 10;
pub const MAX_MESSAGE_LEN: usize = 500;
pub const MAX_DIETARY_DETAILS_LEN: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Name,
    Guests,
    Message,
    Events,
    Dietary,
}

impl Field {
    /// Order in which rules are evaluated and reported
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::Guests,
        Field::Message,
        Field::Events,
        Field::Dietary,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: Field, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// The length is measured on the name as it will be stored, so markup
/// characters don't count towards it.
pub fn check_name(name: Option<&str>) -> Result<String, FieldError> {
    match name {
        Some(n) if clean(n).chars().count() >= MIN_NAME_LEN => Ok(n.to_string()),
        _ => Err(FieldError::new(
            Field::Name,
            "Nombre es requerido y debe tener al menos 2 caracteres",
        )),
    }
}

fn integral(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0 && value.abs() <= i32::MAX as f64)
        .then_some(value as i64)
}

/// Parse the guest count from either a string or a JSON number. Whole
/// numbers written as floats ("2.0", 1e1) are accepted.
pub fn check_guest_count(guests: Option<&Value>) -> Result<u8, FieldError> {
    let err = || {
        FieldError::new(
            Field::Guests,
            "Número de invitados debe ser entre 1 y 10",
        )
    };
    let count = match guests {
        Some(Value::String(s)) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(n) => n,
                Err(_) => s.parse::<f64>().ok().and_then(integral).ok_or_else(err)?,
            }
        }
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(integral))
            .ok_or_else(err)?,
        _ => return Err(err()),
    };
    if (MIN_GUESTS as i64..=MAX_GUESTS as i64).contains(&count) {
        Ok(count as u8)
    } else {
        Err(err())
    }
}

pub fn check_message(message: Option<&str>) -> Result<Option<String>, FieldError> {
    match message {
        Some(m) if m.chars().count() > MAX_MESSAGE_LEN => Err(FieldError::new(
            Field::Message,
            "El mensaje no puede exceder 500 caracteres",
        )),
        Some(m) if m.trim().is_empty() => Ok(None),
        Some(m) => Ok(Some(m.to_string())),
        None => Ok(None),
    }
}

pub fn check_events(attend_civil: bool, attend_lunch: bool) -> Result<(), FieldError> {
    if attend_civil || attend_lunch {
        Ok(())
    } else {
        Err(FieldError::new(
            Field::Events,
            "Debes seleccionar al menos un evento",
        ))
    }
}

/// Dietary choices only matter for guests attending the lunch. For
/// everyone else whatever was sent is ignored.
pub fn check_dietary(
    attend_lunch: bool,
    restriction: Option<&str>,
    details: Option<&str>,
) -> Result<(DietaryRestriction, Option<String>), FieldError> {
    if !attend_lunch {
        return Ok((DietaryRestriction::None, None));
    }

    let restriction = match restriction {
        None => DietaryRestriction::None,
        Some(r) if r.trim().is_empty() => DietaryRestriction::None,
        Some(r) => r.parse().map_err(|_| {
            FieldError::new(Field::Dietary, "Limitación gastronómica desconocida")
        })?,
    };

    let details = details.map(str::trim).filter(|d| !d.is_empty());

    if let Some(d) = details
        && d.chars().count() > MAX_DIETARY_DETAILS_LEN
    {
        return Err(FieldError::new(
            Field::Dietary,
            "Los detalles no pueden exceder 200 caracteres",
        ));
    }

    if restriction.requires_details() && details.is_none() {
        return Err(FieldError::new(
            Field::Dietary,
            "Debes especificar detalles de las limitaciones gastronómicas",
        ));
    }

    Ok((restriction, details.map(str::to_string)))
}

/// Run the rule for a single field against a (possibly partial) request.
pub fn validate_field(field: Field, req: &RsvpRequest) -> Option<FieldError> {
    match field {
        Field::Name => check_name(req.nombre.as_deref()).err(),
        Field::Guests => check_guest_count(req.invitados.as_ref()).err(),
        Field::Message => check_message(req.mensaje.as_deref()).err(),
        Field::Events => check_events(req.attend_civil, req.attend_lunch).err(),
        Field::Dietary => check_dietary(
            req.attend_lunch,
            req.dietary_restrictions.as_deref(),
            req.dietary_details.as_deref(),
        )
        .err(),
    }
}

/// Validate a whole request, reporting every violated rule rather than
/// stopping at the first one.
pub fn validate(req: &RsvpRequest) -> Result<Submission, Vec<FieldError>> {
    let name = check_name(req.nombre.as_deref());
    let guests = check_guest_count(req.invitados.as_ref());
    let message = check_message(req.mensaje.as_deref());
    let events = check_events(req.attend_civil, req.attend_lunch);
    let dietary = check_dietary(
        req.attend_lunch,
        req.dietary_restrictions.as_deref(),
        req.dietary_details.as_deref(),
    );

    match (name, guests, message, events, dietary) {
        (Ok(name), Ok(guest_count), Ok(message), Ok(()), Ok((dietary, dietary_details))) => {
            Ok(Submission {
                name,
                guest_count,
                message,
                attend_civil: req.attend_civil,
                attend_lunch: req.attend_lunch,
                dietary,
                dietary_details,
            })
        }
        (name, guests, message, events, dietary) => Err([
            name.err(),
            guests.err(),
            message.err(),
            events.err(),
            dietary.err(),
        ]
        .into_iter()
        .flatten()
        .collect()),
    }
}
