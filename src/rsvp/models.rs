use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// RSVP payload as posted by the invitation page.
///
/// Every field is optional on the wire so that missing values are
/// reported by the validator alongside every other violated rule
/// instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RsvpRequest {
    #[serde(rename = "Nombre", default)]
    pub nombre: Option<String>,
    /// The page sends this as a string but plain numbers are accepted too
    #[serde(rename = "Invitados", default)]
    pub invitados: Option<Value>,
    #[serde(rename = "Mensaje", default, skip_serializing_if = "Option::is_none")]
    pub mensaje: Option<String>,
    #[serde(rename = "attendCivil", default)]
    pub attend_civil: bool,
    #[serde(rename = "attendLunch", default)]
    pub attend_lunch: bool,
    #[serde(rename = "dietaryRestrictions", default)]
    pub dietary_restrictions: Option<String>,
    #[serde(rename = "dietaryDetails", default, skip_serializing_if = "Option::is_none")]
    pub dietary_details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietaryRestriction {
    #[default]
    None,
    Vegetarian,
    Vegan,
    GlutenFree,
    LactoseFree,
    Allergies,
    Other,
}

impl DietaryRestriction {
    pub const ALL: [DietaryRestriction; 7] = [
        DietaryRestriction::None,
        DietaryRestriction::Vegetarian,
        DietaryRestriction::Vegan,
        DietaryRestriction::GlutenFree,
        DietaryRestriction::LactoseFree,
        DietaryRestriction::Allergies,
        DietaryRestriction::Other,
    ];

    /// Wire name used by the page and the JSON payload.
    pub fn as_str(&self) -> &'static str {
        match self {
            DietaryRestriction::None => "none",
            DietaryRestriction::Vegetarian => "vegetarian",
            DietaryRestriction::Vegan => "vegan",
            DietaryRestriction::GlutenFree => "gluten_free",
            DietaryRestriction::LactoseFree => "lactose_free",
            DietaryRestriction::Allergies => "allergies",
            DietaryRestriction::Other => "other",
        }
    }

    /// Label written to the spreadsheet.
    pub fn label(&self) -> &'static str {
        match self {
            DietaryRestriction::None => "Sin limitaciones",
            DietaryRestriction::Vegetarian => "Vegetariano",
            DietaryRestriction::Vegan => "Vegano",
            DietaryRestriction::GlutenFree => "Sin gluten (celíaco)",
            DietaryRestriction::LactoseFree => "Sin lactosa",
            DietaryRestriction::Allergies => "Alergias alimentarias",
            DietaryRestriction::Other => "Otras limitaciones",
        }
    }

    /// Free-text details are mandatory for these
    pub fn requires_details(&self) -> bool {
        matches!(self, DietaryRestriction::Allergies | DietaryRestriction::Other)
    }
}

impl fmt::Display for DietaryRestriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDietaryRestriction(pub String);

impl FromStr for DietaryRestriction {
    type Err = UnknownDietaryRestriction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DietaryRestriction::ALL
            .into_iter()
            .find(|d| d.as_str() == s.trim())
            .ok_or_else(|| UnknownDietaryRestriction(s.to_string()))
    }
}

/// A submission that passed validation. Free text is still raw here,
/// sanitization happens when it is turned into a `SheetRecord`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub guest_count: u8,
    pub message: Option<String>,
    pub attend_civil: bool,
    pub attend_lunch: bool,
    pub dietary: DietaryRestriction,
    pub dietary_details: Option<String>,
}

/// Flattened row forwarded to the spreadsheet service. All values are
/// strings because that is what the sheet columns hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRecord {
    #[serde(rename = "Fecha")]
    pub fecha: String,
    #[serde(rename = "Nombre")]
    pub nombre: String,
    #[serde(rename = "Invitados")]
    pub invitados: String,
    #[serde(rename = "Mensaje")]
    pub mensaje: String,
    #[serde(rename = "Asiste_Civil")]
    pub asiste_civil: String,
    #[serde(rename = "Asiste_Almuerzo")]
    pub asiste_almuerzo: String,
    #[serde(rename = "Limitaciones_Gastronomicas")]
    pub limitaciones_gastronomicas: String,
}
