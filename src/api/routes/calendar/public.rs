//! Public types for the calendar API
use serde::Deserialize;

/// Which events to put in the downloaded file
#[derive(Deserialize, Debug, Default)]
pub struct CalendarQuery {
    #[serde(default)]
    pub civil: bool,
    #[serde(default)]
    pub lunch: bool,
}
