pub mod error;
pub mod models;
pub mod pending;
pub mod rate_limit;
pub mod sanitize;
pub mod service;
pub mod sheet;
pub mod validate;

pub use error::RsvpError;
pub use models::*;
pub use service::{Outcome, Receipt, RsvpService};
