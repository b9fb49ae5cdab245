pub mod public;
mod router;
pub use router::{health_check, router};
