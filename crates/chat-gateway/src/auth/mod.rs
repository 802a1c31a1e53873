//! Connection admission
//!
//! JWT validation with a revocation check.

mod error;
mod gate;

pub use error::AuthError;
pub use gate::AuthGate;
