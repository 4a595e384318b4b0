//! bsync-domain
//!
//! Entity shapes exchanged with the budget REST service (Budget, Income, Outcome).
//! No I/O, no transport, no store. Only data types and the traits the core is generic over.

pub mod budget;
pub mod common;
pub mod income_outcome;

pub use budget::*;
pub use common::*;
pub use income_outcome::*;
