//! Session-held state for the admin console.

pub mod session;

pub use session::{CurrentAdmin, Flash, FlashKind, keys as session_keys};
