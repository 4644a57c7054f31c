//! Core types for Souk.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod reason;
pub mod role;
pub mod standing;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::Money;
pub use reason::{Reason, ReasonError};
pub use role::Role;
pub use standing::VendorStanding;
pub use status::*;
