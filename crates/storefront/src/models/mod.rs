//! Session-held state for the storefront.

pub mod cart;
pub mod session;

pub use cart::{Cart, CartLine};
pub use session::{Flash, FlashKind, PaymentCodePanel, SessionUser, keys as session_keys};
