//! Services shared by the route handlers.
//!
//! - `catalog` - cached public catalog reads
//! - `images` - product image compression

pub mod catalog;
pub mod images;

pub use catalog::Catalog;
