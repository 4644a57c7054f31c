//! Souk Core - Shared types library.
//!
//! This crate provides the types shared by every Souk component:
//! - `souk-api` - Typed client for the Souk REST backend
//! - `storefront` - Customer shop, vendor dashboard and partner portal
//! - `admin` - Back-office console (vendor approval, payment oversight)
//! - `cli` - Session migrations and image tooling
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP clients,
//! no session access. Everything here can be unit tested without a runtime.
//!
//! # Modules
//!
//! - [`types`] - IDs, roles, statuses, money, validated reasons, emails
//! - [`pagination`] - Page envelopes, list queries and page links
//! - [`list_view`] - Generation-tracked state for paginated list pages
//! - [`guard`] - Role-gated area access decisions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod guard;
pub mod list_view;
pub mod pagination;
pub mod types;

pub use guard::{AdminArea, Area, ClientArea, GuardOutcome, PartnerArea, SessionResolution, VendorArea};
pub use list_view::{FetchGenerations, FetchTicket, FetchTurn, ListState, ListView};
pub use pagination::{ListQuery, PageLinks, PageMeta, Paginated};
pub use types::*;
