//! REST client module for external ERP and eCommerce systems.
//!
//! This module provides the `SystemClient`, one implementation configured
//! per system, for pushing inventory data, fetching records and updating
//! order status.
//!
//! Failures come in two tiers: a `ClientError` when the remote system could
//! not be asked at all, and an `Outcome::Rejected` when it said no.

pub mod client;
pub mod error;

pub use client::SystemClient;
pub use error::{ClientError, Outcome, Rejection, Stage};
