//! inventory-sync - push inventory data to ERP and eCommerce systems.
//!
//! One `SystemClient` implementation talks to any external system described
//! by a `SystemConfig`: it authenticates with stored credentials for a
//! fresh bearer token, then sends, fetches or updates records.

pub mod api;
pub mod auth;
pub mod config;
pub mod logging;
pub mod models;
pub mod utils;

pub use api::{ClientError, Outcome, Rejection, Stage, SystemClient};
pub use config::{Config, SystemConfig};
