//! Credentials and bearer tokens for external systems.
//!
//! This module provides:
//! - `Credentials`: username/password or API key pairs, parsed by shape
//! - `CredentialSource`: a JSON file on disk or an OS keychain entry
//! - `CredentialStore`: keychain access via keyring
//! - `AuthToken`: a single-use bearer token
//!
//! Tokens are never persisted; every operation authenticates afresh.

pub mod credentials;
pub mod token;

pub use credentials::{CredentialShape, CredentialSource, CredentialStore, Credentials};
pub use token::AuthToken;
