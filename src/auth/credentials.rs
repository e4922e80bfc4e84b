use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Keychain service name all stored credentials live under
const SERVICE_NAME: &str = "inventory-sync";

/// Which identity fields a system expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialShape {
    /// `{"username": .., "password": ..}`
    UserPassword,
    /// `{"api_key": .., "secret_key": ..}`
    ApiKey,
}

#[derive(Deserialize)]
struct UserPasswordFields {
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct ApiKeyFields {
    api_key: String,
    secret_key: String,
}

#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    UserPassword { username: String, password: String },
    ApiKey { api_key: String, secret_key: String },
}

impl Credentials {
    /// Parse a credentials JSON document of the given shape.
    /// Extra fields are ignored; missing or non-string fields are an error.
    pub fn parse(shape: CredentialShape, contents: &str) -> Result<Self> {
        match shape {
            CredentialShape::UserPassword => {
                let fields: UserPasswordFields = serde_json::from_str(contents)
                    .context("Expected a JSON object with \"username\" and \"password\"")?;
                Ok(Credentials::UserPassword {
                    username: fields.username,
                    password: fields.password,
                })
            }
            CredentialShape::ApiKey => {
                let fields: ApiKeyFields = serde_json::from_str(contents)
                    .context("Expected a JSON object with \"api_key\" and \"secret_key\"")?;
                Ok(Credentials::ApiKey {
                    api_key: fields.api_key,
                    secret_key: fields.secret_key,
                })
            }
        }
    }

    /// JSON body sent to the authentication endpoint
    pub fn auth_body(&self) -> Value {
        match self {
            Credentials::UserPassword { username, password } => json!({
                "username": username,
                "password": password,
            }),
            Credentials::ApiKey { api_key, secret_key } => json!({
                "api_key": api_key,
                "secret_key": secret_key,
            }),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::UserPassword { username, .. } => f
                .debug_struct("UserPassword")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credentials::ApiKey { .. } => f
                .debug_struct("ApiKey")
                .field("api_key", &"<redacted>")
                .field("secret_key", &"<redacted>")
                .finish(),
        }
    }
}

/// Where a system's credentials are read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CredentialSource {
    File { path: PathBuf },
    Keyring { account: String },
}

impl CredentialSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        CredentialSource::File { path: path.into() }
    }

    /// Read and parse the credentials. Called once per authentication attempt.
    pub fn load(&self, shape: CredentialShape) -> Result<Credentials> {
        match self {
            CredentialSource::File { path } => load_file(path, shape),
            CredentialSource::Keyring { account } => {
                if !CredentialStore::has_credentials(account) {
                    bail!(
                        "No credentials stored in keychain entry {} (run `inventory-sync credentials store`)",
                        account
                    );
                }
                let contents = CredentialStore::load(account)?;
                Credentials::parse(shape, &contents)
                    .with_context(|| format!("Malformed credentials in keychain entry {}", account))
            }
        }
    }
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::File { path } => write!(f, "file {}", path.display()),
            CredentialSource::Keyring { account } => write!(f, "keychain entry {}", account),
        }
    }
}

fn load_file(path: &Path, shape: CredentialShape) -> Result<Credentials> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read credentials file {}", path.display()))?;
    Credentials::parse(shape, &contents)
        .with_context(|| format!("Failed to parse credentials file {}", path.display()))
}

/// Credential documents kept in the OS keychain, one entry per account.
pub struct CredentialStore;

impl CredentialStore {
    /// Store a credentials JSON document in the OS keychain
    pub fn store(account: &str, contents: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, account)
            .context("Failed to create keyring entry")?;
        entry
            .set_password(contents)
            .context("Failed to store credentials in keychain")?;
        Ok(())
    }

    /// Retrieve the credentials JSON document for an account
    pub fn load(account: &str) -> Result<String> {
        let entry = Entry::new(SERVICE_NAME, account)
            .context("Failed to create keyring entry")?;
        entry
            .get_password()
            .context("Failed to retrieve credentials from keychain")
    }

    /// Remove the entry for an account
    pub fn delete(account: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, account)
            .context("Failed to create keyring entry")?;
        entry
            .delete_credential()
            .context("Failed to delete credentials from keychain")?;
        Ok(())
    }

    pub fn has_credentials(account: &str) -> bool {
        if let Ok(entry) = Entry::new(SERVICE_NAME, account) {
            entry.get_password().is_ok()
        } else {
            false
        }
    }
}
