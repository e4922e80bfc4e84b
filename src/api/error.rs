use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Failures that prevented an operation from getting an answer out of the
/// remote system at all. Rejections by the remote side are reported through
/// [`Outcome::Rejected`] instead.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Credentials unavailable for {system}: {reason}")]
    CredentialsUnavailable { system: String, reason: String },

    #[error("Transport failure talking to {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    pub fn transport(url: &str, source: reqwest::Error) -> Self {
        ClientError::Transport {
            url: url.to_string(),
            source,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Transport { source, .. } if source.is_timeout())
    }
}

/// Maximum length for response bodies kept in rejections and log lines
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Truncate a response body to avoid logging excessive data
pub(crate) fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}

/// Which request the remote system turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Authentication,
    Operation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Authentication => write!(f, "authentication"),
            Stage::Operation => write!(f, "operation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub stage: Stage,
    pub status: StatusCode,
    pub body: String,
}

impl Rejection {
    pub fn from_status(stage: Stage, status: StatusCode, body: &str) -> Self {
        Self {
            stage,
            status,
            body: truncate_body(body),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rejected ({}): {}", self.stage, self.status, self.body)
    }
}

/// Result of an operation that reached the remote system.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Outcome<T> {
    Done(T),
    Rejected(Rejection),
}

impl<T> Outcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }

    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(value) => Some(value),
            Outcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Outcome::Done(_) => None,
            Outcome::Rejected(rejection) => Some(rejection),
        }
    }
}
