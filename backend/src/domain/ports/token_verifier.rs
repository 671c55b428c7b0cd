//! Port for resolving bearer tokens into caller identities.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::access::CallerIdentity;

/// Errors raised by token verifier adapters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TokenVerifierError {
    /// Verifier backend could not be reached.
    #[error("token verifier connection failed: {message}")]
    Connection {
        /// Connection failure detail.
        message: String,
    },
    /// Lookup failed during execution.
    #[error("token verifier query failed: {message}")]
    Query {
        /// Query failure detail.
        message: String,
    },
    /// The token does not resolve to any user.
    #[error("unknown bearer token")]
    UnknownToken,
    /// The token resolves to a user who may no longer act.
    #[error("token owner is not an active user")]
    InactiveUser,
}

impl TokenVerifierError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for turning a bearer token into an authenticated caller.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Resolve a bearer token. Unknown tokens and tokens owned by
    /// non-active users are rejected.
    async fn verify(&self, token: &str) -> Result<CallerIdentity, TokenVerifierError>;
}

/// Static token table for tests and local development.
#[derive(Debug, Default, Clone)]
pub struct FixtureTokenVerifier {
    identities: HashMap<String, CallerIdentity>,
}

impl FixtureTokenVerifier {
    /// Create an empty verifier that rejects every token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token for the given identity and return `self`.
    #[must_use]
    pub fn with_identity(mut self, token: impl Into<String>, identity: CallerIdentity) -> Self {
        self.identities.insert(token.into(), identity);
        self
    }
}

#[async_trait]
impl TokenVerifier for FixtureTokenVerifier {
    async fn verify(&self, token: &str) -> Result<CallerIdentity, TokenVerifierError> {
        self.identities
            .get(token)
            .cloned()
            .ok_or(TokenVerifierError::UnknownToken)
    }
}
