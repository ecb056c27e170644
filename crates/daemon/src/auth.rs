// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JWT bearer-token access control.
//!
//! A token's claims whitelist path prefixes together with the modes they
//! grant. A request is allowed when any whitelisted prefix covers the
//! request path with the required mode.

use icepeak_core::Path;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Access required by an operation: `GET` and subscriptions need `Read`,
/// `PUT` and `DELETE` need `Write`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    Read,
    Write,
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessMode::Read => write!(f, "read"),
            AccessMode::Write => write!(f, "write"),
        }
    }
}

/// One whitelist entry: a path prefix and the modes granted at or below it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathPermission {
    pub prefix: Vec<String>,
    pub modes: Vec<AccessMode>,
}

/// Claim set carried by Icepeak tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub whitelist: Vec<PathPermission>,
    /// Expiry, seconds since the epoch. Validated on decode.
    pub exp: u64,
}

impl Claims {
    /// True when any whitelisted prefix covers `path` with `mode`.
    pub fn allows(&self, path: &Path, mode: AccessMode) -> bool {
        self.whitelist
            .iter()
            .any(|permission| permission.modes.contains(&mode) && path.starts_with(&permission.prefix))
    }
}

/// Authorization failures, split by response status.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No token where one is required (401).
    #[error("missing bearer token")]
    MissingToken,

    /// Undecodable, tampered, or expired token (401).
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    /// Valid token without a covering grant (403).
    #[error("token does not grant {mode} access to {path}")]
    Forbidden { path: Path, mode: AccessMode },
}

/// Secret for HS256 token verification.
pub struct AuthConfig {
    key: DecodingKey,
    validation: Validation,
}

impl AuthConfig {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Decode and validate a token, checking signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(data.claims)
    }

    /// Full check for a request: token present, valid, and covering.
    pub fn authorize(
        &self,
        token: Option<&str>,
        path: &Path,
        mode: AccessMode,
    ) -> Result<(), AuthError> {
        let claims = self.verify(token.ok_or(AuthError::MissingToken)?)?;
        if claims.allows(path, mode) {
            Ok(())
        } else {
            Err(AuthError::Forbidden { path: path.clone(), mode })
        }
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
