//! Identity reference handed over by the identity provider.
//!
//! A reference pairs the subject's PINFL with the access credential used to
//! call the report sources. Both parts are validated on construction; input
//! is never normalized, so `"1234 5678 9012 34"` is rejected rather than
//! stripped down to digits.

use crate::errors::AppError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static PINFL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{14}$").expect("PINFL pattern is a valid regex"));

/// 14-digit personal identifier, used as the report storage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pinfl(String);

impl Pinfl {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        if !PINFL_PATTERN.is_match(raw) {
            tracing::warn!("❌ Rejected malformed PINFL ({} chars)", raw.chars().count());
            return Err(AppError::ValidationError(
                "PINFL must be exactly 14 digits".to_string(),
            ));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pinfl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Subject identifier plus access credential.
#[derive(Clone)]
pub struct IdentityReference {
    access_token: String,
    pinfl: Pinfl,
}

impl IdentityReference {
    /// Validates both parts of the reference.
    ///
    /// # Errors
    ///
    /// * `AppError::ValidationError` - The credential is empty or the PINFL is not 14 digits.
    pub fn new(access_token: &str, pinfl: &str) -> Result<Self, AppError> {
        if access_token.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Access token cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            access_token: access_token.to_string(),
            pinfl: Pinfl::parse(pinfl)?,
        })
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn pinfl(&self) -> &Pinfl {
        &self.pinfl
    }
}

// Credential stays out of logs.
impl fmt::Debug for IdentityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityReference")
            .field("access_token", &"[REDACTED]")
            .field("pinfl", &self.pinfl)
            .finish()
    }
}
