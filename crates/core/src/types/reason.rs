//! Free-text justification for reason-bearing actions (reject, suspend).

use serde::Serialize;

/// Errors produced when validating a [`Reason`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReasonError {
    /// Nothing but whitespace was submitted.
    #[error("Veuillez indiquer un motif")]
    Empty,
    /// The text exceeds the accepted length.
    #[error("Le motif ne peut pas dépasser {max} caractères")]
    TooLong {
        /// Maximum number of characters.
        max: usize,
    },
}

/// A trimmed, non-empty justification.
///
/// Facade methods for reject/suspend take `&Reason`, so an empty or
/// whitespace-only justification cannot reach the network layer.
///
/// ```
/// use souk_core::Reason;
///
/// let reason = Reason::parse("  Documents incomplets ").unwrap();
/// assert_eq!(reason.as_str(), "Documents incomplets");
/// assert!(Reason::parse(" \n\t ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Reason(String);

impl Reason {
    /// Maximum accepted length, in characters.
    pub const MAX_CHARS: usize = 1000;

    /// Validate user input.
    ///
    /// # Errors
    ///
    /// Returns [`ReasonError::Empty`] for empty or whitespace-only input and
    /// [`ReasonError::TooLong`] past [`Reason::MAX_CHARS`] characters.
    pub fn parse(input: &str) -> Result<Self, ReasonError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ReasonError::Empty);
        }
        if trimmed.chars().count() > Self::MAX_CHARS {
            return Err(ReasonError::TooLong {
                max: Self::MAX_CHARS,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The validated text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
