//! Error type shared by every facade.

use std::collections::BTreeMap;

use thiserror::Error;

/// Errors returned by the Souk REST API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connection refused, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with an error.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The token is missing, expired or revoked.
    #[error("{0}")]
    Unauthorized(String),

    /// The resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The backend rejected the submitted fields.
    #[error("{message}")]
    Validation {
        message: String,
        fields: BTreeMap<String, Vec<String>>,
    },

    /// The response body did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// `SOUK_API_URL` is not a usable base URL.
    #[error("Invalid API base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Message used when the backend did not provide one.
    #[must_use]
    pub fn generic_message(status: u16) -> String {
        format!("Request failed with status {status}")
    }

    /// Whether the session should be considered dead.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// HTTP status reported by the backend, if the request reached it.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Unauthorized(_) => Some(401),
            Self::NotFound(_) => Some(404),
            Self::Validation { .. } => Some(422),
            Self::Http(_) | Self::Decode(_) | Self::BaseUrl(_) => None,
        }
    }

    /// Text safe to show to end users.
    ///
    /// Backend messages are passed through; transport and decoding details
    /// stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } | Self::Unauthorized(message) | Self::NotFound(message) => {
                message.clone()
            }
            Self::Validation { message, fields } => fields
                .values()
                .flatten()
                .next()
                .map_or_else(|| message.clone(), Clone::clone),
            Self::Http(e) if e.is_timeout() => {
                "Le service met trop de temps à répondre, veuillez réessayer.".to_string()
            }
            Self::Http(_) => "Le service est momentanément indisponible.".to_string(),
            Self::Decode(_) | Self::BaseUrl(_) => "Réponse inattendue du serveur.".to_string(),
        }
    }

    /// First error reported for `field` by a validation failure.
    #[must_use]
    pub fn field_error(&self, field: &str) -> Option<&str> {
        match self {
            Self::Validation { fields, .. } => fields
                .get(field)
                .and_then(|errors| errors.first())
                .map(String::as_str),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_message() {
        assert_eq!(ApiError::generic_message(503), "Request failed with status 503");
    }

    #[test]
    fn test_validation_user_message_prefers_field_error() {
        let err = ApiError::Validation {
            message: "The given data was invalid.".to_string(),
            fields: BTreeMap::from([(
                "name".to_string(),
                vec!["Le nom est obligatoire.".to_string()],
            )]),
        };
        assert_eq!(err.user_message(), "Le nom est obligatoire.");
        assert_eq!(err.field_error("name"), Some("Le nom est obligatoire."));
        assert_eq!(err.field_error("price"), None);
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn test_decode_error_is_hidden_from_users() {
        let err = ApiError::Decode("missing field `id`".to_string());
        assert!(!err.user_message().contains("id"));
    }
}
