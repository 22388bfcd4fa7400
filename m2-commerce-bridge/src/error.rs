//! Error types for the commerce bridge.
//!
//! This module defines all error types that can occur while translating canonical
//! commerce operations into native platform calls. All errors implement the standard
//! [`std::error::Error`] trait via [`thiserror::Error`].
//!
//! # Error Categories
//!
//! - **Transport Errors** ([`BridgeError::Transport`], [`BridgeError::Timeout`],
//!   [`BridgeError::HttpError`]): the platform answered with a failure or never answered
//! - **Validation Errors** ([`BridgeError::Validation`], [`BridgeError::InvalidInput`]):
//!   caller input rejected before any transport call
//! - **Protocol Errors** ([`BridgeError::Response`]): the platform answered with a payload
//!   that cannot be decoded
//! - **Configuration Errors** ([`BridgeError::ConfigError`])
//!
//! Capability absence (a `404`/`403` on a feature-specific resource) is not a separate
//! variant: it is the subset of [`BridgeError::Transport`] for which
//! [`BridgeError::is_capability_absent`] returns `true`.
//!
//! # Examples
//!
//! ```
//! use m2_commerce_bridge::error::{BridgeError, Result};
//!
//! fn require_skus(skus: &[String]) -> Result<()> {
//!     if skus.is_empty() {
//!         return Err(BridgeError::Validation("at least one SKU is required".to_owned()));
//!     }
//!     Ok(())
//! }
//!
//! assert!(require_skus(&[]).is_err());
//! ```

use std::fmt;

use thiserror::Error;

/// Result type alias for bridge operations.
///
/// All fallible functions in this crate return this type.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// HTTP method of a transport call, carried in transport errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
}

impl HttpMethod {
    /// Returns the method name as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur in the commerce bridge.
///
/// The error messages are user-facing: the operation boundary copies them verbatim into
/// the `error` field of a failure envelope.
///
/// # Error Recovery
///
/// - **Transport errors** ([`Transport`](Self::Transport)): inspect the status hint;
///   authentication and permission problems need configuration changes
/// - **Timeouts** ([`Timeout`](Self::Timeout)): retry later or raise `http.timeout_secs`
/// - **Validation errors** ([`Validation`](Self::Validation),
///   [`InvalidInput`](Self::InvalidInput)): fix input and retry
/// - **Protocol errors** ([`Response`](Self::Response)): the platform returned an
///   unexpected shape; check the platform version
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The platform answered with a non-success status.
    ///
    /// `message` is the `message` field of a structured JSON body (with its placeholders
    /// filled in) or the raw body text otherwise.
    #[error("{method} {endpoint} failed with status {status}: {message}{}", status_hint(.status))]
    Transport {
        /// HTTP status code.
        status: u16,
        /// Request method.
        method: HttpMethod,
        /// Request path relative to the REST prefix.
        endpoint: String,
        /// Extracted failure message.
        message: String,
    },

    /// A transport call exceeded its configured deadline.
    #[error("{method} {endpoint} timed out")]
    Timeout {
        /// Request method.
        method: HttpMethod,
        /// Request path relative to the REST prefix.
        endpoint: String,
    },

    /// Connection-level HTTP failure (DNS, TLS, refused connection).
    ///
    /// This error wraps [`reqwest::Error`].
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// An operation precondition failed before any transport call was attempted.
    ///
    /// # Examples
    ///
    /// ```
    /// use m2_commerce_bridge::error::BridgeError;
    ///
    /// let err = BridgeError::Validation("skus must not be empty".to_owned());
    /// assert_eq!(err.to_string(), "Validation failed: skus must not be empty");
    /// ```
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Operation parameters could not be interpreted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be parsed or failed validation.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The platform answered successfully but the payload could not be decoded.
    #[error("Invalid platform response: {0}")]
    Response(String),
}

impl BridgeError {
    /// Returns `true` when the error signals that a platform feature is missing or not
    /// authorized on this deployment (status `404` or `403`).
    ///
    /// Only these failures trigger a fallback to a legacy resource; everything else is a
    /// genuine error.
    ///
    /// # Examples
    ///
    /// ```
    /// use m2_commerce_bridge::error::{BridgeError, HttpMethod};
    ///
    /// let missing = BridgeError::Transport {
    ///     status: 404,
    ///     method: HttpMethod::Get,
    ///     endpoint: "/returns".to_owned(),
    ///     message: "Request does not match any route.".to_owned(),
    /// };
    /// assert!(missing.is_capability_absent());
    ///
    /// let broken = BridgeError::Transport {
    ///     status: 500,
    ///     method: HttpMethod::Get,
    ///     endpoint: "/returns".to_owned(),
    ///     message: "Internal Error".to_owned(),
    /// };
    /// assert!(!broken.is_capability_absent());
    /// ```
    #[must_use]
    pub fn is_capability_absent(&self) -> bool {
        matches!(self, Self::Transport { status: 403 | 404, .. })
    }

    /// Returns the HTTP status for transport errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            Self::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Human hint appended to transport error messages for known status classes.
#[allow(clippy::trivially_copy_pass_by_ref, reason = "called from the thiserror format args")]
fn status_hint(status: &u16) -> &'static str {
    match *status {
        401 => " (authentication failed: check the access token)",
        403 => " (forbidden: the token lacks permission or the feature is disabled)",
        404 => " (not found: the resource or endpoint does not exist on this deployment)",
        429 => " (rate limited: slow down and retry later)",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(status: u16) -> BridgeError {
        BridgeError::Transport {
            status,
            method: HttpMethod::Get,
            endpoint: "/returns".to_owned(),
            message: "boom".to_owned(),
        }
    }

    #[test]
    fn test_transport_error_display_with_hint() {
        let error = transport(404);
        assert_eq!(
            error.to_string(),
            "GET /returns failed with status 404: boom (not found: the resource or endpoint \
             does not exist on this deployment)"
        );
    }

    #[test]
    fn test_transport_error_display_without_hint() {
        let error = transport(500);
        assert_eq!(error.to_string(), "GET /returns failed with status 500: boom");
    }

    #[test]
    fn test_auth_and_rate_limit_hints() {
        assert!(transport(401).to_string().contains("authentication failed"));
        assert!(transport(429).to_string().contains("rate limited"));
    }

    #[test]
    fn test_capability_absent_classification() {
        assert!(transport(404).is_capability_absent());
        assert!(transport(403).is_capability_absent());
        assert!(!transport(400).is_capability_absent());
        assert!(!transport(401).is_capability_absent());
        assert!(!transport(429).is_capability_absent());
        assert!(!transport(503).is_capability_absent());
        assert!(
            !BridgeError::Timeout { method: HttpMethod::Post, endpoint: "/returns".to_owned() }
                .is_capability_absent()
        );
        assert!(!BridgeError::Validation("x".to_owned()).is_capability_absent());
    }

    #[test]
    fn test_timeout_display() {
        let error = BridgeError::Timeout { method: HttpMethod::Put, endpoint: "/orders/1".to_owned() };
        assert_eq!(error.to_string(), "PUT /orders/1 timed out");
    }

    #[test]
    fn test_status_accessor() {
        assert_eq!(transport(403).status(), Some(403));
        assert_eq!(BridgeError::InvalidInput("bad".to_owned()).status(), None);
    }

    #[test]
    fn test_http_method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Post.as_str(), "POST");
        assert_eq!(HttpMethod::Put.as_str(), "PUT");
    }
}
