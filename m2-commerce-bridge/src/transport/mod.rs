//! Transport abstraction over the platform's REST API.
//!
//! The bridge talks to the platform through three calls: `get` (optionally with search
//! criteria), `post` and `put`, all exchanging JSON. [`HttpTransport`] is the production
//! implementation; tests supply scripted implementations of [`Transport`].
//!
//! Paths are relative to the REST root (`/orders`, `/products/MB01`); the transport
//! owns the base URL, the store code and authentication.
//!
//! # Examples
//!
//! ```rust,no_run
//! use m2_commerce_bridge::{
//!     config::BridgeConfig,
//!     criteria::{ConditionType, SearchCriteria},
//!     transport::{HttpTransport, Transport},
//! };
//!
//! # async fn example() -> m2_commerce_bridge::error::Result<()> {
//! let config = BridgeConfig::new("https://shop.example.com");
//! let transport = HttpTransport::new(&config)?;
//!
//! let criteria = SearchCriteria::single("sku", "MB01", ConditionType::Eq);
//! let products = transport.get("/products", Some(&criteria)).await?;
//! println!("{products}");
//! # Ok(())
//! # }
//! ```

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;

use serde_json::Value;
use url::Url;

use crate::{
    criteria::SearchCriteria,
    error::{BridgeError, Result},
};

pub mod config;
pub mod http;

pub use config::{HttpConfig, HttpVersion};
pub use http::HttpTransport;

/// JSON transport to the platform.
///
/// Implementations map failures onto [`BridgeError`]: a non-success status becomes
/// [`BridgeError::Transport`], an exceeded deadline [`BridgeError::Timeout`]. An empty
/// success body is returned as [`Value::Null`].
pub trait Transport: Send + Sync {
    /// Executes a GET request, appending encoded search criteria when given.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the platform answers with a failure.
    fn get<'a>(
        &'a self,
        path: &'a str,
        criteria: Option<&'a SearchCriteria>,
    ) -> impl Future<Output = Result<Value>> + Send + 'a;

    /// Executes a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the platform answers with a failure.
    fn post<'a>(
        &'a self,
        path: &'a str,
        body: &'a Value,
    ) -> impl Future<Output = Result<Value>> + Send + 'a;

    /// Executes a PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the platform answers with a failure.
    fn put<'a>(
        &'a self,
        path: &'a str,
        body: &'a Value,
    ) -> impl Future<Output = Result<Value>> + Send + 'a;
}

/// Joins path segments, percent-encoding each one.
///
/// SKUs may contain `/`, spaces or `#`; encoding keeps them inside a single segment.
///
/// # Errors
///
/// Returns [`BridgeError::InvalidInput`] when a segment is empty.
///
/// # Examples
///
/// ```
/// use m2_commerce_bridge::transport::encode_path;
///
/// let path = encode_path(&["configurable-products", "MH01 Black/XL", "children"])?;
/// assert_eq!(path, "/configurable-products/MH01%20Black%2FXL/children");
/// # Ok::<(), m2_commerce_bridge::error::BridgeError>(())
/// ```
pub fn encode_path(segments: &[&str]) -> Result<String> {
    if let Some(position) = segments.iter().position(|s| s.trim().is_empty()) {
        return Err(BridgeError::InvalidInput(format!("empty path segment at position {position}")));
    }

    let mut url = Url::parse("https://platform.invalid/")
        .map_err(|e| BridgeError::InvalidInput(format!("cannot build path: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| BridgeError::InvalidInput("cannot build path".to_owned()))?
        .clear()
        .extend(segments);
    Ok(url.path().to_owned())
}

/// Rejects paths that could escape the REST root.
pub(crate) fn sanitize_path(path: &str) -> Result<&str> {
    let raw = path.split('?').next().unwrap_or_default();
    if raw.contains("..") || raw.contains("//") {
        return Err(BridgeError::InvalidInput(
            "invalid path: traversal sequences not allowed".to_owned(),
        ));
    }
    if !raw.starts_with('/') {
        return Err(BridgeError::InvalidInput(format!("path must start with '/': {path}")));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_path_plain() {
        assert_eq!(encode_path(&["orders", "12", "cancel"]).unwrap(), "/orders/12/cancel");
    }

    #[test]
    fn test_encode_path_escapes_reserved_characters() {
        assert_eq!(encode_path(&["stockItems", "24-MB01/A#1"]).unwrap(), "/stockItems/24-MB01%2FA%231");
    }

    #[test]
    fn test_encode_path_rejects_empty_segment() {
        assert!(matches!(encode_path(&["orders", ""]), Err(BridgeError::InvalidInput(_))));
        assert!(matches!(encode_path(&["orders", " "]), Err(BridgeError::InvalidInput(_))));
    }

    #[test]
    fn test_sanitize_path() {
        assert!(sanitize_path("/orders").is_ok());
        assert!(sanitize_path("/orders?searchCriteria%5BpageSize%5D=10").is_ok());
        assert!(sanitize_path("/orders/../admin").is_err());
        assert!(sanitize_path("//evil.example.com").is_err());
        assert!(sanitize_path("orders").is_err());
    }
}
