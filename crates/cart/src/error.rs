//! Unified error handling with Sentry integration.
//!
//! Only [`CartError::NotInitialized`] is ever returned to cart consumers.
//! Storage and snapshot failures are isolated: they are logged, captured to
//! Sentry via [`report`], and the in-memory cart stays authoritative.

use thiserror::Error;

use crate::storage::StorageError;

/// Cart-level error type.
#[derive(Debug, Error)]
pub enum CartError {
    /// The cart was used outside an active [`CartProvider`](crate::CartProvider).
    #[error("Cart not initialized: used outside its provider scope")]
    NotInitialized,

    /// The key-value store failed to read or write.
    #[error("Storage error: {0}")]
    Persistence(#[from] StorageError),

    /// The persisted snapshot is not valid JSON for a list of cart lines.
    #[error("Failed to decode cart snapshot: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The cart could not be encoded for storage.
    #[error("Failed to encode cart snapshot: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The snapshot decoded but breaks a cart invariant.
    #[error("Invalid cart snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

/// Capture an isolated failure to Sentry and log it.
///
/// Does nothing beyond logging when Sentry has not been initialized.
pub fn report(err: &CartError) {
    let event_id = sentry::capture_error(err);
    match err {
        CartError::Deserialization(_) | CartError::InvalidSnapshot(_) => {
            tracing::warn!(error = %err, sentry_event_id = %event_id, "Cart snapshot discarded");
        }
        _ => {
            tracing::error!(error = %err, sentry_event_id = %event_id, "Cart persistence error");
        }
    }
}

/// Add a breadcrumb for a cart action.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of cart
/// changes leading up to a persistence failure.
pub fn add_breadcrumb(action: &str, product_id: &str) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some("cart".to_string()),
        message: Some(action.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };
    breadcrumb.data.insert(
        "product_id".to_string(),
        serde_json::Value::String(product_id.to_string()),
    );

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        let err = CartError::NotInitialized;
        assert_eq!(
            err.to_string(),
            "Cart not initialized: used outside its provider scope"
        );

        let err = CartError::InvalidSnapshot("duplicate id p1".to_string());
        assert_eq!(err.to_string(), "Invalid cart snapshot: duplicate id p1");
    }

    #[test]
    fn test_storage_error_converts() {
        let err: CartError = StorageError::Unavailable("offline".to_string()).into();
        assert!(matches!(err, CartError::Persistence(_)));
        assert_eq!(err.to_string(), "Storage error: Storage unavailable: offline");
    }

    #[test]
    fn test_report_without_sentry_does_not_panic() {
        report(&CartError::Persistence(StorageError::Unavailable(
            "offline".to_string(),
        )));
        add_breadcrumb("increment", "p1");
    }
}
