//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. IDs are opaque
//! strings handed out by the catalog and must stay stable across sessions,
//! since persisted carts are keyed by them.

/// Errors that can occur when parsing an ID.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The input string is empty or only whitespace.
    #[error("id cannot be empty")]
    Empty,
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` (transparent, rejecting empty strings)
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `parse()`, `as_str()`, `into_inner()`
/// - `FromStr`, `Display`, `AsRef<str>` and `TryFrom<String>` implementations
///
/// # Example
///
/// ```rust
/// # use go_marketplace_core::define_id;
/// define_id!(SkuId);
/// define_id!(VendorId);
///
/// let sku = SkuId::parse("sku-1").unwrap();
/// let vendor = VendorId::parse("sku-1").unwrap();
///
/// // These are different types, so this won't compile:
/// // let _: SkuId = vendor;
/// # let _ = (sku, vendor);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse an ID, rejecting empty or blank input.
            ///
            /// # Errors
            ///
            /// Returns `IdError::Empty` if the input is blank.
            pub fn parse(id: impl Into<String>) -> ::core::result::Result<Self, $crate::IdError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err($crate::IdError::Empty);
                }
                Ok(Self(id))
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl ::core::convert::TryFrom<String> for $name {
            type Error = $crate::IdError;

            fn try_from(id: String) -> ::core::result::Result<Self, Self::Error> {
                Self::parse(id)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let id = ProductId::parse("p1").unwrap();
        assert_eq!(id.as_str(), "p1");
        assert_eq!(id.to_string(), "p1");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(ProductId::parse(""), Err(IdError::Empty));
        assert_eq!(ProductId::parse("   "), Err(IdError::Empty));
    }

    #[test]
    fn test_serde_transparent() {
        let id: ProductId = "abc-123".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc-123\"");

        let parsed: ProductId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_deserialize_rejects_empty() {
        assert!(serde_json::from_str::<ProductId>("\"\"").is_err());
    }
}
