//! Record identifiers
//!
//! Every record owned by the engine is keyed by a UUIDv7. UUIDv7 values sort
//! chronologically, which keeps insertion order stable for tie-breaking in
//! listings and lets ids be generated without a round trip to storage.

use std::fmt;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u128);

        impl $name {
            /// Generate a new UUIDv7-based identifier
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7().as_u128())
            }

            /// Create an identifier from a raw u128 value
            ///
            /// This is primarily for storage layer deserialization.
            pub fn from_value(value: u128) -> Self {
                Self(value)
            }

            /// Parse an identifier from its hyphenated UUID form
            pub fn from_string(s: &str) -> Result<Self, String> {
                uuid::Uuid::parse_str(s.trim())
                    .map(|u| Self(u.as_u128()))
                    .map_err(|e| format!("Invalid {} '{}': {}", stringify!($name), s, e))
            }

            /// Get the raw u128 value
            pub fn value(&self) -> u128 {
                self.0
            }

            /// Big-endian bytes, the form used for BLOB storage
            pub fn to_bytes(&self) -> [u8; 16] {
                self.0.to_be_bytes()
            }

            /// Rebuild an identifier from its stored bytes
            pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
                let arr: [u8; 16] = bytes.try_into().map_err(|_| {
                    format!("Expected 16 bytes for {}, got {}", stringify!($name), bytes.len())
                })?;
                Ok(Self(u128::from_be_bytes(arr)))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", uuid::Uuid::from_u128(self.0))
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_string(s)
            }
        }
    };
}

record_id!(
    /// Identifier of a customer record
    CustomerId
);

record_id!(
    /// Identifier of the person profile linked to a customer
    PersonId
);

record_id!(
    /// Identifier of a customs-clearance folder
    FolderId
);

record_id!(
    /// Identifier of a declaration (milestone) record
    DeclarationId
);

record_id!(
    /// Identifier of an expense booked against a folder
    ExpenseId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_chronological() {
        let first = FolderId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = FolderId::new();
        assert!(first < second);
    }

    #[test]
    fn test_display_and_parse() {
        let id = CustomerId::new();
        let text = id.to_string();
        assert_eq!(text.len(), 36);
        assert_eq!(CustomerId::from_string(&text).unwrap(), id);
        assert_eq!(text.parse::<CustomerId>().unwrap(), id);
    }

    #[test]
    fn test_invalid_string() {
        assert!(FolderId::from_string("F-2024-001").is_err());
        assert!(FolderId::from_string("").is_err());
    }

    #[test]
    fn test_bytes() {
        let id = DeclarationId::from_value(42);
        assert_eq!(DeclarationId::from_bytes(&id.to_bytes()).unwrap(), id);
        assert!(DeclarationId::from_bytes(&[0u8; 3]).is_err());
    }
}
