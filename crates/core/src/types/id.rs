//! Newtype IDs for type-safe entity references.
//!
//! Letters are addressed by an opaque, URL-safe token ([`LetterId`]) because
//! the token *is* the shareable link. Database-owned rows (images, customers,
//! paid letters) use UUID-backed IDs created via the `define_uuid_id!` macro.

use serde::{Deserialize, Serialize};

const LETTER_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const LETTER_ID_RANDOM_LEN: usize = 6;

/// Opaque identifier for a letter.
///
/// A letter ID is a short lowercase base-36 token combining a random prefix
/// with a time-derived suffix, so concurrently generated IDs do not collide
/// in practice. It is globally unique within the letter store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LetterId(String);

impl LetterId {
    /// Generate a fresh letter ID.
    #[must_use]
    pub fn generate() -> Self {
        use rand::Rng;

        let mut rng = rand::rng();
        let mut token = String::with_capacity(LETTER_ID_RANDOM_LEN + 8);
        for _ in 0..LETTER_ID_RANDOM_LEN {
            let idx = rng.random_range(0..LETTER_ID_ALPHABET.len());
            #[allow(clippy::indexing_slicing)] // idx ranges over the alphabet
            token.push(char::from(LETTER_ID_ALPHABET[idx]));
        }
        token.push_str(&base36(chrono::Utc::now().timestamp_millis()));
        Self(token)
    }

    /// Wrap an existing token (e.g. from a URL path segment).
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the ID and return the inner token.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for LetterId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for LetterId {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for LetterId {
    fn from(token: &str) -> Self {
        Self(token.to_owned())
    }
}

/// Encode a non-negative integer in lowercase base 36.
fn base36(mut value: i64) -> String {
    if value <= 0 {
        return "0".to_owned();
    }
    let mut digits = Vec::new();
    while value > 0 {
        #[allow(
            clippy::cast_sign_loss,
            clippy::cast_possible_truncation,
            clippy::indexing_slicing
        )]
        digits.push(LETTER_ID_ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// Macro to define a type-safe UUID-backed ID wrapper.
///
/// Creates a newtype wrapper around [`uuid::Uuid`] with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `random()`, `as_uuid()`
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use cartinha_core::define_uuid_id;
/// define_uuid_id!(ImageId);
/// define_uuid_id!(CustomerId);
///
/// let image_id = ImageId::random();
/// let customer_id = CustomerId::random();
///
/// // These are different types, so this won't compile:
/// // let _: ImageId = customer_id;
/// ```
#[macro_export]
macro_rules! define_uuid_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Wrap an existing UUID.
            #[must_use]
            pub const fn new(id: ::uuid::Uuid) -> Self {
                Self(id)
            }

            /// Create a fresh random (v4) ID.
            #[must_use]
            pub fn random() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Get the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> ::uuid::Uuid {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<::uuid::Uuid> for $name {
            fn from(id: ::uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for ::uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <::uuid::Uuid as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <::uuid::Uuid as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <::uuid::Uuid as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <::uuid::Uuid as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

// Define standard entity IDs
define_uuid_id!(ImageId);
define_uuid_id!(CustomerId);
define_uuid_id!(PaymentId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_id_is_lowercase_base36() {
        let id = LetterId::generate();
        assert!(id.as_str().len() >= LETTER_ID_RANDOM_LEN);
        assert!(
            id.as_str()
                .bytes()
                .all(|b| LETTER_ID_ALPHABET.contains(&b))
        );
    }

    #[test]
    fn test_letter_ids_are_distinct() {
        let a = LetterId::generate();
        let b = LetterId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_letter_id_round_trips_through_string() {
        let id = LetterId::new("abc123xyz");
        assert_eq!(id.as_str(), "abc123xyz");
        assert_eq!(id.to_string(), "abc123xyz");
        assert_eq!(LetterId::from("abc123xyz"), id);
    }

    #[test]
    fn test_base36_encoding() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "z");
        assert_eq!(base36(36), "10");
        assert_eq!(base36(36 * 36), "100");
    }

    #[test]
    fn test_uuid_ids_are_distinct_types() {
        let image_id = ImageId::random();
        let json = serde_json::to_string(&image_id).unwrap_or_default();
        // serde(transparent): serializes as a bare UUID string
        assert!(json.starts_with('"'));
    }
}
