//! Opaque cursor pagination primitives.
//!
//! List endpoints hand clients an opaque continuation token instead of
//! exposing keyset internals. The token is the URL-safe base64 encoding of a
//! JSON document supplied by the endpoint; clients must treat it as a black
//! box and echo it back unchanged.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Errors raised while encoding or decoding cursors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    /// The cursor is not valid base64 or does not decode to UTF-8.
    #[error("cursor is not a valid continuation token")]
    Malformed,
    /// The decoded payload does not match the expected token shape.
    #[error("cursor payload does not match the expected shape")]
    UnexpectedShape,
    /// The token could not be serialised.
    #[error("cursor token could not be encoded: {message}")]
    Encode {
        /// Serialisation failure detail.
        message: String,
    },
}

/// Opaque continuation token for a paginated listing.
///
/// # Examples
/// ```
/// use pagination::Cursor;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize, PartialEq, Debug)]
/// struct Token { offset: u64 }
///
/// let cursor = Cursor::encode(&Token { offset: 42 }).expect("encode");
/// let token: Token = cursor.decode().expect("decode");
/// assert_eq!(token, Token { offset: 42 });
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Encode a serialisable token into an opaque cursor.
    ///
    /// # Errors
    /// Returns [`CursorError::Encode`] when the token cannot be serialised.
    pub fn encode<T: Serialize>(token: &T) -> Result<Self, CursorError> {
        let json = serde_json::to_vec(token).map_err(|err| CursorError::Encode {
            message: err.to_string(),
        })?;
        Ok(Self(URL_SAFE_NO_PAD.encode(json)))
    }

    /// Decode the cursor back into the endpoint's token type.
    ///
    /// # Errors
    /// Returns [`CursorError::Malformed`] for invalid base64 and
    /// [`CursorError::UnexpectedShape`] when the payload does not deserialise
    /// into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, CursorError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(self.0.as_bytes())
            .map_err(|_| CursorError::Malformed)?;
        serde_json::from_slice(&bytes).map_err(|_| CursorError::UnexpectedShape)
    }

    /// Wrap a raw cursor string received from a client.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw opaque representation sent to clients.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One page of results plus the cursor for the next page, if any.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items in this page, in endpoint-defined order.
    pub items: Vec<T>,
    /// Continuation token; `None` when the listing is exhausted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
}

impl<T> Page<T> {
    /// Build a page with no continuation.
    #[must_use]
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }
}

/// Clamp a client-requested page size to `1..=max`, defaulting when absent.
#[must_use]
pub fn clamp_limit(requested: Option<u32>, default: u32, max: u32) -> u32 {
    requested.unwrap_or(default).clamp(1, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Token {
        id: u64,
        label: String,
    }

    #[rstest]
    fn cursor_round_trips_token() {
        let token = Token {
            id: 7,
            label: "seven".into(),
        };
        let cursor = Cursor::encode(&token).expect("encode");
        let decoded: Token = cursor.decode().expect("decode");
        assert_eq!(decoded, token);
    }

    #[rstest]
    fn cursor_is_url_safe() {
        let token = Token {
            id: u64::MAX,
            label: "??//++==".into(),
        };
        let cursor = Cursor::encode(&token).expect("encode");
        assert!(
            cursor
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[rstest]
    #[case::not_base64("!!not-base64!!")]
    #[case::empty("")]
    fn malformed_cursor_is_rejected(#[case] raw: &str) {
        let cursor = Cursor::from_raw(raw);
        let result: Result<Token, CursorError> = cursor.decode();
        assert!(matches!(
            result,
            Err(CursorError::Malformed | CursorError::UnexpectedShape)
        ));
    }

    #[rstest]
    fn mismatched_payload_is_rejected() {
        let cursor = Cursor::encode(&serde_json::json!({ "unrelated": true })).expect("encode");
        let result: Result<Token, CursorError> = cursor.decode();
        assert_eq!(result, Err(CursorError::UnexpectedShape));
    }

    #[rstest]
    #[case(None, 25)]
    #[case(Some(0), 1)]
    #[case(Some(10), 10)]
    #[case(Some(500), 100)]
    fn limits_are_clamped(#[case] requested: Option<u32>, #[case] expected: u32) {
        assert_eq!(clamp_limit(requested, 25, 100), expected);
    }
}
