//! Opaque pagination cursors.
//!
//! A cursor is the base-10 rendering of a row's `id`, base64 encoded. It is
//! opaque to API consumers but carries no secrecy.

use base64::{engine::general_purpose::STANDARD, Engine};
use thiserror::Error;

pub type Cursor = String;

pub type CursorResult<T> = Result<T, CursorError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CursorError {
    #[error("Invalid cursor: {0:?}")]
    InvalidCursor(String),
}

pub struct CursorCodec;

impl CursorCodec {
    /// Encode a row id into a cursor.
    pub fn encode(id: i64) -> Cursor {
        STANDARD.encode(id.to_string())
    }

    /// Decode a cursor back into the row id it was built from.
    ///
    /// Only cursors produced by [`CursorCodec::encode`] are accepted.
    pub fn decode(cursor: &str) -> CursorResult<i64> {
        let invalid = || CursorError::InvalidCursor(cursor.to_string());

        let bytes = STANDARD.decode(cursor).map_err(|_| invalid())?;
        let digits = String::from_utf8(bytes).map_err(|_| invalid())?;
        let id = digits.parse::<i64>().map_err(|_| invalid())?;

        // Reject non-canonical spellings such as "+7" or "007".
        if Self::encode(id) != cursor {
            return Err(invalid());
        }

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_round_trip() {
        for id in [0, 1, 2, 3, 4, 42, 1_000_000, i64::MAX] {
            assert_eq!(CursorCodec::decode(&CursorCodec::encode(id)), Ok(id));
        }
    }

    #[test]
    fn test_cursor_is_base64_of_decimal_id() {
        assert_eq!(CursorCodec::encode(1), "MQ==");
        assert_eq!(CursorCodec::encode(42), "NDI=");
    }

    #[test]
    fn test_malformed_cursors_are_rejected() {
        let not_base64 = "not a cursor!";
        let not_a_number = STANDARD.encode("abc");
        let padded_number = STANDARD.encode("007");
        let not_utf8 = STANDARD.encode([0xff, 0xfe]);

        for cursor in [
            not_base64,
            not_a_number.as_str(),
            padded_number.as_str(),
            not_utf8.as_str(),
            "",
        ] {
            assert_eq!(
                CursorCodec::decode(cursor),
                Err(CursorError::InvalidCursor(cursor.to_string()))
            );
        }
    }
}
