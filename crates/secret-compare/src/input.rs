// crates/secret-compare/src/input.rs
// ============================================================================
// Module: Secret Input Conversion
// Description: Converts caller values into byte sequences for comparison.
// Purpose: Normalize strings, bytes, optional and encoded secrets.
// Dependencies: base64, hex, serde, thiserror, zeroize
// ============================================================================

//! ## Overview
//! The comparator accepts anything implementing [`SecretInput`]. Conversion is
//! where the "falsy" calling convention lives: `None` and empty values map to
//! [`InputError::Absent`]. Encoded text ([`Encoded`]) is decoded here, and a
//! decoding failure maps to [`InputError::Encoding`].
//!
//! Error values never carry input bytes, offsets, or offending characters.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use zeroize::Zeroizing;

// ============================================================================
// SECTION: Encodings
// ============================================================================

/// Text encoding of a secret supplied as a string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretEncoding {
    /// Raw UTF-8 bytes of the text.
    #[default]
    Utf8,
    /// Hexadecimal, either case.
    Hex,
    /// Standard base64 with padding.
    Base64,
    /// URL-safe base64; trailing padding is optional.
    Base64Url,
}

impl SecretEncoding {
    /// Returns a stable label for the encoding.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Utf8 => "utf8",
            Self::Hex => "hex",
            Self::Base64 => "base64",
            Self::Base64Url => "base64url",
        }
    }

    /// Returns the audit reason label used when decoding fails.
    #[must_use]
    pub const fn failure_label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf8_decode_failed",
            Self::Hex => "hex_decode_failed",
            Self::Base64 => "base64_decode_failed",
            Self::Base64Url => "base64url_decode_failed",
        }
    }

    /// Decodes `text` into owned secret bytes.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Encoding`] when `text` is not valid in this
    /// encoding. Decoder error details are discarded.
    pub fn decode(self, text: &str) -> Result<Zeroizing<Vec<u8>>, InputError> {
        let decoded = match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Hex => hex::decode(text).map_err(|_| ()),
            Self::Base64 => STANDARD.decode(text).map_err(|_| ()),
            Self::Base64Url => URL_SAFE_NO_PAD.decode(text.trim_end_matches('=')).map_err(|_| ()),
        };
        decoded.map(Zeroizing::new).map_err(|()| InputError::Encoding {
            encoding: self,
        })
    }
}

impl fmt::Display for SecretEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an encoding label is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown secret encoding: {0} (expected utf8, hex, base64, or base64url)")]
pub struct ParseEncodingError(String);

impl FromStr for SecretEncoding {
    type Err = ParseEncodingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Self::Utf8),
            "hex" => Ok(Self::Hex),
            "base64" => Ok(Self::Base64),
            "base64url" => Ok(Self::Base64Url),
            other => Err(ParseEncodingError(other.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Reasons a value cannot take part in a comparison.
///
/// # Invariants
/// - Variants never carry secret content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputError {
    /// Input is `None` or empty after conversion.
    #[error("secret input is absent")]
    Absent,
    /// Input text is not valid in the declared encoding.
    #[error("secret input is not valid {encoding}")]
    Encoding {
        /// Declared encoding of the input.
        encoding: SecretEncoding,
    },
}

impl InputError {
    /// Returns a stable reason label for audit records.
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Encoding {
                encoding,
            } => encoding.failure_label(),
        }
    }

    /// Returns true when the error is an internal failure rather than absence.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Encoding { .. })
    }
}

// ============================================================================
// SECTION: Secret Bytes
// ============================================================================

/// Converted secret bytes, borrowed from the caller or decoded into an owned
/// buffer that is wiped on drop.
pub enum SecretBytes<'a> {
    /// Bytes borrowed from the caller's value.
    Borrowed(&'a [u8]),
    /// Bytes produced by decoding.
    Owned(Zeroizing<Vec<u8>>),
}

impl Deref for SecretBytes<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Self::Borrowed(bytes) => bytes,
            Self::Owned(bytes) => bytes.as_slice(),
        }
    }
}

impl fmt::Debug for SecretBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBytes(<redacted>)")
    }
}

/// Wraps borrowed bytes, mapping empty input to [`InputError::Absent`].
pub(crate) fn present(bytes: &[u8]) -> Result<SecretBytes<'_>, InputError> {
    if bytes.is_empty() {
        return Err(InputError::Absent);
    }
    Ok(SecretBytes::Borrowed(bytes))
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// A value that can be compared as a secret byte sequence.
pub trait SecretInput {
    /// Converts the value into bytes for comparison.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Absent`] for missing or empty values and
    /// [`InputError::Encoding`] when decoding fails.
    fn secret_bytes(&self) -> Result<SecretBytes<'_>, InputError>;
}

impl SecretInput for str {
    fn secret_bytes(&self) -> Result<SecretBytes<'_>, InputError> {
        present(self.as_bytes())
    }
}

impl SecretInput for String {
    fn secret_bytes(&self) -> Result<SecretBytes<'_>, InputError> {
        present(self.as_bytes())
    }
}

impl SecretInput for [u8] {
    fn secret_bytes(&self) -> Result<SecretBytes<'_>, InputError> {
        present(self)
    }
}

impl SecretInput for Vec<u8> {
    fn secret_bytes(&self) -> Result<SecretBytes<'_>, InputError> {
        present(self)
    }
}

impl<const N: usize> SecretInput for [u8; N] {
    fn secret_bytes(&self) -> Result<SecretBytes<'_>, InputError> {
        present(self)
    }
}

impl<T: SecretInput> SecretInput for Option<T> {
    fn secret_bytes(&self) -> Result<SecretBytes<'_>, InputError> {
        match self {
            Some(value) => value.secret_bytes(),
            None => Err(InputError::Absent),
        }
    }
}

impl<T: SecretInput + ?Sized> SecretInput for &T {
    fn secret_bytes(&self) -> Result<SecretBytes<'_>, InputError> {
        (**self).secret_bytes()
    }
}

// ============================================================================
// SECTION: Encoded Text
// ============================================================================

/// Secret supplied as encoded text, decoded before comparison.
///
/// The text is held as raw bytes so values from outside Rust (environment
/// variables, OS strings) need not be valid UTF-8 up front. With
/// [`SecretEncoding::Utf8`] the bytes are compared as-is; any other encoding
/// requires them to be UTF-8 text and reports `utf8_decode_failed` otherwise.
#[derive(Clone, Copy)]
pub struct Encoded<'a> {
    /// Encoded text bytes.
    text: &'a [u8],
    /// Encoding of `text`.
    encoding: SecretEncoding,
}

impl<'a> Encoded<'a> {
    /// Wraps `text` declared as `encoding`.
    #[must_use]
    pub const fn new(text: &'a str, encoding: SecretEncoding) -> Self {
        Self::from_bytes(text.as_bytes(), encoding)
    }

    /// Wraps raw text bytes declared as `encoding`.
    #[must_use]
    pub const fn from_bytes(text: &'a [u8], encoding: SecretEncoding) -> Self {
        Self {
            text,
            encoding,
        }
    }

    /// Wraps hexadecimal text.
    #[must_use]
    pub const fn hex(text: &'a str) -> Self {
        Self::new(text, SecretEncoding::Hex)
    }

    /// Wraps standard base64 text.
    #[must_use]
    pub const fn base64(text: &'a str) -> Self {
        Self::new(text, SecretEncoding::Base64)
    }

    /// Returns the declared encoding.
    #[must_use]
    pub const fn encoding(&self) -> SecretEncoding {
        self.encoding
    }
}

impl fmt::Debug for Encoded<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoded")
            .field("text", &"<redacted>")
            .field("encoding", &self.encoding)
            .finish()
    }
}

impl SecretInput for Encoded<'_> {
    fn secret_bytes(&self) -> Result<SecretBytes<'_>, InputError> {
        if self.text.is_empty() {
            return Err(InputError::Absent);
        }
        if self.encoding == SecretEncoding::Utf8 {
            return present(self.text);
        }
        let text = std::str::from_utf8(self.text).map_err(|_| InputError::Encoding {
            encoding: SecretEncoding::Utf8,
        })?;
        let decoded = self.encoding.decode(text)?;
        if decoded.is_empty() {
            return Err(InputError::Absent);
        }
        Ok(SecretBytes::Owned(decoded))
    }
}
