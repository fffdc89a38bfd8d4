// crates/secret-compare/src/secret.rs
// ============================================================================
// Module: Secret Values
// Description: Owned secret bytes wiped on drop.
// Purpose: Hold credentials without exposing them through formatting.
// Dependencies: zeroize
// ============================================================================

//! ## Overview
//! [`SecretValue`] owns a credential, digest, or key. It is zeroized on drop
//! and its `Debug` output is a fixed marker. It deliberately has no
//! `PartialEq`: equality goes through [`SecretValue::matches`], which follows
//! the comparator's rules (an empty value matches nothing, itself included).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use zeroize::Zeroize;
use zeroize::ZeroizeOnDrop;

use crate::compare::safe_compare;
use crate::input::InputError;
use crate::input::SecretBytes;
use crate::input::SecretEncoding;
use crate::input::SecretInput;
use crate::input::present;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Owned secret byte sequence.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretValue {
    /// Secret bytes.
    bytes: Vec<u8>,
}

impl SecretValue {
    /// Takes ownership of `bytes`.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
        }
    }

    /// Decodes `text` in `encoding` into a secret value.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Encoding`] when `text` does not decode.
    pub fn decode(text: &str, encoding: SecretEncoding) -> Result<Self, InputError> {
        let mut decoded = encoding.decode(text)?;
        Ok(Self::new(std::mem::take(&mut *decoded)))
    }

    /// Returns the secret bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true when the value holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Compares against `other` in constant time.
    #[must_use]
    pub fn matches(&self, other: impl SecretInput) -> bool {
        safe_compare(self, other)
    }
}

impl From<Vec<u8>> for SecretValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<String> for SecretValue {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

impl From<&str> for SecretValue {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes().to_vec())
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValue(<redacted>)")
    }
}

impl SecretInput for SecretValue {
    fn secret_bytes(&self) -> Result<SecretBytes<'_>, InputError> {
        present(&self.bytes)
    }
}
