//! CNPJ normalization and validation

use crate::core::error::{RegistryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated fund identifier in canonical `XX.XXX.XXX/XXXX-XX` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cnpj(String);

impl Cnpj {
    /// Normalizes and validates a raw identifier.
    ///
    /// A 14-character digit-only input is reformatted by inserting the
    /// canonical separators. Any character outside `[0-9./-]`, or a value
    /// that does not match the canonical shape, is rejected with the
    /// original input attached to the error.
    pub fn parse(raw: &str) -> Result<Self> {
        if !raw
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '/' | '-'))
        {
            return Err(RegistryError::InvalidCnpj(raw.to_string()));
        }

        let candidate = if !raw.contains('-') && !raw.contains('/') && raw.len() == 14 {
            format!(
                "{}.{}.{}/{}-{}",
                &raw[0..2],
                &raw[2..5],
                &raw[5..8],
                &raw[8..12],
                &raw[12..14]
            )
        } else {
            raw.to_string()
        };

        if !is_canonical(&candidate) {
            return Err(RegistryError::InvalidCnpj(raw.to_string()));
        }

        Ok(Cnpj(candidate))
    }

    /// Canonical form with separators.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Separator-free 14-digit form, used as a storage key.
    pub fn digits(&self) -> String {
        self.0.chars().filter(char::is_ascii_digit).collect()
    }
}

/// 2 digits, `.`, 3 digits, `.`, 3 digits, `/`, 4 digits, `-`, 2 digits.
fn is_canonical(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 18 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, b)| match i {
        2 | 6 => *b == b'.',
        10 => *b == b'/',
        15 => *b == b'-',
        _ => b.is_ascii_digit(),
    })
}

/// Validates a batch in input order, failing fast on the first invalid
/// entry. No partial output: earlier valid entries are discarded when a
/// later one fails. An empty batch is itself invalid.
pub fn parse_batch(raws: &[String]) -> Result<Vec<Cnpj>> {
    if raws.is_empty() {
        return Err(RegistryError::InvalidCnpj(format!("{raws:?}")));
    }
    raws.iter().map(|raw| Cnpj::parse(raw)).collect()
}

impl fmt::Display for Cnpj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Cnpj {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        Cnpj::parse(s)
    }
}

impl TryFrom<String> for Cnpj {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self> {
        Cnpj::parse(&value)
    }
}

impl From<Cnpj> for String {
    fn from(cnpj: Cnpj) -> String {
        cnpj.0
    }
}

impl AsRef<str> for Cnpj {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
