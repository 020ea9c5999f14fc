//! Stable change identities.
//!
//! A checksum is `"<version>:<sha256 hex>"` over the JSON serialization of a
//! change. Inserts on the literal path are hashed after the same column
//! normalization the compiler applies, so a column the database generates
//! itself never affects the identity on dialects with auto-increment.
//! Inserts on the prepared path are hashed as declared; large-object files
//! are identified by path, not content.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::change::{Change, ChangeSet, ColumnSnapshot, NoSnapshot};
use crate::dialect::Dialect;
use crate::error::ChecksumError;

/// Current checksum algorithm version.
pub const CHECKSUM_VERSION: u32 = 1;

/// A versioned digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CheckSum {
    version: u32,
    digest: String,
}

impl CheckSum {
    /// Hashes raw bytes with the current algorithm.
    #[must_use]
    pub fn compute(bytes: &[u8]) -> Self {
        Self {
            version: CHECKSUM_VERSION,
            digest: sha256_hex(bytes),
        }
    }

    /// Returns the algorithm version.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Returns the hex digest.
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

impl fmt::Display for CheckSum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.version, self.digest)
    }
}

impl FromStr for CheckSum {
    type Err = ChecksumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ChecksumError::Malformed(s.to_string());
        let (version, digest) = s.split_once(':').ok_or_else(malformed)?;
        let version = version.parse::<u32>().map_err(|_| malformed())?;
        if digest.is_empty() || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(malformed());
        }
        Ok(Self {
            version,
            digest: digest.to_ascii_lowercase(),
        })
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Computes the checksum of a change for a dialect.
///
/// # Errors
///
/// Returns [`ChecksumError::Serialization`] if the change cannot be encoded.
pub fn checksum(change: &Change, dialect: &Dialect) -> Result<CheckSum, ChecksumError> {
    checksum_with(change, dialect, &NoSnapshot)
}

/// Computes the checksum of a change, consulting `snapshot` for path
/// selection like [`Change::compile_with`] does.
///
/// # Errors
///
/// Returns [`ChecksumError::Serialization`] if the change cannot be encoded.
pub fn checksum_with(
    change: &Change,
    dialect: &Dialect,
    snapshot: &dyn ColumnSnapshot,
) -> Result<CheckSum, ChecksumError> {
    let canonical = match change {
        Change::InsertData(insert) if !insert.needs_prepared_statement(dialect, snapshot) => {
            let mut normalized = insert.clone();
            normalized.columns = insert.normalize(dialect).columns;
            serde_json::to_vec(&Change::InsertData(normalized))?
        }
        _ => serde_json::to_vec(change)?,
    };
    Ok(CheckSum::compute(&canonical))
}

/// Combines the checksums of a change set's changes, in order.
///
/// # Errors
///
/// Returns [`ChecksumError::Serialization`] if any change cannot be encoded.
pub fn changeset_checksum(changeset: &ChangeSet, dialect: &Dialect) -> Result<CheckSum, ChecksumError> {
    let parts = changeset
        .changes
        .iter()
        .map(|change| checksum(change, dialect).map(|c| c.to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CheckSum::compute(parts.join("\n").as_bytes()))
}

/// Compares a stored checksum against the current one.
///
/// # Errors
///
/// Returns [`ChecksumError::Malformed`] if `stored` does not parse and
/// [`ChecksumError::Mismatch`] if the values differ.
pub fn verify(id: &str, stored: &str, computed: &CheckSum) -> Result<(), ChecksumError> {
    let parsed: CheckSum = stored.parse()?;
    if &parsed == computed {
        Ok(())
    } else {
        Err(ChecksumError::Mismatch {
            id: id.to_string(),
            stored: stored.to_string(),
            computed: computed.to_string(),
        })
    }
}
