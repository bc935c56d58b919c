//! Artifact checksums.

/// CRC-32 (IEEE) of `bytes` as a decimal string.
pub fn checksum(bytes: &[u8]) -> String {
    crc32fast::hash(bytes).to_string()
}

/// Result of comparing an artifact against the caller's expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Integrity {
    /// No expectation, or the expectation matched. Carries the computed checksum.
    Verified(String),
    /// The expectation did not match. Carries the caller's value verbatim.
    Mismatch(String),
}

impl Integrity {
    /// Compare the checksum of `bytes` with an optional expected value.
    pub fn check(bytes: &[u8], expected: Option<&str>) -> Self {
        let actual = checksum(bytes);
        match expected {
            Some(expected) if expected != actual => Integrity::Mismatch(expected.to_string()),
            _ => Integrity::Verified(actual),
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, Integrity::Verified(_))
    }

    /// Hash reported back to the caller.
    pub fn hash(&self) -> &str {
        match self {
            Integrity::Verified(hash) | Integrity::Mismatch(hash) => hash,
        }
    }
}
