use sha2::{Digest, Sha256};

/// Downloaded bytes together with their SHA-256 digest.
///
/// The digest is logged and reported by `/api/v1/model` so an operator can
/// tell exactly which artifact is serving predictions. When a pinned digest
/// is configured, anything else is refused.
#[derive(Debug, Clone)]
pub struct VerifiedArtifact {
    pub bytes: Vec<u8>,
    /// SHA-256 of `bytes` (lowercase hex)
    pub sha256: String,
}

impl VerifiedArtifact {
    pub fn new(bytes: Vec<u8>) -> Self {
        let sha256 = compute_checksum(&bytes);
        Self { bytes, sha256 }
    }

    /// Checks the digest against an expected one, if any.
    ///
    /// Returns false on mismatch
    pub fn matches(&self, expected: Option<&str>) -> bool {
        match expected {
            Some(expected) => self.sha256.eq_ignore_ascii_case(expected.trim()),
            None => true,
        }
    }

    /// Hashes `bytes` and enforces the pinned digest.
    ///
    /// Returns None when the digest does not match
    pub fn verify(bytes: Vec<u8>, expected: Option<&str>) -> Option<Self> {
        let artifact = Self::new(bytes);
        if artifact.matches(expected) {
            Some(artifact)
        } else {
            tracing::warn!(
                "Artifact checksum mismatch. Expected: {}, got: {} ({} bytes)",
                expected.unwrap_or_default(),
                artifact.sha256,
                artifact.bytes.len()
            );
            None
        }
    }
}

pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
