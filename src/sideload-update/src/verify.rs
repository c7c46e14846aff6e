//! Package integrity checks.

use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

use crate::error::{UpdateError, UpdateResult};

/// Verify the SHA-256 checksum of a file against the manifest hash.
pub async fn verify_sha256(path: &Path, expected: &str) -> UpdateResult<()> {
    let actual = calculate_sha256(path).await?;
    let expected = expected.trim().to_lowercase();

    if actual != expected {
        return Err(UpdateError::ChecksumMismatch { expected, actual });
    }

    Ok(())
}

/// Calculate the SHA-256 hash of a file, hex-encoded.
pub async fn calculate_sha256(path: &Path) -> UpdateResult<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Normalize an entity tag for comparison: strip the weak-validator
/// marker and surrounding quotes.
pub fn normalize_entity_tag(tag: &str) -> &str {
    let tag = tag.trim();
    let tag = tag.strip_prefix("W/").unwrap_or(tag);
    tag.trim_matches('"')
}

/// Whether a remote entity tag contradicts the declared hash.
pub fn entity_tag_mismatch(tag: &str, expected: &str) -> bool {
    !normalize_entity_tag(tag).eq_ignore_ascii_case(expected.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // SHA-256 of "hello world"
    const HELLO_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[tokio::test]
    async fn test_verify_sha256() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "hello world").unwrap();

        verify_sha256(file.path(), HELLO_SHA256).await.unwrap();
    }

    #[tokio::test]
    async fn test_verify_sha256_mismatch() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "hello world").unwrap();

        let wrong = "0000000000000000000000000000000000000000000000000000000000000000";
        let result = verify_sha256(file.path(), wrong).await;
        assert!(matches!(result, Err(UpdateError::ChecksumMismatch { .. })));
    }

    #[tokio::test]
    async fn test_calculate_sha256() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "hello world").unwrap();

        assert_eq!(calculate_sha256(file.path()).await.unwrap(), HELLO_SHA256);
    }

    #[test]
    fn test_normalize_entity_tag() {
        assert_eq!(normalize_entity_tag("\"abc123\""), "abc123");
        assert_eq!(normalize_entity_tag("W/\"abc123\""), "abc123");
        assert_eq!(normalize_entity_tag("abc123"), "abc123");
    }

    #[test]
    fn test_entity_tag_mismatch() {
        assert!(!entity_tag_mismatch("\"AABB\"", "aabb"));
        assert!(entity_tag_mismatch("\"ccdd\"", "aabb"));
    }
}
