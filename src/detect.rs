use crate::error::{MirrorError, MirrorResult};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::debug;

/// What the change detector decided about one candidate file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Copy,
    Skip,
    Reject { reason: &'static str },
}

/// Decide whether `source` must be (re)copied to `dest`.
///
/// Oversized sources are rejected outright. A destination that cannot be
/// stat'd for any reason means copy (fail-open). Otherwise both files are
/// hashed in full; differing hashes mean copy, equal hashes mean skip. When
/// both hash computations fail, the empty hashes compare equal and the file
/// is copied anyway, which keeps the detector fail-open at the cost of
/// masking a double I/O failure.
pub async fn needs_copy(source: &Path, dest: &Path, max_file_size: u64) -> MirrorResult<Decision> {
    let meta = tokio::fs::metadata(source)
        .await
        .map_err(|e| MirrorError::Detect {
            path: source.to_path_buf(),
            source: e,
        })?;

    if meta.len() > max_file_size {
        return Ok(Decision::Reject {
            reason: "exceeds max_file_size",
        });
    }

    if tokio::fs::metadata(dest).await.is_err() {
        return Ok(Decision::Copy);
    }

    let source_hash = hash_file(source).await.unwrap_or_default();
    let dest_hash = hash_file(dest).await.unwrap_or_default();

    if source_hash != dest_hash || (source_hash.is_empty() && dest_hash.is_empty()) {
        debug!("Content differs: {:?}", source);
        Ok(Decision::Copy)
    } else {
        Ok(Decision::Skip)
    }
}

/// Streaming whole-file SHA-256, hex encoded.
async fn hash_file(path: &Path) -> std::io::Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer).await?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_dest_means_copy() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.txt");
        std::fs::write(&source, b"hello").unwrap();

        let decision = needs_copy(&source, &temp.path().join("missing"), 1024)
            .await
            .unwrap();
        assert_eq!(decision, Decision::Copy);
    }

    #[tokio::test]
    async fn test_identical_content_means_skip() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.txt");
        let dest = temp.path().join("b.txt");
        std::fs::write(&source, b"same bytes").unwrap();
        std::fs::write(&dest, b"same bytes").unwrap();

        let decision = needs_copy(&source, &dest, 1024).await.unwrap();
        assert_eq!(decision, Decision::Skip);
    }

    #[tokio::test]
    async fn test_differing_content_means_copy() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.txt");
        let dest = temp.path().join("b.txt");
        std::fs::write(&source, b"new content").unwrap();
        std::fs::write(&dest, b"old content").unwrap();

        let decision = needs_copy(&source, &dest, 1024).await.unwrap();
        assert_eq!(decision, Decision::Copy);
    }

    #[tokio::test]
    async fn test_equal_size_different_content_means_copy() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.txt");
        let dest = temp.path().join("b.txt");
        std::fs::write(&source, b"aaaa").unwrap();
        std::fs::write(&dest, b"bbbb").unwrap();

        let decision = needs_copy(&source, &dest, 1024).await.unwrap();
        assert_eq!(decision, Decision::Copy);
    }

    #[tokio::test]
    async fn test_oversized_source_is_rejected() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("big.bin");
        std::fs::write(&source, vec![0u8; 200]).unwrap();

        let decision = needs_copy(&source, &temp.path().join("dst"), 100)
            .await
            .unwrap();
        assert!(matches!(decision, Decision::Reject { .. }));
    }

    #[tokio::test]
    async fn test_missing_source_is_detection_error() {
        let temp = TempDir::new().unwrap();
        let result = needs_copy(
            &temp.path().join("gone"),
            &temp.path().join("dst"),
            100,
        )
        .await;
        assert!(matches!(result, Err(MirrorError::Detect { .. })));
    }
}
