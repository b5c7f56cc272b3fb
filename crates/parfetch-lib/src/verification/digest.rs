use std::path::Path;

use digest::Digest;
use md5::Md5;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::error::ParfetchError;

#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },
}

/// Hashes the fully assembled file and compares it with the tag the server
/// advertised.
///
/// Must only run after every chunk write is durable; it reads the file
/// start to end, streaming in 64 KiB slices to keep memory flat for large
/// files. The digest is MD5 encoded as lowercase hex, compared for exact
/// equality. A mismatch is its own error kind, separate from transport
/// failures: it means the transfer succeeded but the content is not what
/// the server claims.
pub async fn verify_file(path: &Path, expected_tag: &str) -> Result<(), ParfetchError> {
    let file = tokio::fs::File::open(path).await?;
    let mut reader = tokio::io::BufReader::new(file);
    let mut buffer = vec![0u8; 65536];
    let mut hasher = Md5::new();

    loop {
        let bytes_read = reader.read(&mut buffer).await?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    let actual = hex::encode(hasher.finalize());
    debug!(expected = expected_tag, actual = %actual, "digest computed");

    if actual == expected_tag {
        Ok(())
    } else {
        Err(VerificationError::DigestMismatch {
            expected: expected_tag.to_string(),
            actual,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_WORLD_MD5: &str = "5eb63bbbe01eeed093cb22bb8f5acdc3";

    #[tokio::test]
    async fn test_verify_matching_digest() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("payload.bin");
        std::fs::write(&path, b"hello world").expect("write payload");

        verify_file(&path, HELLO_WORLD_MD5).await.expect("digest should match");
    }

    #[tokio::test]
    async fn test_verify_mismatch_reports_both_digests() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("payload.bin");
        std::fs::write(&path, b"hello world").expect("write payload");

        let error = verify_file(&path, "00000000000000000000000000000000")
            .await
            .expect_err("digest should not match");

        match error {
            ParfetchError::Verification(VerificationError::DigestMismatch { expected, actual }) => {
                assert_eq!(expected, "00000000000000000000000000000000");
                assert_eq!(actual, HELLO_WORLD_MD5);
            }
            other => panic!("expected a digest mismatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_verify_empty_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("empty.bin");
        std::fs::write(&path, b"").expect("write payload");

        // MD5 of the empty input.
        verify_file(&path, "d41d8cd98f00b204e9800998ecf8427e")
            .await
            .expect("digest should match");
    }
}
