//! SHA256 verification of downloaded artifacts.
//!
//! The manifest format has no signature scheme; when a `sha256` field is
//! present on a platform entry, the downloaded file is checked against it
//! before the installer is launched. Legacy manifests omit the field and
//! skip verification.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{Result, UpdateError};

/// Buffer size for reading files during checksum computation.
const BUFFER_SIZE: usize = 65536;

/// Compute the SHA256 hash of a file, as lowercase hex.
pub fn compute_file_sha256(path: &Path) -> Result<String> {
    tracing::debug!("computing SHA256 for {}", path.display());

    let file = File::open(path)
        .map_err(|e| UpdateError::Download(crate::error::FetchError::Io(e.to_string())))?;
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| UpdateError::Download(crate::error::FetchError::Io(e.to_string())))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Verify that a file matches an expected SHA256 digest.
///
/// Accepts a bare hex digest or the `sha256:`-prefixed form, case
/// insensitively.
pub fn verify_file_sha256(path: &Path, expected: &str) -> Result<()> {
    let expected = expected
        .strip_prefix("sha256:")
        .unwrap_or(expected)
        .trim()
        .to_lowercase();

    let actual = compute_file_sha256(path)?;
    if actual != expected {
        return Err(UpdateError::ChecksumMismatch { expected, actual });
    }

    tracing::info!("checksum verification passed for {}", path.display());
    Ok(())
}
