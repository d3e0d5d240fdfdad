//! Note fingerprints for change detection

use std::path::Path;
use std::time::UNIX_EPOCH;

use sha2::{Digest, Sha256};
use trellis_core::{EngineError, NoteFingerprint};

/// Fingerprint already-read content together with its file stat.
pub fn fingerprint_bytes(bytes: &[u8], size: u64, mtime_ns: i64) -> NoteFingerprint {
    NoteFingerprint {
        size,
        mtime_ns,
        content_hash: hex::encode(Sha256::digest(bytes)),
    }
}

/// `(size, mtime_ns)` for the fast unchanged pre-check. Hashing only
/// happens when this pair differs from the stored fingerprint.
pub fn stat_file(path: &Path) -> Result<(u64, i64), EngineError> {
    let meta = std::fs::metadata(path).map_err(|e| unreadable(path, &e.to_string()))?;
    let mtime = meta
        .modified()
        .map_err(|e| unreadable(path, &e.to_string()))?;
    Ok((meta.len(), mtime_ns(mtime)))
}

fn mtime_ns(mtime: std::time::SystemTime) -> i64 {
    match mtime.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_nanos() as i64,
        Err(before) => -(before.duration().as_nanos() as i64),
    }
}

fn unreadable(path: &Path, reason: &str) -> EngineError {
    EngineError::UnreadableSource {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
