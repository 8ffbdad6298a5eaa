// File-level helpers around the in-memory diff/patch engine.
//
// The suffix index needs the whole source resident, and the scan reads
// the target non-sequentially during fuzzy extension, so both inputs are
// read fully into memory. Output is written with a `BufWriter`.
// Optionally computes SHA-256 checksums (feature-gated behind `file-io`).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::engine::{self, DiffOptions};
use crate::error::{DiffError, PatchError};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `diff_file()`.
#[derive(Debug, Clone)]
pub struct DiffStats {
    /// Source file size in bytes.
    pub source_size: u64,
    /// Target file size in bytes.
    pub target_size: u64,
    /// Patch output size in bytes.
    pub patch_size: u64,
    /// SHA-256 of the source file (if `file-io` feature is enabled).
    pub source_sha256: Option<[u8; 32]>,
    /// SHA-256 of the target file (if `file-io` feature is enabled).
    pub target_sha256: Option<[u8; 32]>,
}

/// Statistics returned by `patch_file()`.
#[derive(Debug, Clone)]
pub struct PatchStats {
    /// Source file size in bytes.
    pub source_size: u64,
    /// Patch file size in bytes.
    pub patch_size: u64,
    /// Reconstructed output size in bytes.
    pub output_size: u64,
    /// SHA-256 of the reconstructed output (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file-level operations.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    /// I/O error (file open, read, write).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Patch generation error.
    #[error("diff error: {0}")]
    Diff(#[from] DiffError),
    /// Patch application error.
    #[error("patch error: {0}")]
    Patch(#[from] PatchError),
}

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

#[cfg(feature = "file-io")]
fn sha256(data: &[u8]) -> Option<[u8; 32]> {
    let mut h = sha2::Sha256::new();
    h.update(data);
    Some(h.finalize().into())
}

#[cfg(not(feature = "file-io"))]
fn sha256(_data: &[u8]) -> Option<[u8; 32]> {
    None
}

// ---------------------------------------------------------------------------
// diff_file
// ---------------------------------------------------------------------------

/// Diff a source file against a target file, writing the patch container
/// to `patch_path`.
pub fn diff_file(
    source_path: &Path,
    target_path: &Path,
    patch_path: &Path,
    opts: &DiffOptions,
) -> Result<DiffStats, FileError> {
    let source = std::fs::read(source_path)?;
    let target = std::fs::read(target_path)?;

    let delta = engine::diff_with(&source, &target, opts, &crate::suffix::DivSufSort)?;

    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(patch_path)?);
    writer.write_all(&delta)?;
    writer.flush()?;

    Ok(DiffStats {
        source_size: source.len() as u64,
        target_size: target.len() as u64,
        patch_size: delta.len() as u64,
        source_sha256: sha256(&source),
        target_sha256: sha256(&target),
    })
}

// ---------------------------------------------------------------------------
// patch_file
// ---------------------------------------------------------------------------

/// Apply a patch file to a source file, writing the reconstructed target
/// to `output_path`.
pub fn patch_file(
    source_path: &Path,
    patch_path: &Path,
    output_path: &Path,
) -> Result<PatchStats, FileError> {
    let source = std::fs::read(source_path)?;
    let delta = std::fs::read(patch_path)?;

    let output = engine::patch(&source, &delta)?;

    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(output_path)?);
    writer.write_all(&output)?;
    writer.flush()?;

    Ok(PatchStats {
        source_size: source.len() as u64,
        patch_size: delta.len() as u64,
        output_size: output.len() as u64,
        output_sha256: sha256(&output),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
