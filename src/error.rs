// Error taxonomy for the diff and patch directions.
//
// Patch-side failures are deliberately split into distinct kinds so a
// caller (or the CLI) can report which invariant broke: a damaged
// container, a mismatched source file, an inconsistent control stream,
// or an invalid compressed payload. None of them is recoverable; the
// operation either produces the complete target or fails as a whole.

use thiserror::Error;

/// Errors surfaced while generating a patch.
#[derive(Debug, Error)]
pub enum DiffError {
    /// The suffix index uses 32-bit offsets; larger sources are rejected
    /// up front instead of overflowing inside the sorter.
    #[error("source too large for suffix index: {len} bytes (max {max})")]
    SourceTooLarge { len: usize, max: usize },

    /// A stream compressor failed.
    #[error("stream compression failed: {0}")]
    Compress(#[from] std::io::Error),
}

/// Errors surfaced while applying a patch.
#[derive(Debug, Error)]
pub enum PatchError {
    /// Header malformed: bad magic/version, stream lengths inconsistent
    /// with the container size, or an unknown compressor id.
    #[error("corrupt patch: {0}")]
    CorruptPatch(String),

    /// The control stream requests more source bytes than exist, or a
    /// seek moves the source cursor outside the source buffer. Usually
    /// means the patch was generated against a different source.
    #[error("source overrun: {0}")]
    SourceOverrun(String),

    /// Control entries do not sum to the declared target length, or the
    /// diff/extra streams run out of (or have surplus) bytes.
    #[error("malformed control stream: {0}")]
    MalformedControlStream(String),

    /// A stream's compressed payload is invalid.
    #[error("decompression failure: {0}")]
    DecompressionFailure(String),
}
