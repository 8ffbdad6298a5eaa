// Stream compression for the control/diff/extra segments.
//
// Provides a pluggable `CompressBackend` trait with built-in
// implementations:
//   - Passthrough (id 0, always available)
//   - Zlib/Deflate (id 1, via flate2, feature-gated `zlib`)
//   - LZMA (id 2, via lzma-rs, feature-gated `lzma`)
//
// The compressor id is stored in the container header; all three streams
// use the same backend, applied unconditionally, so a fixed (matches,
// compressor) choice yields a byte-identical container.
//
// Decompression is bounded: each stream carries a size budget derived
// from the header's declared target length, and a payload that expands
// past it fails instead of growing without limit.

use std::io;

use crate::error::PatchError;

/// Compressor id for passthrough (no compression).
pub const FORMAT_NONE: u8 = 0;
/// Compressor id for Zlib/Deflate.
pub const FORMAT_ZLIB: u8 = 1;
/// Compressor id for LZMA.
pub const FORMAT_LZMA: u8 = 2;

// ---------------------------------------------------------------------------
// CompressBackend trait
// ---------------------------------------------------------------------------

/// A pluggable stream compressor for the three patch segments.
pub trait CompressBackend: Send + Sync {
    /// The compressor id stored in the container header.
    fn id(&self) -> u8;

    /// Compress one stream.
    fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>>;

    /// Decompress one stream previously produced by `compress()`.
    ///
    /// `limit` is the largest decompressed size the caller will accept;
    /// a payload expanding past it is a `DecompressionFailure`.
    fn decompress(&self, data: &[u8], limit: u64) -> Result<Vec<u8>, PatchError>;
}

/// Decompressed-size budgets `(control, diff, extra)` for a patch with
/// the given declared target length. The diff and extra streams together
/// hold exactly one byte per target byte; the control stream holds one
/// 24-byte entry per match, and a valid match sequence has at most one
/// entry more than the target has bytes.
pub fn stream_limits(target_len: u64) -> (u64, u64, u64) {
    let control = target_len
        .saturating_add(1)
        .saturating_mul(crate::control::CONTROL_ENTRY_SIZE as u64);
    (control, target_len, target_len)
}

fn over_limit(id: u8, limit: u64) -> PatchError {
    PatchError::DecompressionFailure(format!(
        "{} stream expands past the declared size budget of {limit} bytes",
        name_for_id(id)
    ))
}

// ---------------------------------------------------------------------------
// Passthrough backend
// ---------------------------------------------------------------------------

/// Identity "compressor". The format treats it like any other backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl CompressBackend for Passthrough {
    fn id(&self) -> u8 {
        FORMAT_NONE
    }

    fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decompress(&self, data: &[u8], limit: u64) -> Result<Vec<u8>, PatchError> {
        if data.len() as u64 > limit {
            return Err(over_limit(FORMAT_NONE, limit));
        }
        Ok(data.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Zlib backend
// ---------------------------------------------------------------------------

/// Zlib/Deflate stream compressor (id 1).
///
/// Uses zlib framing rather than raw deflate, so each stream is
/// self-describing and carries its own checksum.
#[cfg(feature = "zlib")]
#[derive(Debug, Clone, Copy)]
pub struct ZlibBackend {
    level: flate2::Compression,
}

#[cfg(feature = "zlib")]
impl ZlibBackend {
    /// Create a Zlib backend with the given compression level (0-9).
    pub fn new(level: u32) -> Self {
        Self {
            level: flate2::Compression::new(level),
        }
    }
}

#[cfg(feature = "zlib")]
impl Default for ZlibBackend {
    fn default() -> Self {
        Self::new(6)
    }
}

#[cfg(feature = "zlib")]
impl CompressBackend for ZlibBackend {
    fn id(&self) -> u8 {
        FORMAT_ZLIB
    }

    fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        use flate2::write::ZlibEncoder;
        use io::Write;

        let mut encoder = ZlibEncoder::new(Vec::new(), self.level);
        encoder.write_all(data)?;
        encoder.finish()
    }

    fn decompress(&self, data: &[u8], limit: u64) -> Result<Vec<u8>, PatchError> {
        use flate2::read::ZlibDecoder;
        use io::Read;

        // Read one byte past the budget so an oversized payload is
        // detected without inflating it fully.
        let mut decoder = ZlibDecoder::new(data).take(limit.saturating_add(1));
        let mut output = Vec::new();
        decoder
            .read_to_end(&mut output)
            .map_err(|e| PatchError::DecompressionFailure(format!("zlib: {e}")))?;
        if output.len() as u64 > limit {
            return Err(over_limit(FORMAT_ZLIB, limit));
        }
        Ok(output)
    }
}

// ---------------------------------------------------------------------------
// LZMA backend
// ---------------------------------------------------------------------------

/// LZMA stream compressor (id 2).
#[cfg(feature = "lzma")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LzmaBackend;

#[cfg(feature = "lzma")]
impl CompressBackend for LzmaBackend {
    fn id(&self) -> u8 {
        FORMAT_LZMA
    }

    fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        let mut input = io::Cursor::new(data);
        let mut output = Vec::new();
        lzma_rs::lzma_compress(&mut input, &mut output)?;
        Ok(output)
    }

    fn decompress(&self, data: &[u8], limit: u64) -> Result<Vec<u8>, PatchError> {
        let mut input = io::BufReader::new(io::Cursor::new(data));
        let mut output = CappedWriter {
            buf: Vec::new(),
            limit,
            overflowed: false,
        };
        match lzma_rs::lzma_decompress(&mut input, &mut output) {
            Ok(()) => Ok(output.buf),
            Err(_) if output.overflowed => Err(over_limit(FORMAT_LZMA, limit)),
            Err(e) => Err(PatchError::DecompressionFailure(format!("lzma: {e}"))),
        }
    }
}

/// Write sink that refuses to grow past a fixed budget.
#[cfg(feature = "lzma")]
struct CappedWriter {
    buf: Vec<u8>,
    limit: u64,
    overflowed: bool,
}

#[cfg(feature = "lzma")]
impl io::Write for CappedWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.buf.len() as u64 + data.len() as u64 > self.limit {
            self.overflowed = true;
            return Err(io::Error::other("decompressed stream over budget"));
        }
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Encoder-side selection
// ---------------------------------------------------------------------------

/// The stream compression to use when generating a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// No compression (passthrough).
    None,
    /// Zlib/Deflate (id 1).
    #[cfg(feature = "zlib")]
    Zlib {
        /// Zlib compression level (0-9).
        level: u32,
    },
    /// LZMA (id 2).
    #[cfg(feature = "lzma")]
    Lzma,
}

impl Default for Compression {
    fn default() -> Self {
        #[cfg(feature = "zlib")]
        return Compression::Zlib { level: 6 };

        #[cfg(not(feature = "zlib"))]
        Compression::None
    }
}

impl Compression {
    /// The id written to the container header.
    pub fn id(&self) -> u8 {
        match self {
            Self::None => FORMAT_NONE,
            #[cfg(feature = "zlib")]
            Self::Zlib { .. } => FORMAT_ZLIB,
            #[cfg(feature = "lzma")]
            Self::Lzma => FORMAT_LZMA,
        }
    }

    /// The backend implementation for this choice.
    pub fn backend(&self) -> Box<dyn CompressBackend> {
        match self {
            Self::None => Box::new(Passthrough),
            #[cfg(feature = "zlib")]
            Self::Zlib { level } => Box::new(ZlibBackend::new(*level)),
            #[cfg(feature = "lzma")]
            Self::Lzma => Box::new(LzmaBackend),
        }
    }
}

// ---------------------------------------------------------------------------
// Decoder-side dispatch
// ---------------------------------------------------------------------------

/// Look up a decompression backend by the id found in the header.
pub fn backend_for_id(id: u8) -> Result<Box<dyn CompressBackend>, PatchError> {
    match id {
        FORMAT_NONE => Ok(Box::new(Passthrough)),

        #[cfg(feature = "zlib")]
        FORMAT_ZLIB => Ok(Box::new(ZlibBackend::default())),
        #[cfg(not(feature = "zlib"))]
        FORMAT_ZLIB => Err(PatchError::CorruptPatch(
            "patch uses zlib streams but the 'zlib' feature is disabled".into(),
        )),

        #[cfg(feature = "lzma")]
        FORMAT_LZMA => Ok(Box::new(LzmaBackend)),
        #[cfg(not(feature = "lzma"))]
        FORMAT_LZMA => Err(PatchError::CorruptPatch(
            "patch uses lzma streams but the 'lzma' feature is disabled".into(),
        )),

        other => Err(PatchError::CorruptPatch(format!(
            "unknown compressor id {other}"
        ))),
    }
}

/// Human-readable name for a compressor id, for diagnostics.
pub fn name_for_id(id: u8) -> &'static str {
    match id {
        FORMAT_NONE => "none",
        FORMAT_ZLIB => "zlib",
        FORMAT_LZMA => "lzma",
        _ => "unknown",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        b"control control control diff diff diff extra extra extra "
            .iter()
            .copied()
            .cycle()
            .take(2048)
            .collect()
    }

    #[test]
    fn passthrough_is_identity() {
        let backend = Passthrough;
        let data = sample();
        assert_eq!(backend.compress(&data).unwrap(), data);
        assert_eq!(backend.decompress(&data, data.len() as u64).unwrap(), data);
    }

    #[test]
    fn passthrough_enforces_size_budget() {
        let data = sample();
        let result = Passthrough.decompress(&data, data.len() as u64 - 1);
        assert!(matches!(result, Err(PatchError::DecompressionFailure(_))));
    }

    #[cfg(feature = "zlib")]
    #[test]
    fn zlib_roundtrip_and_shrinks() {
        let backend = ZlibBackend::default();
        let data = sample();
        let compressed = backend.compress(&data).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(
            backend.decompress(&compressed, data.len() as u64).unwrap(),
            data
        );
    }

    #[cfg(feature = "lzma")]
    #[test]
    fn lzma_roundtrip_and_shrinks() {
        let backend = LzmaBackend;
        let data = sample();
        let compressed = backend.compress(&data).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(
            backend.decompress(&compressed, data.len() as u64).unwrap(),
            data
        );
    }

    #[cfg(feature = "zlib")]
    #[test]
    fn zlib_rejects_garbage() {
        let backend = ZlibBackend::default();
        let result = backend.decompress(&[0xDE, 0xAD, 0xBE, 0xEF], 1024);
        assert!(matches!(result, Err(PatchError::DecompressionFailure(_))));
    }

    #[cfg(feature = "zlib")]
    #[test]
    fn zlib_enforces_size_budget() {
        // A few KiB of zeros compress to almost nothing; the tiny payload
        // must not be allowed to expand past the budget.
        let backend = ZlibBackend::default();
        let bomb = backend.compress(&vec![0u8; 1 << 20]).unwrap();
        assert!(bomb.len() < 4096);
        let result = backend.decompress(&bomb, 1024);
        assert!(matches!(result, Err(PatchError::DecompressionFailure(_))));
    }

    #[cfg(feature = "lzma")]
    #[test]
    fn lzma_enforces_size_budget() {
        let backend = LzmaBackend;
        let bomb = backend.compress(&vec![0u8; 1 << 20]).unwrap();
        assert!(bomb.len() < 4096);
        let result = backend.decompress(&bomb, 1024);
        assert!(matches!(result, Err(PatchError::DecompressionFailure(_))));
    }

    #[test]
    fn stream_limits_scale_with_target_len() {
        let (control, diff, extra) = stream_limits(100);
        assert_eq!(control, 101 * 24);
        assert_eq!(diff, 100);
        assert_eq!(extra, 100);

        // Saturates instead of overflowing for absurd lengths.
        let (control, _, _) = stream_limits(u64::MAX);
        assert_eq!(control, u64::MAX);
    }

    #[test]
    fn dispatch_by_id() {
        assert_eq!(backend_for_id(FORMAT_NONE).unwrap().id(), FORMAT_NONE);
        #[cfg(feature = "zlib")]
        assert_eq!(backend_for_id(FORMAT_ZLIB).unwrap().id(), FORMAT_ZLIB);
        #[cfg(feature = "lzma")]
        assert_eq!(backend_for_id(FORMAT_LZMA).unwrap().id(), FORMAT_LZMA);
        assert!(matches!(
            backend_for_id(99),
            Err(PatchError::CorruptPatch(_))
        ));
    }

    #[test]
    fn ids_match_choices() {
        assert_eq!(Compression::None.id(), FORMAT_NONE);
        assert_eq!(Compression::None.backend().id(), FORMAT_NONE);
        #[cfg(feature = "zlib")]
        assert_eq!(Compression::Zlib { level: 6 }.backend().id(), FORMAT_ZLIB);
        #[cfg(feature = "lzma")]
        assert_eq!(Compression::Lzma.backend().id(), FORMAT_LZMA);
    }
}
