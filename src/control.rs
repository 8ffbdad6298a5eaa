// Control entry wire encoding.
//
// One entry per match: `(u64 diff_len, u64 extra_len, i64 seek)`, each
// field little-endian, 24 bytes total. The concatenation of
// `diff_len + extra_len` over all entries must equal the target length;
// the applier enforces that.

use crate::error::PatchError;

/// Size of one serialized control entry.
pub const CONTROL_ENTRY_SIZE: usize = 24;

/// One control triple: how to interleave diff and extra data during
/// reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlEntry {
    /// Bytes reconstructed by adding diff-stream bytes to the source.
    pub diff_len: u64,
    /// Bytes copied literally from the extra stream.
    pub extra_len: u64,
    /// Signed source-cursor adjustment applied after both phases.
    pub seek: i64,
}

impl ControlEntry {
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.diff_len.to_le_bytes());
        out.extend_from_slice(&self.extra_len.to_le_bytes());
        out.extend_from_slice(&self.seek.to_le_bytes());
    }

    fn read(chunk: &[u8]) -> Self {
        Self {
            diff_len: read_u64_le(&chunk[0..8]),
            extra_len: read_u64_le(&chunk[8..16]),
            seek: read_u64_le(&chunk[16..24]) as i64,
        }
    }
}

fn read_u64_le(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

/// Iterator over the entries of a decoded control stream.
pub struct ControlReader<'a> {
    stream: &'a [u8],
}

impl<'a> ControlReader<'a> {
    /// Fails if the stream length is not a whole number of entries.
    pub fn new(stream: &'a [u8]) -> Result<Self, PatchError> {
        if stream.len() % CONTROL_ENTRY_SIZE != 0 {
            return Err(PatchError::MalformedControlStream(format!(
                "control stream length {} is not a multiple of {CONTROL_ENTRY_SIZE}",
                stream.len()
            )));
        }
        Ok(Self { stream })
    }

    pub fn remaining(&self) -> usize {
        self.stream.len() / CONTROL_ENTRY_SIZE
    }
}

impl Iterator for ControlReader<'_> {
    type Item = ControlEntry;

    fn next(&mut self) -> Option<ControlEntry> {
        if self.stream.is_empty() {
            return None;
        }
        let (chunk, rest) = self.stream.split_at(CONTROL_ENTRY_SIZE);
        self.stream = rest;
        Some(ControlEntry::read(chunk))
    }
}
