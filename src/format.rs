// Patch container layout.
//
//   [magic (6)] [version (1)] [compressor id (1)]
//   [u64 control_len] [u64 diff_len] [u64 extra_len] [u64 target_len]
//   [control stream] [diff stream] [extra stream]
//
// All integers little-endian. The header lengths are the exact byte
// lengths of the (possibly compressed) stream segments that follow, so a
// decoder slices the container without scanning. `read_container` is
// defensive: every length field is bounds-checked against the container
// before any allocation or copy.

use crate::error::PatchError;

pub const MAGIC: [u8; 6] = *b"SUFDIF";
pub const VERSION: u8 = 1;
pub const HEADER_SIZE: usize = 40;

/// Upper bound on a declared target length. Anything above this is
/// treated as adversarial rather than attempted.
pub const MAX_TARGET_LEN: u64 = 1 << 40;

/// Parsed patch container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchHeader {
    /// Stream compressor id (see `compress`).
    pub compressor: u8,
    pub control_len: u64,
    pub diff_len: u64,
    pub extra_len: u64,
    pub target_len: u64,
}

/// Assemble a container from the three encoded streams.
pub fn write_container(
    compressor: u8,
    target_len: u64,
    control: &[u8],
    diff: &[u8],
    extra: &[u8],
) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_SIZE + control.len() + diff.len() + extra.len());
    out.extend_from_slice(&MAGIC);
    out.push(VERSION);
    out.push(compressor);
    out.extend_from_slice(&(control.len() as u64).to_le_bytes());
    out.extend_from_slice(&(diff.len() as u64).to_le_bytes());
    out.extend_from_slice(&(extra.len() as u64).to_le_bytes());
    out.extend_from_slice(&target_len.to_le_bytes());
    out.extend_from_slice(control);
    out.extend_from_slice(diff);
    out.extend_from_slice(extra);
    out
}

/// Parse a container, returning the header and the three stream slices.
pub fn read_container(container: &[u8]) -> Result<(PatchHeader, &[u8], &[u8], &[u8]), PatchError> {
    if container.len() < HEADER_SIZE {
        return Err(PatchError::CorruptPatch(format!(
            "container too short: {} bytes, header needs {HEADER_SIZE}",
            container.len()
        )));
    }
    if container[..6] != MAGIC {
        return Err(PatchError::CorruptPatch("bad magic".into()));
    }
    if container[6] != VERSION {
        return Err(PatchError::CorruptPatch(format!(
            "unsupported version {}",
            container[6]
        )));
    }

    let header = PatchHeader {
        compressor: container[7],
        control_len: read_u64_le(&container[8..16]),
        diff_len: read_u64_le(&container[16..24]),
        extra_len: read_u64_le(&container[24..32]),
        target_len: read_u64_le(&container[32..40]),
    };

    if header.target_len > MAX_TARGET_LEN {
        return Err(PatchError::CorruptPatch(format!(
            "declared target length {} exceeds limit {MAX_TARGET_LEN}",
            header.target_len
        )));
    }

    // The declared lengths must account for the body exactly; anything
    // else means the header or the body was damaged.
    let body = (container.len() - HEADER_SIZE) as u128;
    let declared =
        header.control_len as u128 + header.diff_len as u128 + header.extra_len as u128;
    if declared != body {
        return Err(PatchError::CorruptPatch(format!(
            "declared stream lengths sum to {declared} but container body is {body} bytes"
        )));
    }

    // Cast is safe: each length is bounded by the in-memory body size.
    let control_end = HEADER_SIZE + header.control_len as usize;
    let diff_end = control_end + header.diff_len as usize;
    let extra_end = diff_end + header.extra_len as usize;

    Ok((
        header,
        &container[HEADER_SIZE..control_end],
        &container[control_end..diff_end],
        &container[diff_end..extra_end],
    ))
}

fn read_u64_le(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}
