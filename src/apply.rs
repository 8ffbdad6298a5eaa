// Patch application: deterministic target reconstruction.
//
// A state machine driven by the control stream. Per entry: a diff phase
// (wrapping add of diff-stream bytes onto the source window), an extra
// phase (literal copy from the extra stream), then a signed seek of the
// source cursor. Every cursor movement is checked before any byte is
// produced; the operation never reads the output it has written and
// never writes the source.

use crate::control::ControlReader;
use crate::error::PatchError;

/// Reconstruct the target from the source and decoded patch streams.
///
/// On success the returned buffer is exactly `target_len` bytes. All
/// failure modes leave no partial output in the caller's hands.
pub fn apply(
    source: &[u8],
    target_len: u64,
    control: &[u8],
    diff: &[u8],
    extra: &[u8],
) -> Result<Vec<u8>, PatchError> {
    let target_len = usize::try_from(target_len)
        .map_err(|_| PatchError::CorruptPatch("target length exceeds address space".into()))?;

    // Every output byte comes from either the diff or the extra stream,
    // so a declared length beyond their sum can never be satisfied.
    // Checking up front keeps the allocation below proportional to the
    // patch actually supplied.
    if target_len > diff.len().saturating_add(extra.len()) {
        return Err(PatchError::MalformedControlStream(format!(
            "target length {target_len} exceeds {} diff and {} extra bytes available",
            diff.len(),
            extra.len()
        )));
    }

    let mut target = Vec::with_capacity(target_len);
    let mut source_cursor: usize = 0;
    let mut diff_cursor: usize = 0;
    let mut extra_cursor: usize = 0;

    for entry in ControlReader::new(control)? {
        let diff_len = usize::try_from(entry.diff_len).map_err(|_| {
            PatchError::MalformedControlStream("diff length exceeds address space".into())
        })?;
        let extra_len = usize::try_from(entry.extra_len).map_err(|_| {
            PatchError::MalformedControlStream("extra length exceeds address space".into())
        })?;

        let claimed = diff_len
            .checked_add(extra_len)
            .and_then(|span| span.checked_add(target.len()))
            .ok_or_else(|| {
                PatchError::MalformedControlStream("control entry spans overflow".into())
            })?;
        if claimed > target_len {
            return Err(PatchError::MalformedControlStream(format!(
                "control entries claim {claimed} bytes but target length is {target_len}"
            )));
        }

        // Diff phase.
        if source_cursor.checked_add(diff_len).is_none_or(|e| e > source.len()) {
            return Err(PatchError::SourceOverrun(format!(
                "diff phase needs source bytes {source_cursor}..{} but source is {} bytes",
                source_cursor as u128 + diff_len as u128,
                source.len()
            )));
        }
        if diff_cursor + diff_len > diff.len() {
            return Err(PatchError::MalformedControlStream(
                "diff stream underflow".into(),
            ));
        }
        for i in 0..diff_len {
            target.push(source[source_cursor + i].wrapping_add(diff[diff_cursor + i]));
        }
        source_cursor += diff_len;
        diff_cursor += diff_len;

        // Extra phase.
        if extra_cursor + extra_len > extra.len() {
            return Err(PatchError::MalformedControlStream(
                "extra stream underflow".into(),
            ));
        }
        target.extend_from_slice(&extra[extra_cursor..extra_cursor + extra_len]);
        extra_cursor += extra_len;

        // Seek. Negative values are legal (matched content may reappear
        // earlier in the source), but the cursor must stay in bounds.
        let seeked = source_cursor as i128 + entry.seek as i128;
        if seeked < 0 || seeked > source.len() as i128 {
            return Err(PatchError::SourceOverrun(format!(
                "seek {} moves source cursor to {seeked}, outside 0..={}",
                entry.seek,
                source.len()
            )));
        }
        source_cursor = seeked as usize;
    }

    if target.len() != target_len {
        return Err(PatchError::MalformedControlStream(format!(
            "control entries sum to {} bytes but target length is {target_len}",
            target.len()
        )));
    }
    if diff_cursor != diff.len() || extra_cursor != extra.len() {
        return Err(PatchError::MalformedControlStream(format!(
            "{} diff and {} extra bytes left unconsumed",
            diff.len() - diff_cursor,
            extra.len() - extra_cursor
        )));
    }

    Ok(target)
}
