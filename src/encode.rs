// Three-stream patch encoding.
//
// Consumes the match sequence and produces the raw control, diff and
// extra streams. Per match: one control entry, `len` wrapping byte
// differences appended to the diff stream, and the literal run up to the
// next match appended to the extra stream. The seek of an entry is the
// signed distance from the end of its diff region to the next match's
// source position (0 for the final entry).

use crate::control::ControlEntry;
use crate::matcher::Match;

/// Uncompressed control/diff/extra streams for one diff operation.
#[derive(Debug, Default)]
pub struct RawStreams {
    pub control: Vec<u8>,
    pub diff: Vec<u8>,
    pub extra: Vec<u8>,
    pub entries: usize,
}

/// Encode a match sequence into the three raw streams.
///
/// The match sequence must cover the target contiguously from 0 to
/// `target.len()`, which `Matches` guarantees.
pub fn encode_streams<I>(source: &[u8], target: &[u8], matches: I) -> RawStreams
where
    I: Iterator<Item = Match>,
{
    let mut out = RawStreams::default();
    let mut iter = matches.peekable();
    let mut claimed = 0usize;

    while let Some(m) = iter.next() {
        debug_assert_eq!(m.scan_start, claimed);
        debug_assert!(m.scan_start + m.len <= m.end && m.end <= target.len());
        debug_assert!(m.source_pos + m.len <= source.len());

        for i in 0..m.len {
            out.diff
                .push(target[m.scan_start + i].wrapping_sub(source[m.source_pos + i]));
        }
        out.extra
            .extend_from_slice(&target[m.scan_start + m.len..m.end]);

        let seek = match iter.peek() {
            Some(next) => next.source_pos as i64 - (m.source_pos + m.len) as i64,
            None => 0,
        };
        ControlEntry {
            diff_len: m.len as u64,
            extra_len: m.extra_len() as u64,
            seek,
        }
        .write_to(&mut out.control);

        out.entries += 1;
        claimed = m.end;
    }

    debug_assert_eq!(claimed, target.len());
    out
}
