// Scan-and-extend match engine (Colin Percival's bsdiff policy).
//
// The target is scanned left to right. At each unclaimed position the
// suffix index yields the longest exact match in the source; the match is
// accepted only once it beats the "drift" score of simply continuing the
// previous match's alignment. Accepted boundaries are then refined by
// forward/backward fuzzy extension, which absorbs isolated byte mutations
// into one long approximate match instead of splitting it.
//
// The scan is inherently sequential: each step depends on the boundary
// decided by the previous one.

use crate::suffix::SuffixIndex;

/// A fresh match must beat the drift score by this many bytes before the
/// scan commits to it.
const MISMATCH_THRESHOLD: usize = 8;

/// One approximate match of a target region against the source.
///
/// Bytes in `[scan_start, scan_start + len)` are encoded as wrapping
/// differences against `source[source_pos..]`; bytes in
/// `[scan_start + len, end)` are the literal extra run that follows.
/// Matches are contiguous: the next match starts exactly at `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub scan_start: usize,
    pub len: usize,
    pub source_pos: usize,
    pub end: usize,
}

impl Match {
    /// Length of the literal run between this match and the next.
    pub fn extra_len(&self) -> usize {
        self.end - (self.scan_start + self.len)
    }
}

/// Lazy, non-restartable sequence of matches covering the whole target.
pub struct Matches<'a> {
    source: &'a [u8],
    target: &'a [u8],
    index: &'a SuffixIndex<'a>,
    scan: usize,
    len: usize,
    pos: usize,
    last_scan: usize,
    last_pos: usize,
    last_offset: i64,
}

impl<'a> Matches<'a> {
    pub fn new(source: &'a [u8], target: &'a [u8], index: &'a SuffixIndex<'a>) -> Self {
        Self {
            source,
            target,
            index,
            scan: 0,
            len: 0,
            pos: 0,
            last_scan: 0,
            last_pos: 0,
            last_offset: 0,
        }
    }
}

impl Iterator for Matches<'_> {
    type Item = Match;

    fn next(&mut self) -> Option<Match> {
        let source = self.source;
        let target = self.target;
        let source_size = source.len();
        let target_size = target.len();

        while self.scan < target_size {
            let mut old_score: i64 = 0;
            self.scan += self.len;
            let mut scsc = self.scan;

            while self.scan < target_size {
                let (pos, len) = self.index.longest_match(&target[self.scan..]);
                self.pos = pos;
                self.len = len;

                // Score the same span under the previous alignment.
                while scsc < self.scan + self.len {
                    let drift_idx = scsc as i64 + self.last_offset;
                    if (0..source_size as i64).contains(&drift_idx)
                        && source[drift_idx as usize] == target[scsc]
                    {
                        old_score += 1;
                    }
                    scsc += 1;
                }

                // Commit when the drift explains the match exactly (keep
                // scanning past it) or the match clearly beats the drift.
                if (self.len as i64 == old_score && self.len != 0)
                    || self.len as i64 > old_score + MISMATCH_THRESHOLD as i64
                {
                    break;
                }

                // The byte being skipped leaves the scoring window.
                let drift_idx = self.scan as i64 + self.last_offset;
                if (0..source_size as i64).contains(&drift_idx)
                    && source[drift_idx as usize] == target[self.scan]
                {
                    old_score -= 1;
                }

                self.scan += 1;
            }

            if self.len as i64 != old_score || self.scan == target_size {
                // Forward fuzzy extension of the previous match: grow while
                // agreements outweigh mismatches (score 2*matches - length).
                let mut s: i64 = 0;
                let mut best_s: i64 = 0;
                let mut len_forward: usize = 0;
                let mut i: usize = 0;
                while self.last_scan + i < self.scan && self.last_pos + i < source_size {
                    if source[self.last_pos + i] == target[self.last_scan + i] {
                        s += 1;
                    }
                    i += 1;
                    if s * 2 - i as i64 > best_s * 2 - len_forward as i64 {
                        best_s = s;
                        len_forward = i;
                    }
                }

                // Backward fuzzy extension of the new match.
                let mut len_back: usize = 0;
                if self.scan < target_size {
                    let mut s: i64 = 0;
                    let mut best_s: i64 = 0;
                    let mut i: usize = 1;
                    while self.scan >= self.last_scan + i && self.pos >= i {
                        if source[self.pos - i] == target[self.scan - i] {
                            s += 1;
                        }
                        if s * 2 - i as i64 > best_s * 2 - len_back as i64 {
                            best_s = s;
                            len_back = i;
                        }
                        i += 1;
                    }
                }

                // The two extensions may claim the same target bytes; pick
                // the split point that maximizes total agreement.
                if self.last_scan + len_forward > self.scan - len_back {
                    let overlap = (self.last_scan + len_forward) - (self.scan - len_back);
                    let mut s: i64 = 0;
                    let mut best_s: i64 = 0;
                    let mut split: usize = 0;
                    for i in 0..overlap {
                        if target[self.last_scan + len_forward - overlap + i]
                            == source[self.last_pos + len_forward - overlap + i]
                        {
                            s += 1;
                        }
                        if target[self.scan - len_back + i] == source[self.pos - len_back + i] {
                            s -= 1;
                        }
                        if s > best_s {
                            best_s = s;
                            split = i + 1;
                        }
                    }
                    len_forward += split;
                    len_forward -= overlap;
                    len_back -= split;
                }

                let m = Match {
                    scan_start: self.last_scan,
                    len: len_forward,
                    source_pos: self.last_pos,
                    end: self.scan - len_back,
                };

                self.last_scan = self.scan - len_back;
                self.last_pos = self.pos - len_back;
                self.last_offset = self.pos as i64 - self.scan as i64;

                return Some(m);
            }
        }

        None
    }
}
