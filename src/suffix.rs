// Suffix index construction and longest-match lookup.
//
// The index is a permutation of source offsets sorted by the
// lexicographic order of the suffix starting at each offset. Building it
// is delegated to an injected `SuffixSort` implementation; the default is
// backed by the `divsufsort` crate (O(n log n), deterministic). Lookup is
// a binary search over the sorted suffixes: the longest common prefix
// with a probe is always attained at a neighbor of the probe's insertion
// point.

use std::cmp::Ordering;

use crate::error::DiffError;

/// Builds a suffix index for one byte buffer.
///
/// The returned vector must be a permutation of `[0, text.len())` with
/// `text[sa[i]..] < text[sa[i+1]..]` for all `i`.
pub trait SuffixSort {
    fn build(&self, text: &[u8]) -> Result<Vec<i32>, DiffError>;
}

/// Default suffix sorter backed by the `divsufsort` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DivSufSort;

impl SuffixSort for DivSufSort {
    fn build(&self, text: &[u8]) -> Result<Vec<i32>, DiffError> {
        if text.len() > i32::MAX as usize {
            return Err(DiffError::SourceTooLarge {
                len: text.len(),
                max: i32::MAX as usize,
            });
        }
        let mut sa = vec![0i32; text.len()];
        if !text.is_empty() {
            divsufsort::sort_in_place(text, &mut sa);
        }
        Ok(sa)
    }
}

/// Immutable suffix index over one source buffer, scoped to a single
/// diff operation.
pub struct SuffixIndex<'a> {
    source: &'a [u8],
    sa: Vec<i32>,
}

impl<'a> SuffixIndex<'a> {
    pub fn build(source: &'a [u8], sorter: &dyn SuffixSort) -> Result<Self, DiffError> {
        let sa = sorter.build(source)?;
        Ok(Self { source, sa })
    }

    pub fn len(&self) -> usize {
        self.sa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sa.is_empty()
    }

    /// Find the longest prefix of `probe` that occurs anywhere in the
    /// source. Returns `(source_pos, len)`; `(0, 0)` if nothing matches.
    ///
    /// When several source positions match equally long, the smallest
    /// position wins, so the diff direction is fully deterministic even
    /// for periodic sources.
    pub fn longest_match(&self, probe: &[u8]) -> (usize, usize) {
        if self.sa.is_empty() || probe.is_empty() {
            return (0, 0);
        }
        let source = self.source;

        // Insertion point of the probe in suffix order.
        let ip = self
            .sa
            .partition_point(|&p| &source[p as usize..] < probe);

        let mut len = 0;
        if ip > 0 {
            len = len.max(matchlen(&source[self.sa[ip - 1] as usize..], probe));
        }
        if ip < self.sa.len() {
            len = len.max(matchlen(&source[self.sa[ip] as usize..], probe));
        }
        if len == 0 {
            return (0, 0);
        }

        // All suffixes sharing the `len`-byte prefix form a contiguous
        // run in the index; take the smallest position among them.
        let key = &probe[..len];
        let lo = self
            .sa
            .partition_point(|&p| prefix_cmp(&source[p as usize..], key) == Ordering::Less);
        let hi = self
            .sa
            .partition_point(|&p| prefix_cmp(&source[p as usize..], key) != Ordering::Greater);

        let mut pos = usize::MAX;
        for &p in &self.sa[lo..hi] {
            pos = pos.min(p as usize);
        }
        (pos, len)
    }
}

/// Count matching prefix bytes between two slices.
pub(crate) fn matchlen(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Compare a suffix against a fixed-length key, treating any suffix that
/// starts with the whole key as equal.
fn prefix_cmp(suffix: &[u8], key: &[u8]) -> Ordering {
    let n = suffix.len().min(key.len());
    match suffix[..n].cmp(&key[..n]) {
        Ordering::Equal if suffix.len() < key.len() => Ordering::Less,
        other => other,
    }
}
