// High-level diff/patch entry points.
//
// Diff: suffix index -> match scan -> three-stream encoding -> stream
// compression -> container assembly. Patch: container parsing -> stream
// decompression -> reconstruction. Both operate on in-memory buffers;
// file plumbing lives in `io`.

use crate::apply;
use crate::compress::{self, Compression};
use crate::encode::{RawStreams, encode_streams};
use crate::error::{DiffError, PatchError};
use crate::format::{self, PatchHeader};
use crate::matcher::Matches;
use crate::suffix::{DivSufSort, SuffixIndex, SuffixSort};

/// Configuration for patch generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffOptions {
    /// Stream compression applied to the three patch segments.
    pub compression: Compression,
}

/// Compute a patch transforming `source` into `target`.
pub fn diff(source: &[u8], target: &[u8]) -> Result<Vec<u8>, DiffError> {
    diff_with(source, target, &DiffOptions::default(), &DivSufSort)
}

/// Compute a patch with explicit options and an injected suffix sorter.
pub fn diff_with(
    source: &[u8],
    target: &[u8],
    opts: &DiffOptions,
    sorter: &dyn SuffixSort,
) -> Result<Vec<u8>, DiffError> {
    let index = SuffixIndex::build(source, sorter)?;
    let matches = Matches::new(source, target, &index);
    let raw: RawStreams = encode_streams(source, target, matches);

    log::debug!(
        "diff: {} entries, control {} B, diff {} B, extra {} B (target {} B)",
        raw.entries,
        raw.control.len(),
        raw.diff.len(),
        raw.extra.len(),
        target.len()
    );

    let backend = opts.compression.backend();
    let control = backend.compress(&raw.control)?;
    let diff = backend.compress(&raw.diff)?;
    let extra = backend.compress(&raw.extra)?;

    Ok(format::write_container(
        opts.compression.id(),
        target.len() as u64,
        &control,
        &diff,
        &extra,
    ))
}

/// Reconstruct the target from `source` and a patch container.
pub fn patch(source: &[u8], patch_bytes: &[u8]) -> Result<Vec<u8>, PatchError> {
    let (header, control, diff, extra) = format::read_container(patch_bytes)?;
    let PatchHeader {
        compressor,
        target_len,
        ..
    } = header;

    let backend = compress::backend_for_id(compressor)?;
    let (control_max, diff_max, extra_max) = compress::stream_limits(target_len);
    let control = backend.decompress(control, control_max)?;
    let diff = backend.decompress(diff, diff_max)?;
    let extra = backend.decompress(extra, extra_max)?;

    log::debug!(
        "patch: compressor {}, target {} B, control {} B",
        compress::name_for_id(compressor),
        target_len,
        control.len()
    );

    apply::apply(source, target_len, &control, &diff, &extra)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(source: &[u8], target: &[u8]) {
        let delta = diff(source, target).expect("diff failed");
        let rebuilt = patch(source, &delta).expect("patch failed");
        assert_eq!(
            rebuilt,
            target,
            "roundtrip mismatch (source={}, target={}, delta={})",
            source.len(),
            target.len(),
            delta.len()
        );
    }

    #[test]
    fn roundtrip_identical() {
        let data = b"The quick brown fox jumps over the lazy dog.";
        roundtrip(data, data);
    }

    #[test]
    fn roundtrip_small_edit() {
        let source = b"Hello, world! This is a test of the delta engine.";
        let target = b"Hello, earth! This is a test of the delta engine.";
        roundtrip(source, target);
    }

    #[test]
    fn roundtrip_empty_source() {
        roundtrip(b"", b"ABCDEFGHIJKLMNOPQRSTUVWXYZ");
    }

    #[test]
    fn roundtrip_empty_target() {
        roundtrip(b"some source", b"");
    }

    #[test]
    fn roundtrip_both_empty() {
        roundtrip(b"", b"");
    }

    #[test]
    fn roundtrip_single_bytes() {
        roundtrip(b"A", b"A");
        roundtrip(b"A", b"B");
        roundtrip(b"", b"A");
        roundtrip(b"A", b"");
    }

    #[test]
    fn roundtrip_disjoint_inputs() {
        let source = vec![0x11u8; 300];
        let target = vec![0xEEu8; 500];
        roundtrip(&source, &target);
    }

    #[test]
    fn roundtrip_target_much_longer() {
        let source = b"Start.";
        let mut target = b"Start.".to_vec();
        target.extend((0..4096u32).map(|i| (i % 251) as u8));
        roundtrip(source, &target);
    }

    #[test]
    fn roundtrip_target_shorter() {
        let source: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        roundtrip(&source, &source[..1000]);
    }

    #[test]
    fn roundtrip_binary_mutations() {
        let source: Vec<u8> = (0..=255u8).cycle().take(8192).collect();
        let mut target = source.clone();
        target[100] = 0xFF;
        target[200] = 0x00;
        target[5000] = 0x42;
        roundtrip(&source, &target);
    }

    #[test]
    fn roundtrip_block_move() {
        let a: Vec<u8> = (0..997u32).map(|i| (i % 256) as u8).collect();
        let b: Vec<u8> = (0..1013u32).map(|i| (i * 7 % 256) as u8).collect();
        let mut source = a.clone();
        source.extend_from_slice(&b);
        let mut target = b;
        target.extend_from_slice(&a);
        roundtrip(&source, &target);
    }

    #[test]
    fn diff_is_deterministic() {
        let source: Vec<u8> = (0..4096u32).map(|i| (i % 253) as u8).collect();
        let mut target = source.clone();
        target[17] ^= 0xA5;
        let first = diff(&source, &target).unwrap();
        let second = diff(&source, &target).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn roundtrip_all_compressors() {
        let source = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789abcdefghijklmnopqrstuvwxyz";
        let target =
            b"ABCDEFGHIJKLMNOP--CHANGED--UVWXYZ0123456789abcdefghijklmnopqrstuvwxyz!!!";

        let mut choices = vec![Compression::None];
        #[cfg(feature = "zlib")]
        choices.push(Compression::Zlib { level: 6 });
        #[cfg(feature = "lzma")]
        choices.push(Compression::Lzma);

        for compression in choices {
            let opts = DiffOptions { compression };
            let delta = diff_with(source, target, &opts, &DivSufSort).unwrap();
            let rebuilt = patch(source, &delta).unwrap();
            assert_eq!(rebuilt, target, "compressor {compression:?}");
        }
    }

    #[cfg(feature = "zlib")]
    #[test]
    fn similar_inputs_give_small_patch() {
        let source: Vec<u8> = (0..=255u8).cycle().take(1 << 16).collect();
        let mut target = source.clone();
        target[4096] ^= 0xFF;
        let delta = diff(&source, &target).unwrap();
        assert!(
            delta.len() < target.len() / 8,
            "delta ({}) should be much smaller than target ({})",
            delta.len(),
            target.len()
        );
    }

    #[test]
    fn patching_wrong_source_errors_not_panics() {
        let source = b"correct source bytes for this patch";
        let target = b"correct source bytes for this patch plus some tail";
        let delta = diff(source, target).unwrap();
        assert!(patch(b"xx", &delta).is_err());
    }
}
