#![no_main]
use libfuzzer_sys::fuzz_target;
use sufdiff::format;

fuzz_target!(|data: &[u8]| {
    // The container parser must reject anything malformed without
    // panicking; on success the returned slices must be in bounds and
    // consistent with the header.
    if let Ok((header, control, diff, extra)) = format::read_container(data) {
        assert_eq!(control.len() as u64, header.control_len);
        assert_eq!(diff.len() as u64, header.diff_len);
        assert_eq!(extra.len() as u64, header.extra_len);
        assert_eq!(
            format::HEADER_SIZE + control.len() + diff.len() + extra.len(),
            data.len()
        );
    }
});
