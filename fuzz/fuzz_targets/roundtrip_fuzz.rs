#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the source/target split; the rest is payload.
    let split = (data[0] as usize) % data.len();
    let payload = &data[1..];
    let split = split.min(payload.len());
    let (source, target) = payload.split_at(split);

    let delta = sufdiff::diff(source, target).unwrap();
    let rebuilt = sufdiff::patch(source, &delta).unwrap();
    assert_eq!(rebuilt, target);
});
