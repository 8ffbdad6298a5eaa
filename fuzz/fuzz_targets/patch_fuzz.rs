#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Fuzz the patch applier with arbitrary container bytes.
    // It must never panic, only return errors.
    let _ = sufdiff::patch(&[], data);

    // Also fuzz with a non-empty source.
    if data.len() >= 2 {
        let split = data.len() / 2;
        let (source, delta) = data.split_at(split);
        let _ = sufdiff::patch(source, delta);
    }
});
