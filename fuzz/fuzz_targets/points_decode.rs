//! Fuzz target for shape point-list decoding.

#![no_main]

use acqxfer::points::{decode_points, encode_points};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(points) = decode_points(raw) {
        let _ = decode_points(&encode_points(&points));
    }
});
