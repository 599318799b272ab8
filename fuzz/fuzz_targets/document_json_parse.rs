//! Fuzz target for interchange document parsing.
//!
//! Feeds arbitrary UTF-8 to the document parser and re-serializes
//! whatever parses, checking for panics, crashes, or hangs.

#![no_main]

use acqxfer::interchange::io_json::{from_json_str, to_json_string};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(document) = from_json_str(json) {
        let _ = to_json_string(&document);
    }
});
