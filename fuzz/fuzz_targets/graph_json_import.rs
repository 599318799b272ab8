//! Fuzz target for importing arbitrary documents onto a fixed server.
//!
//! Any parsed document is imported onto one blank image; import may fail
//! but must never panic.

#![no_main]

use acqxfer::import::{import_document, ImportOptions};
use acqxfer::interchange::io_json::from_json_str;
use acqxfer::report::TranscodeReport;
use acqxfer::session::{MemorySession, Session};
use acqxfer::source::{Channel, Image, Pixels};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(document) = from_json_str(json) else {
        return;
    };

    let mut session = MemorySession::new();
    let mut targets = Vec::with_capacity(document.images.len());
    for image in &document.images {
        let blank = Image {
            pixels: Some(Pixels {
                channels: vec![Channel::default(); image.pixels.channels.len()],
                ..Default::default()
            }),
            ..Default::default()
        };
        let Ok(stored) = session.persist(blank) else {
            return;
        };
        let Some(id) = stored.id else {
            return;
        };
        targets.push(id);
    }

    let mut report = TranscodeReport::new("import");
    let _ = import_document(
        &mut session,
        &document,
        &targets,
        &ImportOptions::default(),
        &mut report,
    );
});
