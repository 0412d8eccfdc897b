//! Fuzz target for record snapshot JSON parsing.
//!
//! Tests that deserializing and validating arbitrary bytes as a
//! `RecordSet` never panics, only returns errors.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rt_common::RecordSet;

fuzz_target!(|data: &[u8]| {
    if let Ok(records) = serde_json::from_slice::<RecordSet>(data) {
        let _ = records.validate();
    }
});
