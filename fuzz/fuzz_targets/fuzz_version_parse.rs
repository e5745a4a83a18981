//! Fuzz target for engine version token parsing.
//!
//! Arbitrary tokens must never panic, and anything that parses must format
//! back to a token that parses to the same triple.

#![no_main]

use libfuzzer_sys::fuzz_target;
use uuvr_loader::version::VersionTriple;

fuzz_target!(|data: &[u8]| {
    let Ok(token) = std::str::from_utf8(data) else {
        return;
    };

    let parsed = VersionTriple::parse(token);
    if parsed.is_unparseable() {
        return;
    }
    assert_eq!(VersionTriple::parse(&parsed.to_string()), parsed);
    assert_eq!(VersionTriple::parse(&parsed.to_underscored()), parsed);
});
