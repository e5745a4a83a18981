//! Fuzz target for artifact file name matching and candidate parsing.

#![no_main]

use std::path::PathBuf;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use uuvr_loader::discovery::{parse_candidates, ArtifactPattern, DiscoveredFile};

#[derive(Debug, Arbitrary)]
struct Input {
    names: Vec<String>,
}

fuzz_target!(|input: Input| {
    let pattern = ArtifactPattern::default();
    let files: Vec<DiscoveredFile> = input
        .names
        .into_iter()
        .map(|name| DiscoveredFile {
            path: PathBuf::from("/impl").join(&name),
            file_name: name,
        })
        .collect();

    // Every accepted candidate carries a usable version.
    let set = parse_candidates(&files, &pattern);
    for candidate in &set.candidates {
        assert!(candidate.is_parseable());
        assert!(pattern.matches(&candidate.raw_file_name));
    }
});
