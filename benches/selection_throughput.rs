//! Scoring and selection throughput benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::path::PathBuf;

use uuvr_loader::discovery::{parse_candidates, ArtifactPattern, CandidateArtifact, DiscoveredFile};
use uuvr_loader::probe::{BackendKind, HostFingerprint};
use uuvr_loader::resolver::{score, select};
use uuvr_loader::version::VersionTriple;

fn host() -> HostFingerprint {
    HostFingerprint::new(
        BackendKind::AheadOfTimeCompiled,
        "NET48",
        VersionTriple::parse("2020.3.47f1"),
    )
}

/// A release matrix: every backend/ABI pair across `count` engine versions.
fn release_matrix(count: usize) -> Vec<DiscoveredFile> {
    let pattern = ArtifactPattern::default();
    let mut files = Vec::with_capacity(count * 4);
    for i in 0..count {
        let token = format!("{}_{}_{}f1", 2017 + (i % 8), i % 5, i % 50);
        for (backend, abi) in [("IL2CPP", "NET48"), ("Mono", "NET48"), ("Mono", "NET35"), ("IL2CPP", "NET35")] {
            let name = pattern.file_name(backend, abi, &token);
            files.push(DiscoveredFile {
                path: PathBuf::from("/impl").join(&name),
                file_name: name,
            });
        }
    }
    files
}

fn candidates(count: usize) -> Vec<CandidateArtifact> {
    parse_candidates(&release_matrix(count), &ArtifactPattern::default()).candidates
}

fn bench_score(c: &mut Criterion) {
    let host = host();
    let pool = candidates(64);

    c.bench_function("score_single", |b| {
        b.iter(|| score(black_box(&host), black_box(&pool[0])))
    });
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("select");
    let host = host();

    for count in [8usize, 64, 512] {
        let pool = candidates(count);
        group.throughput(Throughput::Elements(pool.len() as u64));
        group.bench_with_input(BenchmarkId::new("candidates", pool.len()), &pool, |b, pool| {
            b.iter(|| select(black_box(&host), black_box(pool)))
        });
    }

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let pattern = ArtifactPattern::default();
    let files = release_matrix(128);

    let mut group = c.benchmark_group("parse_candidates");
    group.throughput(Throughput::Elements(files.len() as u64));
    group.bench_function("release_matrix", |b| {
        b.iter(|| parse_candidates(black_box(&files), black_box(&pattern)))
    });
    group.finish();
}

criterion_group!(benches, bench_score, bench_select, bench_parse);
criterion_main!(benches);
