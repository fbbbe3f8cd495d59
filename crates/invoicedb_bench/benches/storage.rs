//! Line file benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use invoicedb_storage::{InMemoryLines, LineBackend, LineFile};
use tempfile::TempDir;

/// Creates a line of `size` printable bytes.
fn line_of(size: usize) -> String {
    (0..size).map(|i| (b'a' + (i % 26) as u8) as char).collect()
}

/// Creates a line file holding `count` lines of `size` bytes.
fn populated_file(dir: &TempDir, count: usize, size: usize) -> LineFile {
    let mut file = LineFile::open(&dir.path().join("bench.db")).unwrap();
    let line = line_of(size);
    for _ in 0..count {
        file.write_line(&line).unwrap();
    }
    file
}

/// Benchmark InMemoryLines append operations.
fn bench_inmemory_write_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("inmemory_write_line");

    for size in [64, 256, 1024].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let mut lines = InMemoryLines::new();
            let line = line_of(size);

            b.iter(|| lines.write_line(black_box(&line)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark LineFile append operations.
fn bench_file_write_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_write_line");

    // Use larger sample size for file operations
    group.sample_size(50);

    for size in [256, 1024, 4096].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let temp_dir = TempDir::new().unwrap();
            let mut file = LineFile::open(&temp_dir.path().join("bench.db")).unwrap();
            let line = line_of(size);

            b.iter(|| file.write_line(black_box(&line)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark reading every line of a file.
fn bench_file_read_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_read_lines");
    group.sample_size(50);

    for count in [100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let temp_dir = TempDir::new().unwrap();
            let file = populated_file(&temp_dir, count, 256);

            b.iter(|| black_box(file.read_lines().unwrap()));
        });
    }

    group.finish();
}

/// Benchmark the reverse scan for the last line.
///
/// Cost should stay flat as the file grows.
fn bench_file_read_last_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_read_last_line");

    for count in [100, 10_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let temp_dir = TempDir::new().unwrap();
            let file = populated_file(&temp_dir, count, 256);

            b.iter(|| black_box(file.read_last_line().unwrap()));
        });
    }

    group.finish();
}

/// Benchmark removing a line, which rewrites the whole file.
fn bench_file_remove_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_remove_line");
    group.sample_size(20); // Rewrite is slow

    for count in [100, 1_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let temp_dir = TempDir::new().unwrap();
            let mut file = populated_file(&temp_dir, count, 256);
            let line = line_of(256);

            b.iter(|| {
                file.remove_line(black_box(1)).unwrap();
                file.write_line(&line).unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_inmemory_write_line,
    bench_file_write_line,
    bench_file_read_lines,
    bench_file_read_last_line,
    bench_file_remove_line,
);

criterion_main!(benches);
