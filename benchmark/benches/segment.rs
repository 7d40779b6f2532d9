// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Shared memory segment microbenchmarks.
//!
//! Measures segment create/destroy cost and write bandwidth into a mapping
//! at various sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use namedipc_benchmark::SegmentDir;
use namedipc_core::SharedMemorySegment;
use std::time::Duration;

/// Segment sizes to benchmark (in bytes).
const SEGMENT_SIZES: &[usize] = &[4096, 65536, 1024 * 1024];

/// Benchmark a full create, map, unlink and unmap cycle.
fn bench_create_destroy(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment_lifecycle");
    group.measurement_time(Duration::from_secs(5));

    let dir = SegmentDir::new().expect("Failed to create temp dir");

    for &size in SEGMENT_SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let path = dir.path(&format!("lifecycle_{}", size));
            b.iter(|| {
                let mut segment =
                    SharedMemorySegment::create(path.clone(), size).expect("create failed");
                black_box(segment.get());
                segment.destroy();
            });
        });
    }

    group.finish();
}

/// Benchmark filling the whole mapping.
fn bench_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment_fill");
    group.measurement_time(Duration::from_secs(5));

    let dir = SegmentDir::new().expect("Failed to create temp dir");

    for &size in SEGMENT_SIZES {
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut segment = SharedMemorySegment::create(dir.path(&format!("fill_{}", size)), size)
                .expect("create failed");

            b.iter(|| {
                // SAFETY: this benchmark is the only user of the mapping
                let bytes = unsafe { segment.as_mut_slice() };
                bytes.fill(black_box(0xAB));
                black_box(bytes[size - 1]);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_create_destroy, bench_fill);

criterion_main!(benches);
