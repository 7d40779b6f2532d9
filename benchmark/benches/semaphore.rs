// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Named semaphore microbenchmarks.
//!
//! Measures the uncontended cost of the P/V pair, of the scoped guard built
//! on it, and of a full create and destroy cycle.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use namedipc_benchmark::unique_sem_name;
use namedipc_core::{with_lock, NamedSemaphore, ScopedLock};
use std::time::Duration;

/// Benchmark an uncontended post followed by wait.
fn bench_post_wait(c: &mut Criterion) {
    let mut group = c.benchmark_group("semaphore");
    group.measurement_time(Duration::from_secs(3));

    let sem = NamedSemaphore::open_or_create(unique_sem_name("post_wait"), 1)
        .expect("Failed to create semaphore");

    group.bench_function("post_wait", |b| {
        b.iter(|| {
            sem.post().expect("post failed");
            sem.wait().expect("wait failed");
        });
    });

    group.bench_function("scoped_lock", |b| {
        b.iter(|| {
            let guard = ScopedLock::acquire(&sem).expect("acquire failed");
            black_box(guard.is_locked());
        });
    });

    group.bench_function("with_lock", |b| {
        b.iter(|| with_lock(&sem, || black_box(1u64)).expect("with_lock failed"));
    });

    group.finish();
}

/// Benchmark the exclusive-create path followed by destroy.
fn bench_create_destroy(c: &mut Criterion) {
    let mut group = c.benchmark_group("semaphore_lifecycle");
    group.measurement_time(Duration::from_secs(3));

    let name = unique_sem_name("lifecycle");

    group.bench_function("create_destroy", |b| {
        b.iter(|| {
            let mut sem = NamedSemaphore::open_or_create(name.clone(), 1).expect("create failed");
            black_box(sem.is_valid());
            sem.destroy();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_post_wait, bench_create_destroy);

criterion_main!(benches);
