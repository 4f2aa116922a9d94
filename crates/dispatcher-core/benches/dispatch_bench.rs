// crates/dispatcher-core/benches/dispatch_bench.rs
//
// One Criterion benchmark group:
//   least_loaded — the lock-and-select hot path (GPU + worker selection)
//   at increasing pool shapes, isolated from subprocess spawn and IPC cost.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dispatcher_core::least_loaded;

fn synthetic_state(num_gpus: usize, max_req_per_gpu: usize) -> (Vec<u32>, Vec<Vec<u8>>) {
    let gpu_load: Vec<u32> = (0..num_gpus).map(|g| (g % max_req_per_gpu) as u32).collect();
    let worker_load: Vec<Vec<u8>> = gpu_load
        .iter()
        .map(|&load| {
            let mut row = vec![1u8; max_req_per_gpu];
            for slot in row.iter_mut().take(load as usize) {
                *slot = 0;
            }
            row
        })
        .collect();
    (gpu_load, worker_load)
}

fn least_loaded_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("least_loaded");

    for (name, num_gpus, max_req_per_gpu) in
        [("small_4x8", 4, 8), ("medium_32x16", 32, 16), ("large_256x32", 256, 32)]
    {
        let (gpu_load, worker_load) = synthetic_state(num_gpus, max_req_per_gpu);
        group.bench_function(name, |b| {
            b.iter(|| black_box(least_loaded(black_box(&gpu_load), black_box(&worker_load))))
        });
    }
    group.finish();
}

criterion_group!(benches_least_loaded, least_loaded_selection);
criterion_main!(benches_least_loaded);
