//! Benchmarks for the distributed solver
//!
//! Measures the local coordinate-descent sweeps and end-to-end training on
//! synthetic separable data at a few worker counts.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dsvm::api::SvmTrainer;
use dsvm::solver::LocalSolver;
use dsvm::{Sample, SparseVector};

/// Deterministic synthetic dataset: two Gaussian-ish blobs on a diagonal
fn synthetic_samples(n: usize, dim: usize) -> Vec<Sample> {
    (0..n)
        .map(|i| {
            let label = if i % 2 == 0 { 1.0 } else { -1.0 };
            let spread = ((i * 37 % 100) as f64 / 100.0) - 0.5;
            let indices: Vec<usize> = (0..dim).collect();
            let values: Vec<f64> = (0..dim)
                .map(|j| label * (1.0 + 0.1 * j as f64) + spread)
                .collect();
            Sample::new(SparseVector::new(indices, values), label)
        })
        .collect()
}

struct SyntheticDataset {
    samples: Vec<Sample>,
    dim: usize,
}

impl dsvm::Dataset for SyntheticDataset {
    fn len(&self) -> usize {
        self.samples.len()
    }
    fn dim(&self) -> usize {
        self.dim
    }
    fn get_sample(&self, i: usize) -> Sample {
        self.samples[i].clone()
    }
}

fn bench_local_sweeps(c: &mut Criterion) {
    let samples = synthetic_samples(500, 20);

    c.bench_function("local_sweeps_500x20", |b| {
        b.iter(|| {
            let mut solver = LocalSolver::new(&samples, 1.0, 5, 42);
            let mut alpha = vec![0.0; samples.len()];
            let mut w = vec![0.0; 20];
            solver.run(&mut alpha, &mut w);
            black_box(w)
        })
    });
}

fn bench_end_to_end(c: &mut Criterion) {
    let dataset = SyntheticDataset {
        samples: synthetic_samples(400, 10),
        dim: 10,
    };

    let mut group = c.benchmark_group("train_400x10");
    for workers in [1usize, 2, 4] {
        group.bench_with_input(
            BenchmarkId::from_parameter(workers),
            &workers,
            |b, &workers| {
                b.iter(|| {
                    SvmTrainer::new()
                        .with_max_iter(10)
                        .with_max_inner_iter(3)
                        .with_workers(workers)
                        .with_seed(1)
                        .train(black_box(&dataset))
                        .unwrap()
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_local_sweeps, bench_end_to_end);
criterion_main!(benches);
