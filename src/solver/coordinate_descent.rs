//! Local dual coordinate-descent sweeps
//!
//! Each worker runs several Gauss–Seidel sweeps over its own samples,
//! updating one dual variable at a time against a local copy of the weight
//! vector. The weight vector is patched immediately after every accepted
//! update, so later samples in the same sweep see the new weights — sweep
//! order affects convergence speed, not the final optimum.

use crate::core::Sample;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Updates below this projected-gradient magnitude are skipped
const PG_TOLERANCE: f64 = 1e-12;

/// Coordinate-descent state over one worker's partition
pub struct LocalSolver<'a> {
    samples: &'a [Sample],
    /// Cached diagonal `Q_ii = ||x_i||^2 + 0.5/C`
    qd: Vec<f64>,
    /// Visit order, reshuffled once per outer iteration
    index: Vec<usize>,
    diag: f64,
    sweeps: usize,
    rng: StdRng,
}

impl<'a> LocalSolver<'a> {
    /// Build the solver state for a partition.
    ///
    /// `seed` fixes the shuffle sequence; distinct workers should pass
    /// distinct seeds so their visit orders are independent.
    pub fn new(samples: &'a [Sample], c: f64, sweeps: usize, seed: u64) -> Self {
        let diag = 0.5 / c;
        // A zero-norm sample degrades QD to the diagonal term alone;
        // the update still goes through.
        let qd = samples
            .iter()
            .map(|s| s.features.norm_squared() + diag)
            .collect();
        Self {
            samples,
            qd,
            index: (0..samples.len()).collect(),
            diag,
            sweeps,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Run the inner sweeps, mutating `alpha` and the local `w` in place.
    ///
    /// The visit order is Fisher–Yates-shuffled once per call; all sweeps of
    /// the call share that order. On return `w` has drifted from the global
    /// weights it started from — that drift is the worker's local increment.
    pub fn run(&mut self, alpha: &mut [f64], w: &mut [f64]) {
        debug_assert_eq!(alpha.len(), self.samples.len());

        self.index.shuffle(&mut self.rng);

        for _ in 0..self.sweeps {
            for &i in self.index.iter() {
                let sample = &self.samples[i];
                let yi = sample.label;

                let g = yi * sample.features.dot_dense(w) - 1.0 + self.diag * alpha[i];

                // Project onto the active lower bound. The upper bound is
                // +inf, so the mirrored upper-bound branch of the general
                // box-constrained method is unreachable and not carried.
                let pg = if alpha[i] == 0.0 && g >= 0.0 { 0.0 } else { g };

                if pg.abs() > PG_TOLERANCE {
                    let alpha_old = alpha[i];
                    alpha[i] = (alpha_old - g / self.qd[i]).max(0.0);
                    sample.features.add_scaled_to(w, yi * (alpha[i] - alpha_old));
                }
            }
        }
    }
}
