//! In-process reduction service for data-parallel workers
//!
//! Workers operating in lock-step submit one contribution per round; a
//! caller-supplied merge operator combines them, and every worker observes
//! the combined value once the call returns. Each `reduce` call is a full
//! barrier: no value becomes visible until every member has arrived, and a
//! member that never arrives blocks the group indefinitely. The accumulator
//! is dropped at the end of every round, so groups are reusable across
//! outer iterations without carrying state over.
//!
//! Independent named aggregations are independent `Allreduce` instances;
//! they synchronize nothing with each other.

use crate::core::{Result, SvmError};
use std::sync::{Condvar, Mutex, MutexGuard};

/// A reusable all-reduce barrier over a fixed member count
pub struct Allreduce<T> {
    members: usize,
    combine: Box<dyn Fn(&mut T, T) + Send + Sync>,
    state: Mutex<RoundState<T>>,
    barrier: Condvar,
}

struct RoundState<T> {
    /// Partial accumulation of the in-flight round
    acc: Option<T>,
    /// Members that have contributed to the in-flight round
    joined: usize,
    /// Completed round counter
    round: u64,
    /// Published result, kept until every member has read it
    result: Option<T>,
    /// Members that still need to read the published result
    pending_readers: usize,
}

impl<T: Clone> Allreduce<T> {
    /// Create a reduction group for `members` workers with the given merge
    /// operator. The accumulator is seeded by the first contribution of each
    /// round, so the operator's identity element never has to be named.
    pub fn new<F>(members: usize, combine: F) -> Self
    where
        F: Fn(&mut T, T) + Send + Sync + 'static,
    {
        assert!(members > 0, "Reduction group needs at least one member");
        Self {
            members,
            combine: Box::new(combine),
            state: Mutex::new(RoundState {
                acc: None,
                joined: 0,
                round: 0,
                result: None,
                pending_readers: 0,
            }),
            barrier: Condvar::new(),
        }
    }

    /// Number of workers the barrier expects
    pub fn members(&self) -> usize {
        self.members
    }

    /// Submit this worker's contribution and block until the round's
    /// combined value is available.
    pub fn reduce(&self, contribution: T) -> Result<T> {
        let mut state = self.lock()?;

        // A fast worker re-entering for the next round waits until the
        // previous round's result has been read by everyone.
        while state.result.is_some() {
            state = self.wait(state)?;
        }

        match state.acc.as_mut() {
            Some(acc) => (self.combine)(acc, contribution),
            None => state.acc = Some(contribution),
        }
        state.joined += 1;

        if state.joined == self.members {
            // Last to arrive publishes and releases the barrier
            state.result = state.acc.take();
            state.pending_readers = self.members;
            state.joined = 0;
            state.round += 1;
            self.barrier.notify_all();
        } else {
            let round = state.round;
            while state.round == round {
                state = self.wait(state)?;
            }
        }

        let combined = state
            .result
            .clone()
            .ok_or_else(|| SvmError::Synchronization("reduction result vanished mid-round".into()))?;
        state.pending_readers -= 1;
        if state.pending_readers == 0 {
            state.result = None;
            self.barrier.notify_all();
        }
        Ok(combined)
    }

    fn lock(&self) -> Result<MutexGuard<'_, RoundState<T>>> {
        self.state.lock().map_err(|_| {
            SvmError::Synchronization("a worker died while holding the reduction lock".into())
        })
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, RoundState<T>>) -> Result<MutexGuard<'a, RoundState<T>>> {
        self.barrier.wait(guard).map_err(|_| {
            SvmError::Synchronization("a worker died while peers waited at the barrier".into())
        })
    }
}

impl Allreduce<f64> {
    /// Scalar sum-reduction
    pub fn sum(members: usize) -> Self {
        Allreduce::new(members, |acc, c| *acc += c)
    }

    /// Scalar min-reduction (identity `+inf` is implicit: the first
    /// contribution seeds the accumulator)
    pub fn min(members: usize) -> Self {
        Allreduce::new(members, |acc, c: f64| *acc = acc.min(c))
    }
}

impl Allreduce<Vec<f64>> {
    /// Elementwise sum-reduction over fixed-length vectors
    pub fn sum_vec(members: usize) -> Self {
        Allreduce::new(members, |acc: &mut Vec<f64>, c: Vec<f64>| {
            debug_assert_eq!(acc.len(), c.len(), "contribution length mismatch");
            for (a, b) in acc.iter_mut().zip(c) {
                *a += b;
            }
        })
    }
}

impl Allreduce<Vec<usize>> {
    /// Elementwise sum-reduction over count vectors
    pub fn sum_counts(members: usize) -> Self {
        Allreduce::new(members, |acc: &mut Vec<usize>, c: Vec<usize>| {
            debug_assert_eq!(acc.len(), c.len(), "contribution length mismatch");
            for (a, b) in acc.iter_mut().zip(c) {
                *a += b;
            }
        })
    }
}

impl Allreduce<(usize, usize)> {
    /// Pairwise sum-reduction, used for (errors, total) tallies
    pub fn sum_pair(members: usize) -> Self {
        Allreduce::new(members, |acc, c: (usize, usize)| {
            acc.0 += c.0;
            acc.1 += c.1;
        })
    }
}

/// The named reduction groups one training job needs
pub struct ReduceChannels {
    /// One-time per-worker sample-count exchange
    pub sample_counts: Allreduce<Vec<usize>>,
    /// Per-iteration increment aggregate of length `dim + 3`
    pub increment: Allreduce<Vec<f64>>,
    /// Per-iteration global step-length ceiling
    pub step_ceiling: Allreduce<f64>,
    /// Per-iteration hinge-loss total
    pub hinge_loss: Allreduce<f64>,
    /// Evaluator (errors, total) tally
    pub eval_counts: Allreduce<(usize, usize)>,
}

impl ReduceChannels {
    /// Create the channel set for a group of `workers`
    pub fn new(workers: usize) -> Self {
        Self {
            sample_counts: Allreduce::sum_counts(workers),
            increment: Allreduce::sum_vec(workers),
            step_ceiling: Allreduce::min(workers),
            hinge_loss: Allreduce::sum(workers),
            eval_counts: Allreduce::sum_pair(workers),
        }
    }
}
