//! Data loading and partitioning
//!
//! Format loaders implementing the Dataset trait, plus the per-worker
//! partition descriptor used by the distributed solver.

pub mod libsvm;
pub mod partition;
pub mod tsv;

pub use self::libsvm::*;
pub use self::partition::*;
pub use self::tsv::*;
