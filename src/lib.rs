//! Task execution core of a MapReduce worker.
//!
//! A map task reads one input split, runs the application map function over
//! it and partitions the emitted pairs into `n_reduce` shard files. A reduce
//! task reads the shards addressed to it by every map task, groups values by
//! key and writes one sorted output file. Scheduling, retries and transport
//! belong to whoever calls into this crate.

use hash32::Hasher as _;
use serde::{Deserialize, Serialize};
use std::hash::Hasher;

pub mod cmd;
pub mod codec;
pub mod engine;
pub mod error;
pub mod naming;
pub mod utils;
pub mod workload;

pub use error::{Result, TaskError};
pub use naming::Job;

/////////////////////////////////////////////////////////////////////////////
// MapReduce application types
/////////////////////////////////////////////////////////////////////////////

/// A map function takes the name of an input split, its full contents and
/// auxiliary arguments.
///
/// It returns every key-value pair emitted for that split.
pub type MapFn = fn(filename: &str, contents: &str, aux: &bytes::Bytes) -> anyhow::Result<Vec<KeyValue>>;

/// A reduce function takes in a key, all values recorded for that key and
/// an auxiliary argument. It returns an [`anyhow::Result`]
/// containing a single output value.
///
/// The order of `values` carries no meaning; implementations must not
/// depend on it.
pub type ReduceFn = fn(key: &str, values: &[String], aux: &bytes::Bytes) -> anyhow::Result<String>;

/// A map reduce application.
#[derive(Copy, Clone)]
pub struct Workload {
    pub map_fn: MapFn,
    pub reduce_fn: ReduceFn,
}

/////////////////////////////////////////////////////////////////////////////
// Key-value pairs
/////////////////////////////////////////////////////////////////////////////

/// A single key-value pair.
///
/// Serialized as `{"Key":..,"Value":..}`, the field names other MapReduce
/// workers already write, so shards can be exchanged with them.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeyValue {
    /// The key.
    pub key: String,
    /// The value.
    pub value: String,
}

impl KeyValue {
    /// Construct a new key-value pair from the given key and value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Consumes the key-value pair and returns the key.
    #[inline]
    pub fn into_key(self) -> String {
        self.key
    }

    /// Consumes the key-value pair and returns the value.
    #[inline]
    pub fn into_value(self) -> String {
        self.value
    }
}

/////////////////////////////////////////////////////////////////////////////
// Partitioning
/////////////////////////////////////////////////////////////////////////////

/// Hashes an intermediate key with 32-bit FNV-1a, masked to 31 bits.
///
/// Every worker of a job has to agree on this value, including workers that
/// re-execute a task after a crash or run in another language runtime, so it
/// must never depend on per-process state such as a randomly seeded hasher.
pub fn ihash(key: &[u8]) -> u32 {
    let mut hasher = hash32::FnvHasher::default();
    hasher.write(key);
    hasher.finish32() & 0x7fff_ffff
}

/// Compute the reduce partition for `key` as `ihash(key) % n_reduce`.
///
/// `n_reduce` must be at least 1.
#[inline]
pub fn partition(key: &str, n_reduce: usize) -> usize {
    debug_assert!(n_reduce > 0, "n_reduce must be positive");
    ihash(key.as_bytes()) as usize % n_reduce
}
