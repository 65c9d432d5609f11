//! File identities shared by map and reduce tasks.
//!
//! A map task and the reduce tasks that later read its output never talk to
//! each other; they agree on file names because both compute them from the
//! job name and task numbers alone.

use std::path::{Path, PathBuf};

/// Name of the shard written by map task `map_task` for reduce task `reduce_task`.
pub fn shard_name(job: &str, map_task: usize, reduce_task: usize) -> String {
    format!("mrtmp.{job}-{map_task}-{reduce_task}")
}

/// Name of the output file written by reduce task `reduce_task`.
pub fn output_name(job: &str, reduce_task: usize) -> String {
    format!("mrtmp.{job}-res-{reduce_task}")
}

/// A job together with the storage directory its files live in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    name: String,
    dir: PathBuf,
}

impl Job {
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn shard_path(&self, map_task: usize, reduce_task: usize) -> PathBuf {
        self.dir.join(shard_name(&self.name, map_task, reduce_task))
    }

    pub fn output_path(&self, reduce_task: usize) -> PathBuf {
        self.dir.join(output_name(&self.name, reduce_task))
    }
}
