//! Failures of a single map or reduce task.
//!
//! Every variant is fatal to the task that raised it. The caller sees
//! either success or one of these, and decides whether to run the task again.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for task execution.
pub type Result<T> = std::result::Result<T, TaskError>;

/// Which callback failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Map,
    Reduce,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Map => f.write_str("map"),
            Phase::Reduce => f.write_str("reduce"),
        }
    }
}

#[derive(Error, Debug)]
pub enum TaskError {
    /// The input split of a map task could not be read.
    #[error("failed to read input {path:?}: {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A shard exists but could not be opened or read.
    #[error("failed to read shard {path:?}: {source}")]
    ShardRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A shard a reduce task depends on was never published.
    #[error("shard {path:?} from map task {map_task} is missing")]
    MissingShard { map_task: usize, path: PathBuf },

    /// A shard or output file holds a record that does not decode.
    #[error("malformed record #{record} in {path:?}: {source}")]
    Decode {
        path: PathBuf,
        record: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Writing, syncing or publishing a file failed.
    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The application map or reduce function returned an error.
    #[error("{phase} function failed: {source}")]
    Callback {
        phase: Phase,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl TaskError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// True if the task failed because an upstream map task has not
    /// published its output yet.
    pub fn is_missing_shard(&self) -> bool {
        matches!(self, Self::MissingShard { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_shard_names_the_map_task() {
        let err = TaskError::MissingShard {
            map_task: 4,
            path: PathBuf::from("mrtmp.wc-4-0"),
        };
        assert!(err.is_missing_shard());
        assert!(err.to_string().contains("map task 4"));
    }

    #[test]
    fn callback_error_names_the_phase() {
        let err = TaskError::Callback {
            phase: Phase::Reduce,
            source: anyhow::anyhow!("bad number"),
        };
        assert!(!err.is_missing_shard());
        assert_eq!(err.to_string(), "reduce function failed: bad number");
    }
}
