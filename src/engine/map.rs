use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::engine::staged::StagedWriter;
use crate::error::{Phase, Result, TaskError};
use crate::{partition, Job, KeyValue};

/// Run map task `map_task` of `job` over the split at `input`.
///
/// The map function is called once with the split's name and contents. Its
/// output is partitioned by key into `n_reduce` shards, and every shard file
/// is written, including empty ones. Previous shards of this task are
/// replaced. Shards are only published once all of them are complete, so a
/// failed run leaves the canonical paths as they were.
///
/// Returns the shard paths, indexed by reduce task.
pub fn do_map<F>(
    job: &Job,
    map_task: usize,
    input: &Path,
    n_reduce: usize,
    map_fn: F,
) -> Result<Vec<PathBuf>>
where
    F: FnOnce(&str, &str) -> anyhow::Result<Vec<KeyValue>>,
{
    if n_reduce == 0 {
        return Err(TaskError::InvalidArgument(
            "n_reduce must be at least 1".to_string(),
        ));
    }
    info!(job = job.name(), map_task, ?input, n_reduce, "map task started");

    let contents = fs::read_to_string(input).map_err(|source| TaskError::InputRead {
        path: input.to_path_buf(),
        source,
    })?;
    let filename = input.to_string_lossy();
    let kvs = map_fn(&filename, &contents).map_err(|source| TaskError::Callback {
        phase: Phase::Map,
        source,
    })?;
    let emitted = kvs.len();

    let buckets = partition_all(kvs, n_reduce);

    let mut staged = Vec::with_capacity(n_reduce);
    for (reduce_task, bucket) in buckets.iter().enumerate() {
        let mut writer = StagedWriter::create(&job.shard_path(map_task, reduce_task))?;
        for kv in bucket {
            writer.encode(kv)?;
        }
        staged.push(writer.finish()?);
    }

    let mut paths = Vec::with_capacity(n_reduce);
    for (reduce_task, shard) in staged.into_iter().enumerate() {
        let path = shard.publish()?;
        debug!(?path, records = buckets[reduce_task].len(), "shard published");
        paths.push(path);
    }

    info!(job = job.name(), map_task, emitted, "map task finished");
    Ok(paths)
}

/// Split `kvs` into `n_reduce` buckets by [`partition`], keeping emission
/// order inside each bucket.
fn partition_all(kvs: Vec<KeyValue>, n_reduce: usize) -> Vec<Vec<KeyValue>> {
    let mut buckets = vec![Vec::new(); n_reduce];
    for kv in kvs {
        let bucket_no = partition(&kv.key, n_reduce);
        buckets[bucket_no].push(kv);
    }
    buckets
}
