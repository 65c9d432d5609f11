use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use tracing::{debug, info};

use crate::codec::{CodecError, ShardReader};
use crate::engine::staged::StagedWriter;
use crate::error::{Phase, Result, TaskError};
use crate::{Job, KeyValue};

/// Run reduce task `reduce_task` of `job`, merging the shards written for it
/// by map tasks `0..n_map`.
///
/// Values are grouped by key and the reduce function is called once per
/// distinct key with exactly that key's values, in ascending key order. The
/// output file holds one record per key, sorted by key, and replaces any
/// previous output of this task. Every map task must have finished before
/// this is called; a shard that does not exist fails the task with
/// [`TaskError::MissingShard`].
///
/// Returns the output path.
pub fn do_reduce<F>(job: &Job, reduce_task: usize, n_map: usize, mut reduce_fn: F) -> Result<PathBuf>
where
    F: FnMut(&str, &[String]) -> anyhow::Result<String>,
{
    if n_map == 0 {
        return Err(TaskError::InvalidArgument(
            "n_map must be at least 1".to_string(),
        ));
    }
    info!(job = job.name(), reduce_task, n_map, "reduce task started");

    let mut intermediate = Vec::new();
    for map_task in 0..n_map {
        let path = job.shard_path(map_task, reduce_task);
        let before = intermediate.len();
        read_shard(&path, map_task, &mut intermediate)?;
        debug!(?path, records = intermediate.len() - before, "shard read");
    }

    // Values stay in map task order, then shard order, within each key.
    let groups = intermediate
        .into_iter()
        .map(|kv| (kv.key, kv.value))
        .into_group_map();

    let output = job.output_path(reduce_task);
    let mut writer = StagedWriter::create(&output)?;
    for (key, values) in groups.into_iter().sorted_unstable_by(|a, b| a.0.cmp(&b.0)) {
        let value = reduce_fn(&key, &values).map_err(|source| TaskError::Callback {
            phase: Phase::Reduce,
            source,
        })?;
        writer.encode(&KeyValue { key, value })?;
    }
    let keys = writer.written();
    let path = writer.finish()?.publish()?;

    info!(job = job.name(), reduce_task, keys, "reduce task finished");
    Ok(path)
}

fn read_shard(path: &Path, map_task: usize, into: &mut Vec<KeyValue>) -> Result<()> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(TaskError::MissingShard {
                map_task,
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(TaskError::ShardRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    for kv in ShardReader::new(file) {
        match kv {
            Ok(kv) => into.push(kv),
            Err(CodecError::Io(source)) => {
                return Err(TaskError::ShardRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
            Err(CodecError::Malformed { record, source }) => {
                return Err(TaskError::Decode {
                    path: path.to_path_buf(),
                    record,
                    source,
                })
            }
        }
    }
    Ok(())
}
