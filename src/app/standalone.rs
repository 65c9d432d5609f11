use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{ensure, Result};
use bytes::Bytes;
use clap::Parser;
use glob::glob;
use mrtask::cmd::standalone::Args;
use mrtask::engine::{do_map, do_reduce};
use mrtask::{utils, workload, Job, Workload};
use tokio::task::JoinSet;
use tracing::info;

struct Context {
    job: Job,
    engine: Workload,
    aux: Bytes,
}

fn input_files(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in glob(pattern)? {
        let path = entry?;
        if path.is_file() {
            files.push(path);
        }
    }
    ensure!(!files.is_empty(), "no input files match `{}`", pattern);
    Ok(files)
}

/// Map phase. Returns once every map task has published its shards, which
/// is the barrier the reduce phase depends on.
async fn run_maps(ctx: Arc<Context>, files: Vec<PathBuf>, n_reduce: usize) -> Result<()> {
    let mut tasks = JoinSet::new();
    for (map_task, input) in files.into_iter().enumerate() {
        let ctx = Arc::clone(&ctx);
        tasks.spawn_blocking(move || {
            do_map(&ctx.job, map_task, &input, n_reduce, |filename, contents| {
                (ctx.engine.map_fn)(filename, contents, &ctx.aux)
            })
        });
    }
    while let Some(result) = tasks.join_next().await {
        result??;
    }
    Ok(())
}

async fn run_reduces(ctx: Arc<Context>, n_map: usize, n_reduce: usize) -> Result<Vec<PathBuf>> {
    let mut tasks = JoinSet::new();
    for reduce_task in 0..n_reduce {
        let ctx = Arc::clone(&ctx);
        tasks.spawn_blocking(move || {
            do_reduce(&ctx.job, reduce_task, n_map, |key, values| {
                (ctx.engine.reduce_fn)(key, values, &ctx.aux)
            })
        });
    }
    let mut outputs = Vec::with_capacity(n_reduce);
    while let Some(result) = tasks.join_next().await {
        outputs.push(result??);
    }
    outputs.sort();
    Ok(outputs)
}

#[tokio::main]
async fn main() -> Result<()> {
    utils::init_logging();
    let args = Args::parse();

    let engine = workload::named(&args.workload)?;
    let files = input_files(&args.input)?;
    let n_map = files.len();
    let job_name = args.job.unwrap_or_else(|| args.workload.clone());
    let ctx = Arc::new(Context {
        job: Job::new(job_name, args.dir),
        engine,
        aux: utils::encode_args(&args.args)?,
    });

    info!("running {} map tasks, {} reduce tasks", n_map, args.n_reduce);
    run_maps(Arc::clone(&ctx), files, args.n_reduce).await?;
    for output in run_reduces(ctx, n_map, args.n_reduce).await? {
        info!("output: {:?}", output);
    }
    Ok(())
}
