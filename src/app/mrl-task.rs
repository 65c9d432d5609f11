use anyhow::Result;
use clap::Parser;
use mrtask::cmd::task::{Args, Commands};
use mrtask::engine::{do_map, do_reduce};
use mrtask::*;
use tracing::{error, info};

fn run(args: Args) -> Result<()> {
    match args.command {
        Commands::Map {
            job,
            task,
            input,
            n_reduce,
            workload,
            dir,
            args,
        } => {
            let engine = workload::named(&workload)?;
            let aux = utils::encode_args(&args)?;
            let job = Job::new(job, dir);
            let shards = do_map(&job, task, &input, n_reduce, |filename, contents| {
                (engine.map_fn)(filename, contents, &aux)
            })?;
            info!("wrote {} shards", shards.len());
        }
        Commands::Reduce {
            job,
            task,
            n_map,
            workload,
            dir,
            args,
        } => {
            let engine = workload::named(&workload)?;
            let aux = utils::encode_args(&args)?;
            let job = Job::new(job, dir);
            let output = do_reduce(&job, task, n_map, |key, values| {
                (engine.reduce_fn)(key, values, &aux)
            })?;
            info!("wrote {:?}", output);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    utils::init_logging();
    let args = Args::parse();
    run(args).inspect_err(|e| error!("task failed: {:#}", e))
}
