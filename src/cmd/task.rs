use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Run a single map or reduce task and exit.
///
/// Exits with a non-zero status if the task fails, so the scheduler can
/// run it again.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Partition one input split into intermediate shards
    Map {
        /// Name of the job
        #[arg(short, long)]
        job: String,

        /// Map task number
        #[arg(short, long)]
        task: usize,

        /// Input split to read
        #[arg(short, long)]
        input: PathBuf,

        /// Number of reduce tasks in the job
        #[arg(short, long)]
        n_reduce: usize,

        /// Name of the workload
        #[arg(short, long)]
        workload: String,

        /// Directory holding the job's files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Auxiliary arguments to pass to the MapReduce application.
        #[clap(value_parser, last = true)]
        args: Vec<String>,
    },
    /// Merge the shards of every map task into one sorted output file
    Reduce {
        /// Name of the job
        #[arg(short, long)]
        job: String,

        /// Reduce task number
        #[arg(short, long)]
        task: usize,

        /// Number of map tasks in the job
        #[arg(short, long)]
        n_map: usize,

        /// Name of the workload
        #[arg(short, long)]
        workload: String,

        /// Directory holding the job's files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Auxiliary arguments to pass to the MapReduce application.
        #[clap(value_parser, last = true)]
        args: Vec<String>,
    },
}
