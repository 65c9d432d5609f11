use std::path::PathBuf;

use clap::Parser;

/// Run a whole job on this machine: every map task, then every reduce task.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Glob spec for the input files, one map task per file
    #[arg(short, long)]
    pub input: String,

    /// Name of the workload
    #[arg(short, long)]
    pub workload: String,

    /// Name of the job, defaults to the workload name
    #[arg(short, long)]
    pub job: Option<String>,

    /// Number of reduce tasks
    #[arg(short, long, default_value_t = 10)]
    pub n_reduce: usize,

    /// Directory for intermediate and output files
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Auxiliary arguments to pass to the MapReduce application.
    #[clap(value_parser, last = true)]
    pub args: Vec<String>,
}
