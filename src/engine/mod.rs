//! Map and reduce task executors.
//!
//! Each executor runs one task start to finish on the calling thread and
//! either publishes all of its output or none of it. Tasks of one job may
//! run concurrently: no two tasks ever write the same path, and reduce tasks
//! only read shards whose map tasks have already finished.

mod map;
mod reduce;
pub mod staged;

pub use map::do_map;
pub use reduce::do_reduce;
