pub mod batch;
pub mod pool;

pub use batch::{simulate_slate, SlateGame};
pub use pool::WorkerPool;
