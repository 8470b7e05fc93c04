//! Fire-and-forget topic dispatcher and the worker pool it submits to.

pub mod local;
pub mod pool;

pub use local::{LocalMessageQueue, WeakLocalMessageQueue};
pub use pool::WorkerPool;
