pub mod dispatcher;
pub mod error;
pub mod queue;
pub mod topics;
