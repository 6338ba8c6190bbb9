pub mod common;
pub mod node;
pub mod pod;
pub mod scheduler;
pub mod snapshot;
