//! Tasks Module
//!
//! Background maintenance tasks for the runtime cache.

mod cleanup;

pub use cleanup::spawn_cleanup_task;
