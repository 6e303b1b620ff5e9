//! Background Tasks Module
//!
//! Contains background tasks that run periodically during service operation.
//!
//! # Tasks
//! - Housekeeping: evicts expired entries and stale failures at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
