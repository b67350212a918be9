//! Background Tasks Module
//!
//! # Tasks
//! - Cache prune: sweeps expired entries at a configured interval

mod cleanup;

pub use cleanup::spawn_prune_task;
