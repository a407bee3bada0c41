//! # planwise-store
//!
//! Task repository implementations for the planwise scheduling engine:
//!
//! - [`JsonTaskRepository`]: a file-backed store using the canonical JSON
//!   form (a flat array of task objects with ISO-8601 timestamps)
//! - [`InMemoryTaskRepository`]: an ephemeral store for tests and
//!   embedding
//!
//! Both honor the same contract: ids are assigned on first persist,
//! `created_at` is stamped on insert and `updated_at` on every write, and
//! `save_all` is an upsert.

mod json;
mod memory;

pub use json::JsonTaskRepository;
pub use memory::InMemoryTaskRepository;
