//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the durable-storage contract for the project list.
//! - Isolate SQLite query details from store orchestration.
//!
//! # Invariants
//! - The whole project list is persisted under a single storage key; partial
//!   writes never leave a mixed old/new list behind.
//! - Read paths reject undecodable persisted state instead of masking it.

pub mod project_repo;
