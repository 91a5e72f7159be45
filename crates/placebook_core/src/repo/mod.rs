//! Persistence boundary abstractions and implementations.
//!
//! # Responsibility
//! - Define the key-value contract the store mirrors its state into.
//! - Isolate SQLite query details from store orchestration.
//!
//! # Invariants
//! - Mediums store opaque text; schema knowledge lives in the store codec.

pub mod kv_repo;
