//! File-backed stores
//!
//! JSON file persistence for state small enough that a database is overkill.

pub mod qa_store;
