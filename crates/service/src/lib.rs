//! Service layer owning the question collection and its persistence.
//! - Separates store operations from the HTTP transport.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod runtime;
pub mod file;
