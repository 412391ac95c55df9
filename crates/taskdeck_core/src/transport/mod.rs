//! Wire contract between the client crate and the procedure layer.
//!
//! # Responsibility
//! - Define the batch envelope and per-call outcome types.
//! - Execute whole batches against a `Router` with per-call failure
//!   isolation.

pub mod server;
pub mod wire;
