//! Typed procedure surface: registry, authorization gate, error taxonomy.
//!
//! # Responsibility
//! - Declare the fixed set of named operations (queries and mutations).
//! - Gate protected operations on a resolved caller identity.
//! - Map layer errors onto the wire taxonomy.
//!
//! # Invariants
//! - Validation and authorization failures are raised before any
//!   persistence call.
//! - "Not found" and "not owned" are one outcome; existence of foreign
//!   resources never leaks.

pub mod context;
pub mod error;
pub mod registry;
pub mod report;
