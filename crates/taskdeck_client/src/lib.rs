//! Client-side state layer for Taskdeck.
//!
//! Owns the query cache, the optimistic-update protocol, and the batching
//! dispatcher that talks to the core procedure surface. The UI layer calls
//! into [`Client`] and renders whatever the cache holds; it never talks to
//! durable storage directly.

pub mod cache;
pub mod client;
pub mod dispatcher;

pub use cache::{CacheEntry, CacheSnapshot, EntryStatus, FetchTicket, QueryCache, QueryKey};
pub use client::{
    all_projects_key, project_detail_key, report_key, Client, MutationHandle, MutationStatus,
};
pub use dispatcher::{BatchDispatcher, InProcessTransport, Transport, TransportError};
