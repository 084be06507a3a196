//! Flows that compose the store with the generation boundary.
//!
//! ARCHITECTURE
//! ============
//! Service functions own the side effects the adapter contract leaves to the
//! caller: snapshotting the target record, driving deferred jobs, merging
//! payloads through the upsert protocol, and surfacing failures as
//! notifications instead of letting them near the synchronous store path.

pub mod content;
