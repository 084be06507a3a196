//! `backoffice` — shared-state CRUD substrate for admin dashboards.
//!
//! ARCHITECTURE
//! ============
//! An admin dashboard is dozens of independent management panels rendering
//! tables and forms over one application state tree. This crate is the part
//! they all share: a normalized entity store with scoped slice accessors, the
//! upsert/delete protocol every panel mutates through, a selection/modal state
//! machine that stays coherent while the underlying data moves, and a
//! capability boundary for AI content generation (immediate results for text
//! and images, cancellable polling for long-running video jobs).
//!
//! Panels themselves — the per-domain forms, tables and KPI math — live in
//! the embedding application. They receive a [`store::Store`] handle and a
//! [`panel::PanelSession`], never a mutable reference into a collection:
//! every read is a snapshot, every write goes through the protocol.

pub mod collection;
pub mod genai;
pub mod loader;
pub mod notify;
pub mod panel;
pub mod record;
pub mod services;
pub mod store;

pub use collection::Collection;
pub use record::{Fields, Record, RecordId};
pub use store::{AppData, SliceUpdate, Store};
