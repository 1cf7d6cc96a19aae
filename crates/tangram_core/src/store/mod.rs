//! Project store orchestration: selection, autosave, share links, import
//! and export.
//!
//! # Responsibility
//! - Own the authoritative in-memory project list and the current selection.
//! - Serialize the debounced autosave against live scene mutation.
//! - Drive the share-link pipeline end to end.
//!
//! # Invariants
//! - The project list is sorted by `lastEdited` descending whenever it is
//!   persisted or exposed to callers.
//! - While a load is populating the live scene, autosave is fully
//!   suppressed; a transient scene state is never persisted over real data.

pub mod autosave;
pub mod project_store;

pub use autosave::{AutosaveScheduler, DEFAULT_AUTOSAVE_DELAY};
pub use project_store::{
    share_payload_from_url, strip_share_param, ProjectStore, StoreError, SHARE_PARAM,
};
