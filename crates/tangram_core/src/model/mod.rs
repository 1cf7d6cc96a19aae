//! Domain model for the tangram editor core.
//!
//! # Responsibility
//! - Define the canonical piece/scene/project shapes shared by persistence,
//!   the share-link codec and the presentation layer.
//!
//! # Invariants
//! - Piece order inside a scene is the paint order (later entries render on
//!   top).
//! - Every piece and every project carries a stable UUID identity.

pub mod piece;
pub mod project;
pub mod scene;
