//! Core domain logic for the tangram puzzle editor.
//! This crate is the single source of truth for project persistence and the
//! compact share-link codec.

pub mod codec;
pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;
pub mod wire;

pub use codec::{
    compact_parse, compact_stringify, compress_to_portable, decode_base85, encode_base85,
    expand_from_portable, DecompressionError, EncodingError, ParseError, PortableError,
};
pub use export::scene_to_svg;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::piece::{Piece, PieceId, ShapeKind};
pub use model::project::{
    validate_project_name, ProjectId, ProjectRecord, ValidationError, DEFAULT_PROJECT_NAME,
};
pub use model::scene::{Point, PointerInput, Scene};
pub use repo::project_repo::{
    MemoryProjectStorage, ProjectStorage, RepoError, RepoResult, SqliteProjectStorage,
    PROJECTS_KEY,
};
pub use store::{
    share_payload_from_url, strip_share_param, AutosaveScheduler, ProjectStore, StoreError,
    DEFAULT_AUTOSAVE_DELAY, SHARE_PARAM,
};
pub use wire::{decode_wire, encode_wire, from_wire, to_wire, WireError, WirePiece, WireProject};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
