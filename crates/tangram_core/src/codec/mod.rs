//! Compact-transfer codec utilities.
//!
//! # Responsibility
//! - Convert bytes to and from the URL-safe base-85 text form.
//! - Read and write the compact bare-key text format used by share links.
//! - Deflate/inflate payloads for portable transfer.
//!
//! # Invariants
//! - `expand_from_portable(compress_to_portable(s)) == s` for all UTF-8 `s`.
//! - Decoders fail with typed errors on malformed input; they never return
//!   garbage silently.

pub mod base85;
pub mod compact;
pub mod portable;

pub use base85::{decode_base85, encode_base85, EncodingError};
pub use compact::{compact_parse, compact_stringify, ParseError};
pub use portable::{compress_to_portable, expand_from_portable, DecompressionError, PortableError};
