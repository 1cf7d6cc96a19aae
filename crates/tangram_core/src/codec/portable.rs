//! Deflate + base-85 transport encoding for share-link payloads.
//!
//! # Responsibility
//! - Shrink a text payload with zlib deflate at maximum compression and wrap
//!   it in base-85 text safe for URL embedding (after percent escaping).
//!
//! # Invariants
//! - `expand_from_portable(compress_to_portable(s)?) == s` for all UTF-8 `s`.
//! - Corrupt or truncated input fails with a typed error.

use crate::codec::base85::{decode_base85, encode_base85, EncodingError};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{Read, Write};

/// A compressed payload could not be restored.
#[derive(Debug)]
pub struct DecompressionError {
    pub message: String,
}

impl Display for DecompressionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "corrupt compressed payload: {}", self.message)
    }
}

impl Error for DecompressionError {}

/// Failure anywhere in the portable-transport pipeline.
#[derive(Debug)]
pub enum PortableError {
    Encoding(EncodingError),
    Decompression(DecompressionError),
}

impl Display for PortableError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encoding(err) => write!(f, "{err}"),
            Self::Decompression(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PortableError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encoding(err) => Some(err),
            Self::Decompression(err) => Some(err),
        }
    }
}

impl From<EncodingError> for PortableError {
    fn from(value: EncodingError) -> Self {
        Self::Encoding(value)
    }
}

impl From<DecompressionError> for PortableError {
    fn from(value: DecompressionError) -> Self {
        Self::Decompression(value)
    }
}

/// Deflates `text` at maximum compression and encodes the result as base-85.
///
/// # Errors
/// Only fails if the in-memory deflate stream itself errors, which is not
/// expected during normal operation.
pub fn compress_to_portable(text: &str) -> Result<String, PortableError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(text.as_bytes())
        .and_then(|()| encoder.finish())
        .map(|compressed| encode_base85(&compressed))
        .map_err(|err| {
            PortableError::Decompression(DecompressionError {
                message: format!("deflate failed: {err}"),
            })
        })
}

/// Decodes base-85 text, inflates it and restores the original UTF-8 text.
///
/// # Errors
/// - [`PortableError::Encoding`] when a character falls outside the base-85
///   alphabet.
/// - [`PortableError::Decompression`] when the zlib stream is corrupt or the
///   inflated bytes are not valid UTF-8.
pub fn expand_from_portable(encoded: &str) -> Result<String, PortableError> {
    let compressed = decode_base85(encoded)?;

    let mut inflated = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut inflated)
        .map_err(|err| DecompressionError {
            message: format!("inflate failed: {err}"),
        })?;

    String::from_utf8(inflated).map_err(|_| {
        PortableError::Decompression(DecompressionError {
            message: "decompressed payload is not valid UTF-8".to_string(),
        })
    })
}
