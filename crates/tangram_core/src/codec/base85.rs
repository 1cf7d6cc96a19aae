//! Base-85 binary-to-text conversion.
//!
//! # Responsibility
//! - Encode byte payloads into a compact 85-character text form for URL
//!   embedding, and decode them back losslessly.
//!
//! # Invariants
//! - The byte payload is treated as one big-endian unsigned integer, so
//!   leading zero bytes are not preserved. Callers only feed zlib streams
//!   here, which never start with a zero byte.
//! - Empty input encodes to the empty string, and `""` decodes to no bytes.

use once_cell::sync::Lazy;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// The fixed 85-character alphabet (the ZeroMQ Z85 character set).
///
/// Several members are reserved URL characters; share-link assembly percent
/// escapes the encoded text before embedding it in a query string.
pub const ALPHABET: &[u8; 85] =
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ.-:+=^!/*?&<>()[]{}@%$#";

static ALPHABET_INDEX: Lazy<[i16; 128]> = Lazy::new(|| {
    let mut table = [-1i16; 128];
    for (index, &byte) in ALPHABET.iter().enumerate() {
        table[usize::from(byte)] = index as i16;
    }
    table
});

/// A character outside the base-85 alphabet was found while decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingError {
    pub character: char,
    pub position: usize,
}

impl Display for EncodingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "character `{}` at position {} is not in the base-85 alphabet",
            self.character, self.position
        )
    }
}

impl Error for EncodingError {}

/// Encodes bytes as base-85 text.
///
/// The payload is interpreted as a single big-endian unsigned integer and
/// repeatedly divided by 85, emitting one alphabet character per remainder.
pub fn encode_base85(bytes: &[u8]) -> String {
    // Big-endian base-256 digits of the remaining value.
    let mut digits: Vec<u8> = bytes.iter().copied().skip_while(|&b| b == 0).collect();
    let mut encoded: Vec<u8> = Vec::new();

    while !digits.is_empty() {
        let mut remainder: u32 = 0;
        let mut quotient: Vec<u8> = Vec::with_capacity(digits.len());
        for &digit in &digits {
            let acc = (remainder << 8) | u32::from(digit);
            let q = acc / 85;
            remainder = acc % 85;
            if !quotient.is_empty() || q != 0 {
                quotient.push(q as u8);
            }
        }
        encoded.push(ALPHABET[remainder as usize]);
        digits = quotient;
    }

    encoded.iter().rev().map(|&b| char::from(b)).collect()
}

/// Decodes base-85 text back into the original byte payload.
///
/// # Errors
/// Fails with [`EncodingError`] on the first character that is not part of
/// the alphabet.
pub fn decode_base85(text: &str) -> Result<Vec<u8>, EncodingError> {
    // Big-endian base-256 accumulator: value = value * 85 + digit.
    let mut value: Vec<u8> = Vec::new();

    for (position, character) in text.chars().enumerate() {
        let digit = character
            .is_ascii()
            .then(|| ALPHABET_INDEX[character as usize])
            .filter(|&index| index >= 0)
            .ok_or(EncodingError {
                character,
                position,
            })?;

        let mut carry = digit as u32;
        for byte in value.iter_mut().rev() {
            let acc = u32::from(*byte) * 85 + carry;
            *byte = (acc & 0xFF) as u8;
            carry = acc >> 8;
        }
        while carry > 0 {
            value.insert(0, (carry & 0xFF) as u8);
            carry >>= 8;
        }
    }

    Ok(value)
}
