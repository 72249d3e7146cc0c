// ============================================================
// SOURCE ENCODINGS
// ============================================================
// Ordered fallback chain of text encodings tried by the loader

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use crate::domain::error::{AppError, Result};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Bytes Windows-1252 leaves unassigned
const CP1252_UNDEFINED: &[u8] = &[0x81, 0x8D, 0x8F, 0x90, 0x9D];

/// Encoding a source file was decoded with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceEncoding {
    Utf8,
    Utf8Sig,
    Utf16,
    Cp1252,
    Latin1,
    /// Last resort: UTF-8 with invalid sequences replaced
    Utf8Lossy,
}

impl SourceEncoding {
    /// Strict candidates in priority order
    pub const CHAIN: [SourceEncoding; 5] = [
        SourceEncoding::Utf8,
        SourceEncoding::Utf8Sig,
        SourceEncoding::Utf16,
        SourceEncoding::Cp1252,
        SourceEncoding::Latin1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceEncoding::Utf8 => "utf-8",
            SourceEncoding::Utf8Sig => "utf-8-sig",
            SourceEncoding::Utf16 => "utf-16",
            SourceEncoding::Cp1252 => "cp1252",
            SourceEncoding::Latin1 => "latin1",
            SourceEncoding::Utf8Lossy => "utf-8 (errors=replace)",
        }
    }

    /// Decode raw bytes, failing on anything this encoding cannot represent
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>> {
        match self {
            SourceEncoding::Utf8 => {
                if bytes.starts_with(UTF8_BOM) {
                    return Err(self.decode_error("input starts with a UTF-8 byte order mark"));
                }
                UTF_8
                    .decode_without_bom_handling_and_without_replacement(bytes)
                    .ok_or_else(|| self.decode_error("invalid byte sequence"))
            }
            SourceEncoding::Utf8Sig => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                UTF_8
                    .decode_without_bom_handling_and_without_replacement(body)
                    .ok_or_else(|| self.decode_error("invalid byte sequence"))
            }
            SourceEncoding::Utf16 => match Encoding::for_bom(bytes) {
                Some((encoding, bom_len)) if encoding == UTF_16LE || encoding == UTF_16BE => {
                    encoding
                        .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
                        .ok_or_else(|| self.decode_error("invalid code unit sequence"))
                }
                _ => Err(self.decode_error("no UTF-16 byte order mark")),
            },
            SourceEncoding::Cp1252 => {
                if let Some(offset) = bytes.iter().position(|b| CP1252_UNDEFINED.contains(b)) {
                    return Err(self.decode_error(&format!(
                        "byte 0x{:02X} at offset {} is undefined",
                        bytes[offset], offset
                    )));
                }
                WINDOWS_1252
                    .decode_without_bom_handling_and_without_replacement(bytes)
                    .ok_or_else(|| self.decode_error("invalid byte sequence"))
            }
            SourceEncoding::Latin1 => Ok(encoding_rs::mem::decode_latin1(bytes)),
            SourceEncoding::Utf8Lossy => {
                let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
                if had_errors {
                    tracing::warn!("Replaced invalid UTF-8 sequences while decoding");
                }
                Ok(text)
            }
        }
    }

    fn decode_error(&self, reason: &str) -> AppError {
        AppError::Parse(format!("cannot decode as {}: {}", self.as_str(), reason))
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
