//! Reading documents as text.
//!
//! Documents are read whole and decoded according to their byte-order mark.
//! Files without a mark are treated as UTF-8. Everything sxi writes is
//! UTF-8 without a mark.

use std::path::Path;

use crate::SxiError;
use crate::SxiResult;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16BE_BOM: &[u8] = &[0xFE, 0xFF];

/// The encoding a document was detected as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
	Utf8,
	Utf8Bom,
	Utf16Le,
	Utf16Be,
}

/// Read the file at `path` and decode it to a `String`.
pub fn read_text(path: &Path) -> SxiResult<String> {
	let bytes = std::fs::read(path)?;
	decode_text(&bytes).ok_or_else(|| {
		SxiError::InvalidEncoding {
			path: path.display().to_string(),
		}
	})
}

/// Detect the encoding of `bytes` from its byte-order mark.
pub fn detect_encoding(bytes: &[u8]) -> TextEncoding {
	if bytes.starts_with(UTF8_BOM) {
		TextEncoding::Utf8Bom
	} else if bytes.starts_with(UTF16LE_BOM) {
		TextEncoding::Utf16Le
	} else if bytes.starts_with(UTF16BE_BOM) {
		TextEncoding::Utf16Be
	} else {
		TextEncoding::Utf8
	}
}

/// Decode `bytes` with the detected encoding, dropping any byte-order mark.
/// Returns `None` when the content is not valid in that encoding.
pub fn decode_text(bytes: &[u8]) -> Option<String> {
	match detect_encoding(bytes) {
		TextEncoding::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
		TextEncoding::Utf8Bom => String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).ok(),
		TextEncoding::Utf16Le => decode_utf16(&bytes[UTF16LE_BOM.len()..], u16::from_le_bytes),
		TextEncoding::Utf16Be => decode_utf16(&bytes[UTF16BE_BOM.len()..], u16::from_be_bytes),
	}
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Option<String> {
	if bytes.len() % 2 != 0 {
		return None;
	}

	let units: Vec<u16> = bytes
		.chunks_exact(2)
		.map(|pair| to_unit([pair[0], pair[1]]))
		.collect();
	String::from_utf16(&units).ok()
}
