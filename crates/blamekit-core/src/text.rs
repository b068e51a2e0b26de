//! Splitting blob content into lines.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// How many leading bytes are inspected for a NUL when sniffing binary content.
const BINARY_SNIFF_LEN: usize = 8000;

/// What a store does with content that is not plain UTF-8 text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryPolicy {
    /// Decode with replacement characters and split like text.
    #[default]
    Lossy,
    /// Fail with `MalformedContent`.
    Reject,
}

impl BinaryPolicy {
    /// Parse a policy name as used on the command line.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lossy" => Some(BinaryPolicy::Lossy),
            "reject" => Some(BinaryPolicy::Reject),
            _ => None,
        }
    }
}

/// Whether content looks binary: a NUL byte near the start.
pub fn is_binary(content: &[u8]) -> bool {
    content[..content.len().min(BINARY_SNIFF_LEN)].contains(&0)
}

/// Decode raw blob bytes and split them into lines.
pub fn decode_lines(content: &[u8], policy: BinaryPolicy) -> Result<Vec<String>> {
    match policy {
        BinaryPolicy::Lossy => Ok(split_lines(&String::from_utf8_lossy(content))),
        BinaryPolicy::Reject => {
            if is_binary(content) {
                return Err(Error::MalformedContent("binary content".to_string()));
            }
            let text = std::str::from_utf8(content)
                .map_err(|e| Error::MalformedContent(format!("invalid UTF-8: {}", e)))?;
            Ok(split_lines(text))
        }
    }
}

/// Split text on `\n`, dropping the empty segment after a final terminator.
///
/// `"a\nb\n"` and `"a\nb"` both give `["a", "b"]`; `""` gives no lines.
/// Carriage returns stay part of the line.
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text.split('\n').map(String::from).collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}
