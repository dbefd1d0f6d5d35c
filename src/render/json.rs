//! JSON rendering for segmented documents.

use std::io::Write;

use crate::error::{Error, Result};
use crate::model::Document;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a document to JSON.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(doc),
        JsonFormat::Compact => serde_json::to_string(doc),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Write documents as JSON lines: one compact object per line.
pub fn write_json_lines<'d, W: Write>(
    writer: &mut W,
    docs: impl IntoIterator<Item = &'d Document>,
) -> Result<()> {
    for doc in docs {
        writeln!(writer, "{}", to_json(doc, JsonFormat::Compact)?)?;
    }
    Ok(())
}

/// Read a document back from its JSON form.
pub fn from_json(json: &str) -> Result<Document> {
    Ok(serde_json::from_str(json)?)
}
