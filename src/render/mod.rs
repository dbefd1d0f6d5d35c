//! Rendering of segmented documents to output formats.

mod json;
mod text;

pub use json::{from_json, to_json, write_json_lines, JsonFormat};
pub use text::{to_text, TextOptions};
