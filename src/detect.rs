//! PDF format detection and input discovery.

use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_MAGIC_LEN: usize = 5;
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Read the PDF version from a file header.
///
/// # Example
/// ```no_run
/// use pdfsect::detect::pdf_version_from_path;
///
/// let version = pdf_version_from_path("paper.pdf").unwrap();
/// println!("PDF version: {}", version);
/// ```
pub fn pdf_version_from_path<P: AsRef<Path>>(path: P) -> Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut header = [0u8; PDF_MAGIC_LEN + VERSION_LEN];
    reader
        .read_exact(&mut header)
        .map_err(|_| Error::UnknownFormat)?;
    pdf_version_from_bytes(&header)
}

/// Read the PDF version from the first bytes of a file.
///
/// Returns `Error::UnknownFormat` when the data does not start with a
/// `%PDF-x.y` header.
pub fn pdf_version_from_bytes(data: &[u8]) -> Result<String> {
    if data.len() < PDF_MAGIC_LEN + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version = &data[PDF_MAGIC_LEN..PDF_MAGIC_LEN + VERSION_LEN];
    match version {
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit() => {
            Ok(String::from_utf8_lossy(version).into_owned())
        }
        _ => Err(Error::UnknownFormat),
    }
}

/// Check if bytes start with a valid PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    pdf_version_from_bytes(data).is_ok()
}

/// Check if a path names a PDF by its extension.
pub fn has_pdf_extension<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Resolve an input path into the list of PDF files to parse.
///
/// A directory yields its `.pdf` entries (not recursive) sorted by path so
/// batches are processed in a stable order. A file is returned as is when
/// it has a `.pdf` extension.
pub fn collect_pdfs<P: AsRef<Path>>(input: P) -> Result<Vec<PathBuf>> {
    let input = input.as_ref();

    if input.is_dir() {
        let mut files = Vec::new();
        for entry in fs::read_dir(input)? {
            let path = entry?.path();
            if path.is_file() && has_pdf_extension(&path) {
                files.push(path);
            }
        }
        files.sort();
        return Ok(files);
    }

    if !input.exists() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", input.display()),
        )));
    }

    if has_pdf_extension(input) {
        Ok(vec![input.to_path_buf()])
    } else {
        Err(Error::UnknownFormat)
    }
}
