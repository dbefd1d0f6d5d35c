//! PDF layout extraction.
//!
//! Walks the content stream of each page and turns text-showing operators
//! into the page → container → line → glyph stream consumed by the span
//! builder. Each `BT`…`ET` block becomes one container and every vertical
//! move of the text position starts a new line.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::detect;
use crate::error::{Error, Result};

use super::backend::{ContentOp, LopdfBackend, PageId, PdfBackend, PdfValue};
use super::options::{ErrorMode, ParseOptions, PageSelection};
use super::source::{LayoutContainer, LayoutItem, LayoutLine, LayoutPage, LayoutSource};

/// Kerning adjustment (thousandths of an em) beyond which a `TJ` gap is a word space.
const SPACE_THRESHOLD: f32 = 200.0;

/// Leading used by `T*` until a `TL` or `TD` sets one.
const DEFAULT_LEADING: f32 = 12.0;

/// Baseline movement below this is not a new line.
const BASELINE_EPSILON: f32 = 0.01;

/// Where the PDF data comes from.
#[derive(Debug, Clone)]
enum PdfInput {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// A [`LayoutSource`] reading a PDF with lopdf.
#[derive(Debug, Clone)]
pub struct PdfSource {
    name: String,
    input: PdfInput,
    pages: PageSelection,
    error_mode: ErrorMode,
}

impl PdfSource {
    /// Open a PDF file. Only the header is read here; the document is
    /// loaded when [`LayoutSource::extract`] runs.
    pub fn open<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        detect::pdf_version_from_path(path)?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            input: PdfInput::Path(path.to_path_buf()),
            pages: options.pages.clone(),
            error_mode: options.error_mode,
        })
    }

    /// Create a source over PDF bytes already in memory.
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>, options: &ParseOptions) -> Result<Self> {
        if !detect::is_pdf_bytes(&data) {
            return Err(Error::UnknownFormat);
        }
        Ok(Self {
            name: name.into(),
            input: PdfInput::Bytes(data),
            pages: options.pages.clone(),
            error_mode: options.error_mode,
        })
    }

    fn load(&self) -> Result<LopdfBackend> {
        let backend = match &self.input {
            PdfInput::Path(path) => LopdfBackend::load_file(path)?,
            PdfInput::Bytes(data) => LopdfBackend::load_bytes(data)?,
        };
        if backend.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(backend)
    }
}

impl LayoutSource for PdfSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self) -> Result<Vec<LayoutPage>> {
        let backend = self.load()?;
        extract_pages(&backend, &self.name, &self.pages, self.error_mode)
    }
}

/// Extract the selected pages of a document from any backend.
pub fn extract_pages<B: PdfBackend>(
    backend: &B,
    name: &str,
    selection: &PageSelection,
    error_mode: ErrorMode,
) -> Result<Vec<LayoutPage>> {
    let pages = backend.pages();
    let total = pages.len() as u32;
    if total == 0 {
        return Err(Error::MissingStream(name.to_string()));
    }
    check_selection(selection, total)?;

    let mut extracted = Vec::new();
    for (&number, &page_id) in pages.iter().filter(|(n, _)| selection.includes(**n)) {
        match extract_page(backend, number, page_id) {
            Ok(page) => extracted.push(page),
            Err(e) if error_mode == ErrorMode::Lenient => {
                log::warn!("{}: skipping page {}: {}", name, number, e);
            }
            Err(e) => return Err(e),
        }
    }

    log::debug!("{}: extracted {} of {} pages", name, extracted.len(), total);
    Ok(extracted)
}

fn check_selection(selection: &PageSelection, total: u32) -> Result<()> {
    let out_of_range = match selection {
        PageSelection::All => None,
        PageSelection::Range(range) => Some(*range.start()).filter(|&p| p == 0 || p > total),
        PageSelection::Pages(pages) => pages.iter().copied().find(|&p| p == 0 || p > total),
    };
    match out_of_range {
        Some(page) => Err(Error::PageOutOfRange(page, total)),
        None => Ok(()),
    }
}

/// Extract the layout of a single page.
pub fn extract_page<B: PdfBackend>(backend: &B, number: u32, page_id: PageId) -> Result<LayoutPage> {
    let fonts = backend.font_names(page_id)?;
    let content = backend.page_content(page_id)?;
    let operations = backend.decode_content(&content)?;

    let mut walker = ContentWalker::new(backend, page_id, &fonts);
    for op in &operations {
        walker.apply(op);
    }
    Ok(LayoutPage::new(number, walker.finish()))
}

/// Text position state, enough to tell when the baseline moves.
#[derive(Debug, Clone, Copy)]
struct TextMatrix {
    b: f32,
    d: f32,
    f: f32, // Y translation
    leading: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            b: 0.0,
            d: 1.0,
            f: 0.0,
            leading: DEFAULT_LEADING,
        }
    }
}

impl TextMatrix {
    /// Replace the matrix; returns whether the baseline moved.
    fn set(&mut self, b: f32, d: f32, f: f32) -> bool {
        let moved = (f - self.f).abs() > BASELINE_EPSILON;
        self.b = b;
        self.d = d;
        self.f = f;
        moved
    }

    /// Move to the start of the next line offset by (tx, ty).
    fn translate(&mut self, tx: f32, ty: f32) -> bool {
        let before = self.f;
        self.f += tx * self.b + ty * self.d;
        ty != 0.0 || (self.f - before).abs() > BASELINE_EPSILON
    }

    fn next_line(&mut self) {
        self.f -= self.leading * self.d;
    }
}

/// Content stream interpreter producing layout containers.
struct ContentWalker<'a, B: PdfBackend> {
    backend: &'a B,
    page_id: PageId,
    fonts: &'a HashMap<Vec<u8>, String>,
    font_key: Vec<u8>,
    font: String,
    matrix: TextMatrix,
    in_text: bool,
    line: Vec<LayoutItem>,
    lines: Vec<LayoutLine>,
    containers: Vec<LayoutContainer>,
}

impl<'a, B: PdfBackend> ContentWalker<'a, B> {
    fn new(backend: &'a B, page_id: PageId, fonts: &'a HashMap<Vec<u8>, String>) -> Self {
        Self {
            backend,
            page_id,
            fonts,
            font_key: Vec::new(),
            font: String::new(),
            matrix: TextMatrix::default(),
            in_text: false,
            line: Vec::new(),
            lines: Vec::new(),
            containers: Vec::new(),
        }
    }

    fn apply(&mut self, op: &ContentOp) {
        match op.operator.as_str() {
            "BT" => {
                self.close_container();
                self.in_text = true;
                let leading = self.matrix.leading;
                self.matrix = TextMatrix {
                    leading,
                    ..TextMatrix::default()
                };
            }
            "ET" => {
                self.close_container();
                self.in_text = false;
            }
            "Tf" => {
                if let Some(PdfValue::Name(key)) = op.operands.first() {
                    self.font = self
                        .fonts
                        .get(key)
                        .cloned()
                        .unwrap_or_else(|| String::from_utf8_lossy(key).into_owned());
                    self.font_key = key.clone();
                }
            }
            "TL" => {
                if let Some(leading) = op.number(0) {
                    self.matrix.leading = leading;
                }
            }
            "Td" | "TD" => {
                let tx = op.number(0).unwrap_or(0.0);
                let ty = op.number(1).unwrap_or(0.0);
                if op.operator == "TD" {
                    self.matrix.leading = -ty;
                }
                if self.matrix.translate(tx, ty) {
                    self.close_line();
                }
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    let moved = self.matrix.set(
                        op.number(1).unwrap_or(0.0),
                        op.number(3).unwrap_or(1.0),
                        op.number(5).unwrap_or(0.0),
                    );
                    if moved {
                        self.close_line();
                    }
                }
            }
            "T*" => {
                self.matrix.next_line();
                self.close_line();
            }
            "Tj" => {
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    self.show(bytes);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(items)) = op.operands.first() {
                    self.show_array(items);
                }
            }
            "'" | "\"" => {
                self.matrix.next_line();
                self.close_line();
                let text_idx = if op.operator == "\"" { 2 } else { 0 };
                if let Some(PdfValue::Str(bytes)) = op.operands.get(text_idx) {
                    self.show(bytes);
                }
            }
            _ => {}
        }
    }

    fn show(&mut self, bytes: &[u8]) {
        if !self.in_text {
            return;
        }
        let text = self.backend.decode_text(self.page_id, &self.font_key, bytes);
        for c in text.chars() {
            self.line.push(LayoutItem::glyph(c.to_string(), self.font.as_str()));
        }
    }

    fn show_array(&mut self, items: &[PdfValue]) {
        for item in items {
            match item {
                PdfValue::Str(bytes) => self.show(bytes),
                other => {
                    // Negative adjustments advance the pen; large ones are word gaps.
                    let gap = other.as_number().map_or(0.0, |n| -n);
                    if self.in_text && gap > SPACE_THRESHOLD && !self.line.is_empty() {
                        self.line.push(LayoutItem::space());
                    }
                }
            }
        }
    }

    fn close_line(&mut self) {
        if self.line.is_empty() {
            return;
        }
        let mut items = std::mem::take(&mut self.line);
        items.push(LayoutItem::line_break());
        self.lines.push(LayoutLine::new(items));
    }

    fn close_container(&mut self) {
        self.close_line();
        if !self.lines.is_empty() {
            let lines = std::mem::take(&mut self.lines);
            self.containers.push(LayoutContainer::new(lines));
        }
    }

    fn finish(mut self) -> Vec<LayoutContainer> {
        self.close_container();
        self.containers
    }
}
