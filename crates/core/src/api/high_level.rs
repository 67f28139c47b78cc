//! High-level text removal API.
//!
//! Provides the main public API:
//! - `remove_text()` - edit PDF bytes, returning the edited bytes
//! - `remove_text_from_file()` - edit a file into a new file
//! - `remove_text_from_document()` - edit a loaded document in memory
//!
//! Every page is walked before anything is written, so a failure on any
//! page or form leaves no output behind.

use std::fmt;
use std::path::Path;

use crate::codec::Compression;
use crate::document::PdfDocument;
use crate::error::{PdfError, Result};
use crate::filter::{CommandFilter, RemovalRules};
use crate::walker::{ResourceWalker, VisitPolicy, WalkStats};

/// Options for text removal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditOptions {
    /// How rewritten content streams are stored. Defaults to Flate.
    pub compression: Compression,

    /// How often shared forms are edited. Defaults to once.
    pub visit: VisitPolicy,

    /// Operators to remove. Defaults to the text-showing operators.
    pub rules: RemovalRules,
}

impl EditOptions {
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_visit(mut self, visit: VisitPolicy) -> Self {
        self.visit = visit;
        self
    }

    pub fn with_rules(mut self, rules: RemovalRules) -> Self {
        self.rules = rules;
        self
    }
}

/// Summary of a document edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditReport {
    pub pages: usize,
    pub forms: usize,
    pub operators_removed: usize,
    pub revisits_skipped: usize,
    pub cycles_skipped: usize,
}

impl From<WalkStats> for EditReport {
    fn from(stats: WalkStats) -> Self {
        Self {
            pages: stats.pages,
            forms: stats.forms,
            operators_removed: stats.operators_removed,
            revisits_skipped: stats.revisits_skipped,
            cycles_skipped: stats.cycles_skipped,
        }
    }
}

impl fmt::Display for EditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} page(s), {} form edit(s), {} operator(s) removed",
            self.pages, self.forms, self.operators_removed
        )
    }
}

/// Remove text from every page of a loaded document.
///
/// The document is modified in memory only. Encrypted documents are
/// rejected before any content is touched.
pub fn remove_text_from_document(
    doc: &mut PdfDocument,
    options: &EditOptions,
) -> Result<EditReport> {
    if doc.is_encrypted() {
        return Err(PdfError::Encrypted);
    }

    let pages = doc.pages();
    let mut walker = ResourceWalker::new(&mut *doc, CommandFilter::new(options.rules.clone()))
        .with_compression(options.compression)
        .with_policy(options.visit);
    for page in &pages {
        walker.process(page)?;
    }

    let report = EditReport::from(walker.stats());
    tracing::info!(
        pages = report.pages,
        forms = report.forms,
        removed = report.operators_removed,
        revisits_skipped = report.revisits_skipped,
        cycles_skipped = report.cycles_skipped,
        "removed text"
    );
    Ok(report)
}

/// Remove text from PDF data and return the edited document.
///
/// # Example
/// ```ignore
/// use untext_core::api::{EditOptions, remove_text};
///
/// let pdf_bytes = std::fs::read("document.pdf")?;
/// let (edited, report) = remove_text(&pdf_bytes, &EditOptions::default())?;
/// ```
pub fn remove_text(pdf_data: &[u8], options: &EditOptions) -> Result<(Vec<u8>, EditReport)> {
    let mut doc = PdfDocument::from_bytes(pdf_data)?;
    let report = remove_text_from_document(&mut doc, options)?;
    Ok((doc.to_bytes()?, report))
}

/// Remove text from the PDF at `input` and write the result to `output`.
///
/// `output` is only created once every surface has been edited.
pub fn remove_text_from_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &EditOptions,
) -> Result<EditReport> {
    let mut doc = PdfDocument::load(input)?;
    let report = remove_text_from_document(&mut doc, options)?;
    doc.save(output)?;
    Ok(report)
}
