pub mod epub_reader;
pub mod mobi_reader;
pub mod pdf_reader;

use std::path::Path;

use crate::error::FormatError;
use crate::scan::ScanWindows;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EbookFormat {
    Pdf,
    Epub,
    /// MOBI and the AZW/AZW3 variants share the same container.
    Mobi,
}

/// How the driver should treat a file, decided purely by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Ebook(EbookFormat),
    /// Recognized clutter (covers, metadata sidecars); not an error.
    Ignored,
    Unsupported,
}

const IGNORED_EXTENSIONS: &[&str] = &["jpg", "opf", "json", "db"];

pub fn classify(path: &Path) -> FileKind {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return FileKind::Unsupported;
    };
    match ext.to_ascii_lowercase().as_str() {
        "pdf" => FileKind::Ebook(EbookFormat::Pdf),
        "epub" => FileKind::Ebook(EbookFormat::Epub),
        "mobi" | "azw" | "azw3" => FileKind::Ebook(EbookFormat::Mobi),
        e if IGNORED_EXTENSIONS.contains(&e) => FileKind::Ignored,
        _ => FileKind::Unsupported,
    }
}

/// A format-specific page source the CIP scanner pulls text from.
/// Page indices are 0-based; a read failure on one page must not poison
/// the others.
pub trait PageSource {
    fn pages(&self) -> usize;
    fn read_page(&mut self, page: usize) -> Result<String, FormatError>;
    /// Pages are html fragments that need flattening before extraction.
    fn html_pages(&self) -> bool {
        false
    }
    /// Per-format probe windows; front matter density differs by format.
    fn scan_windows(&self) -> ScanWindows;
}

pub fn open(path: &Path, format: EbookFormat) -> Result<Box<dyn PageSource>, FormatError> {
    Ok(match format {
        EbookFormat::Pdf => Box::new(pdf_reader::PdfReader::open(path)?),
        EbookFormat::Epub => Box::new(epub_reader::EpubReader::open(path)?),
        EbookFormat::Mobi => Box::new(mobi_reader::MobiReader::open(path)?),
    })
}
