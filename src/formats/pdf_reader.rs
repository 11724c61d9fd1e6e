use std::path::Path;

use lopdf::Document;

use crate::error::FormatError;
use crate::formats::PageSource;
use crate::scan::ScanWindows;

pub struct PdfReader {
    doc: Document,
    pages: usize,
}

impl PdfReader {
    pub fn open(path: &Path) -> Result<Self, FormatError> {
        let doc = Document::load(path)?;
        if doc.is_encrypted() {
            return Err(FormatError::EncryptedPdf);
        }
        let pages = doc.page_iter().count();
        Ok(Self { doc, pages })
    }
}

impl PageSource for PdfReader {
    fn pages(&self) -> usize {
        self.pages
    }

    fn read_page(&mut self, page: usize) -> Result<String, FormatError> {
        if page >= self.pages {
            return Err(FormatError::PageOutOfRange(page));
        }
        // lopdf numbers pages from 1.
        self.doc
            .extract_text(&[page as u32 + 1])
            .map_err(FormatError::from)
    }

    // PDF front matter tends to be padded with covers and blurb pages.
    fn scan_windows(&self) -> ScanWindows {
        ScanWindows::new(10, 5)
    }
}
