use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use epub::doc::EpubDoc;

use crate::error::FormatError;
use crate::formats::PageSource;
use crate::scan::ScanWindows;

/// Treats each spine item as one page of html.
pub struct EpubReader {
    doc: EpubDoc<BufReader<File>>,
}

impl EpubReader {
    pub fn open(path: &Path) -> Result<Self, FormatError> {
        let doc = EpubDoc::new(path).map_err(|e| FormatError::Epub(e.to_string()))?;
        Ok(Self { doc })
    }
}

impl PageSource for EpubReader {
    fn pages(&self) -> usize {
        self.doc.get_num_chapters()
    }

    fn read_page(&mut self, page: usize) -> Result<String, FormatError> {
        if !self.doc.set_current_chapter(page) {
            return Err(FormatError::PageOutOfRange(page));
        }
        let (content, _mime) = self
            .doc
            .get_current_str()
            .ok_or_else(|| FormatError::Epub(format!("unreadable spine item {page}")))?;
        Ok(content)
    }

    fn html_pages(&self) -> bool {
        true
    }

    fn scan_windows(&self) -> ScanWindows {
        ScanWindows::new(5, 5)
    }
}
