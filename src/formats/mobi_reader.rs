use std::path::Path;

use mobi::headers::TextEncoding;
use mobi::Mobi;

use crate::error::FormatError;
use crate::formats::PageSource;
use crate::scan::ScanWindows;

/// Treats each text record of the palm database as one page of html.
/// AZW and AZW3 files go through here too.
pub struct MobiReader {
    doc: Mobi,
}

impl MobiReader {
    pub fn open(path: &Path) -> Result<Self, FormatError> {
        let doc = Mobi::from_path(path).map_err(|e| FormatError::Mobi(e.to_string()))?;
        Ok(Self { doc })
    }
}

impl PageSource for MobiReader {
    fn pages(&self) -> usize {
        self.doc.readable_records_range().len()
    }

    fn read_page(&mut self, page: usize) -> Result<String, FormatError> {
        let records = self.doc.raw_records();
        let records = records.records();
        let record = records.get(page).ok_or(FormatError::PageOutOfRange(page))?;
        let text = match self.doc.text_encoding() {
            TextEncoding::CP1252 => encoding_rs::WINDOWS_1252
                .decode(record.content)
                .0
                .into_owned(),
            TextEncoding::UTF8 | TextEncoding::Unknown(_) => {
                String::from_utf8_lossy(record.content).into_owned()
            }
        };
        Ok(text)
    }

    fn html_pages(&self) -> bool {
        true
    }

    fn scan_windows(&self) -> ScanWindows {
        ScanWindows::new(5, 5)
    }
}
