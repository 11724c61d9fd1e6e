use tracing::warn;

use crate::error::FormatError;

/// How many leading and trailing page indices to probe for the CIP page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanWindows {
    pub front: usize,
    pub back: usize,
}

impl ScanWindows {
    pub const fn new(front: usize, back: usize) -> Self {
        Self { front, back }
    }
}

/// Probe a bounded front window of page indices, then a bounded back window,
/// both in ascending order, and return the first page whose text satisfies
/// `is_signature` together with that text.
///
/// A page that fails to render is a non-match, not a fatal error; `None`
/// means the book simply has no CIP page in either window.
pub fn locate_cip_page<F, P>(
    pages: usize,
    windows: ScanWindows,
    mut fetch: F,
    mut is_signature: P,
) -> Option<(usize, String)>
where
    F: FnMut(usize) -> Result<String, FormatError>,
    P: FnMut(&str) -> bool,
{
    let front_end = windows.front.min(pages);
    for page in 0..front_end {
        if let Some(text) = probe(page, &mut fetch, &mut is_signature) {
            return Some((page, text));
        }
    }

    // Back window, clamped so no index probed by the front window repeats.
    let back_start = pages.saturating_sub(windows.back).max(front_end);
    for page in back_start..pages {
        if let Some(text) = probe(page, &mut fetch, &mut is_signature) {
            return Some((page, text));
        }
    }

    None
}

fn probe<F, P>(page: usize, fetch: &mut F, is_signature: &mut P) -> Option<String>
where
    F: FnMut(usize) -> Result<String, FormatError>,
    P: FnMut(&str) -> bool,
{
    match fetch(page) {
        Ok(text) => {
            if is_signature(&text) {
                Some(text)
            } else {
                None
            }
        }
        Err(err) => {
            warn!("failed to read page {}: {}", page, err);
            None
        }
    }
}
