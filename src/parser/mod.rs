pub mod authors;
pub mod cursor;
pub mod extract;

use serde::Serialize;

use crate::error::ParseError;

/// One extracted CIP block. Required fields stay empty on a soft miss;
/// a record only exists at all if the header, title separator, ISBN and
/// registry lines were found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CipRecord {
    pub title: String,
    pub original_title: String,
    pub authors: Vec<String>,
    pub publisher: String,
    pub pubdate: String,
    pub isbn: String,
    pub category_id: String,
    pub cip_id: String,
    pub price: String,
}

/// The literal markers the extractor keys on. Collected in one table so a
/// locale variant only has to swap constants, not touch the state machine.
#[derive(Debug, Clone, Copy)]
pub struct Markers {
    pub cip_section: &'static str,
    pub registry: &'static str,
    pub original_title: &'static str,
    pub isbn_label: &'static str,
    pub currency: char,
    pub author_marker: char,
    pub author_labels: &'static [&'static str],
    pub title_separators: &'static [char],
    pub dash_variants: &'static [char],
    pub colon_variants: &'static [char],
    pub comma_variants: &'static [char],
    pub registry_id_open: char,
    pub registry_id_close: char,
    pub category_cues: &'static [&'static str],
    pub open_brackets: &'static [char],
    pub close_brackets: &'static [char],
}

impl Markers {
    pub const fn standard() -> Self {
        Self {
            cip_section: "图书在版编目",
            registry: "中国版本图书馆",
            original_title: "书名原文",
            isbn_label: "ISBN",
            currency: '元',
            author_marker: '著',
            author_labels: &["作者", "著者", "编著"],
            title_separators: &['/', '／'],
            dash_variants: &['-', '—'],
            colon_variants: &['：', ':'],
            comma_variants: &['，', ','],
            registry_id_open: '第',
            registry_id_close: '号',
            category_cues: &["iii", "①", "Ⅲ", "iV"],
            open_brackets: &['[', '［', '〔'],
            close_brackets: &[']', '］', '〕'],
        }
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self::standard()
    }
}

/// What to do when no author line turns up before end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorLinePolicy {
    /// Return the record as-is with an empty author list.
    #[default]
    SoftSuccess,
    /// Abort the whole parse with `MissingAuthorLine`.
    HardFail,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParsePolicy {
    pub author_line: AuthorLinePolicy,
    /// Always read the line after the title before splitting publisher and
    /// date, even when the title line itself carries a dash.
    pub always_advance_for_publisher: bool,
}

/// A page is a CIP page iff it contains both literal markers. Exact
/// substring match on purpose: downstream extraction depends on the marker
/// positions, so no fuzzing over encoding variants.
pub fn is_cip_page(text: &str) -> bool {
    let markers = Markers::standard();
    text.contains(markers.cip_section) && text.contains(markers.registry)
}

pub fn parse_cip_from_text(text: &str, policy: ParsePolicy) -> Result<CipRecord, ParseError> {
    extract::extract_record(text, &Markers::standard(), policy)
}

pub fn parse_cip_from_html(html: &str, policy: ParsePolicy) -> Result<CipRecord, ParseError> {
    parse_cip_from_text(&crate::html::html_to_text(html), policy)
}
