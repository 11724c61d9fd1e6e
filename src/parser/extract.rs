use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::authors::split_authors;
use super::cursor::LineCursor;
use super::{AuthorLinePolicy, CipRecord, Markers, ParsePolicy};
use crate::error::ParseError;

// Trailing classification token: one uppercase letter then digits/dot/dash,
// anchored at end of line so the last run wins.
static CATEGORY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z][0-9.\- ]+)\s*$").unwrap());
// Anchoring on 元 keeps stray numbers on the same line (print years, run
// counts) out of the price; the bare capture only kicks in when the line
// carries 元 detached from the amount, as in 定价（元）：45.00.
static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9.]+\s*元)").unwrap());
static BARE_PRICE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9.]+)").unwrap());

/// Run the field states in order over `text`. States only ever scan forward;
/// a state that misses an optional line leaves its field empty, while a miss
/// on a load-bearing line aborts with the matching `ParseError`.
pub fn extract_record(
    text: &str,
    markers: &Markers,
    policy: ParsePolicy,
) -> Result<CipRecord, ParseError> {
    let mut cursor = LineCursor::new(text);
    let mut record = CipRecord::default();

    find_header(&mut cursor, markers)?;
    find_title(&mut cursor, markers, &mut record)?;
    publisher_line(&mut cursor, markers, policy, &mut record);
    original_title(&mut cursor, markers, &mut record);
    find_isbn(&mut cursor, markers, &mut record)?;
    classification_code(&mut cursor, markers, &mut record);
    find_registry_id(&mut cursor, markers, &mut record)?;

    if !find_author_line(&mut cursor, markers, &mut record) {
        // No author line before end of input. The record is otherwise
        // complete, so the permissive policy hands it back as-is.
        return match policy.author_line {
            AuthorLinePolicy::SoftSuccess => Ok(record),
            AuthorLinePolicy::HardFail => Err(ParseError::MissingAuthorLine),
        };
    }

    find_price(&mut cursor, markers, &mut record);
    Ok(record)
}

/// Park the cursor at the line holding the CIP section marker.
fn find_header(cursor: &mut LineCursor, markers: &Markers) -> Result<(), ParseError> {
    cursor
        .seek(|l| l.contains(markers.cip_section))
        .map(|_| ())
        .ok_or(ParseError::MissingHeader)
}

/// The title is everything before the first slash on the next line that has
/// one. The cursor stays parked at the title line so the publisher state can
/// reuse it.
fn find_title(
    cursor: &mut LineCursor,
    markers: &Markers,
    record: &mut CipRecord,
) -> Result<(), ParseError> {
    cursor.advance();
    let line = cursor
        .seek(|l| l.chars().any(|c| markers.title_separators.contains(&c)))
        .ok_or(ParseError::MissingTitleSeparator)?;

    let chars: Vec<char> = line.chars().collect();
    let sep = first_index_of(&chars, markers.title_separators).expect("seek matched a separator");
    record.title = slice_trimmed(&chars, 0, sep);
    debug!("title: {}", record.title);
    Ok(())
}

/// Publisher and publication date share one line, split on the last colon
/// and the last comma. That line is the title line itself when it carries a
/// dash (the common "书名 / 某某著. —北京：出版社，2016" shape), otherwise
/// the next one. Missing delimiters leave the fields empty, not failed.
fn publisher_line(
    cursor: &mut LineCursor,
    markers: &Markers,
    policy: ParsePolicy,
    record: &mut CipRecord,
) {
    let reuse_title_line = !policy.always_advance_for_publisher
        && cursor
            .current()
            .is_some_and(|l| l.chars().any(|c| markers.dash_variants.contains(&c)));
    if !reuse_title_line {
        cursor.advance();
    }
    let Some(line) = cursor.current() else {
        return;
    };

    let chars: Vec<char> = line.chars().collect();
    let colon = last_index_of(&chars, markers.colon_variants);
    let comma = last_index_of(&chars, markers.comma_variants);

    if let Some(ci) = colon {
        let end = match comma {
            Some(di) if di > ci => di,
            _ => chars.len(),
        };
        record.publisher = slice_trimmed(&chars, ci + 1, end);
        debug!("publisher: {}", record.publisher);
    }
    if let Some(di) = comma {
        record.pubdate = slice_trimmed(&chars, di + 1, chars.len());
        debug!("pubdate: {}", record.pubdate);
    }
    cursor.advance();
}

/// Present only for translations: a "书名原文：..." line right after the
/// publisher line. Skipped silently otherwise.
fn original_title(cursor: &mut LineCursor, markers: &Markers, record: &mut CipRecord) {
    let Some(line) = cursor.current() else {
        return;
    };
    let chars: Vec<char> = line.chars().collect();
    let Some(marker_at) = find_subsequence(&chars, markers.original_title) else {
        return;
    };
    let after_marker = marker_at + markers.original_title.chars().count();
    if let Some(colon) = chars[after_marker..]
        .iter()
        .position(|c| markers.colon_variants.contains(c))
    {
        record.original_title = slice_trimmed(&chars, after_marker + colon + 1, chars.len());
        debug!("original title: {}", record.original_title);
    }
    cursor.advance();
}

fn find_isbn(
    cursor: &mut LineCursor,
    markers: &Markers,
    record: &mut CipRecord,
) -> Result<(), ParseError> {
    let line = cursor
        .seek(|l| l.contains(markers.isbn_label))
        .ok_or(ParseError::MissingIsbn)?;
    record.isbn = normalize_isbn(line, markers);
    debug!("isbn: {}", record.isbn);
    cursor.advance();
    Ok(())
}

/// Strip the label and every hyphen/dash/space variant so only the digits
/// and check letter remain. Idempotent on already-clean input.
pub(crate) fn normalize_isbn(line: &str, markers: &Markers) -> String {
    line.replace(markers.isbn_label, "")
        .chars()
        .filter(|&c| !is_dash(c) && !c.is_whitespace())
        .collect()
}

fn is_dash(c: char) -> bool {
    matches!(c, '-' | '–' | '—' | '‐' | '－' | '﹣')
}

/// The classification sequence line ("Ⅰ.①… Ⅳ.①I561.45") directly follows
/// the ISBN line when present; its cue is a circled digit or family
/// numeral. The library class is the trailing letter+digits token.
fn classification_code(cursor: &mut LineCursor, markers: &Markers, record: &mut CipRecord) {
    let Some(line) = cursor.current() else {
        return;
    };
    if !markers.category_cues.iter().any(|cue| line.contains(cue)) {
        return;
    }
    if let Some(caps) = CATEGORY_RE.captures(line) {
        record.category_id = caps[1]
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        debug!("category id: {}", record.category_id);
    }
    cursor.advance();
}

/// The registry number sits between the last "第" and the last "号" on the
/// national-registry line. A registry line without both bounds still counts
/// as found; only its number is lost.
fn find_registry_id(
    cursor: &mut LineCursor,
    markers: &Markers,
    record: &mut CipRecord,
) -> Result<(), ParseError> {
    let line = cursor
        .seek(|l| l.contains(markers.registry))
        .ok_or(ParseError::MissingRegistryLine)?;

    let chars: Vec<char> = line.chars().collect();
    let open = chars.iter().rposition(|&c| c == markers.registry_id_open);
    let close = chars.iter().rposition(|&c| c == markers.registry_id_close);
    if let (Some(s), Some(e)) = (open, close) {
        if e > s {
            record.cip_id = slice_trimmed(&chars, s + 1, e);
            debug!("cip id: {}", record.cip_id);
        }
    }
    cursor.advance();
    Ok(())
}

/// An author line either ends with the author marker once all space variants
/// are stripped ("作者：张三 著") or starts with one of the author labels.
/// The splitter gets the segment between the first colon/slash and the
/// marker, or the rest of the line when the marker is absent.
fn find_author_line(cursor: &mut LineCursor, markers: &Markers, record: &mut CipRecord) -> bool {
    let found = cursor.seek(|l| {
        let compact: String = l.chars().filter(|c| !c.is_whitespace()).collect();
        compact.ends_with(markers.author_marker)
            || markers
                .author_labels
                .iter()
                .any(|label| compact.starts_with(label))
    });
    let Some(line) = found else {
        return false;
    };

    let chars: Vec<char> = line.chars().collect();
    let start = first_index_of(&chars, markers.colon_variants)
        .or_else(|| first_index_of(&chars, markers.title_separators))
        .map(|i| i + 1)
        .unwrap_or(0);
    let end = chars
        .iter()
        .rposition(|&c| c == markers.author_marker)
        .filter(|&e| e > start)
        .unwrap_or(chars.len());

    let segment: String = chars[start..end].iter().collect();
    record.authors = split_authors(&segment, markers);
    debug!("authors: {:?}", record.authors);
    cursor.advance();
    true
}

/// Price is the first currency-marked line after the author line; missing it
/// is a soft miss.
fn find_price(cursor: &mut LineCursor, markers: &Markers, record: &mut CipRecord) {
    let Some(line) = cursor.seek(|l| l.contains(markers.currency)) else {
        return;
    };
    let caps = PRICE_RE
        .captures(line)
        .or_else(|| BARE_PRICE_RE.captures(line));
    if let Some(caps) = caps {
        record.price = caps[1].trim().to_string();
        debug!("price: {}", record.price);
    }
}

// ── codepoint-index helpers ──
// All slicing happens on decoded chars so a "last occurrence" can never land
// inside a multi-byte sequence.

fn first_index_of(chars: &[char], targets: &[char]) -> Option<usize> {
    chars.iter().position(|c| targets.contains(c))
}

fn last_index_of(chars: &[char], targets: &[char]) -> Option<usize> {
    chars.iter().rposition(|c| targets.contains(c))
}

fn slice_trimmed(chars: &[char], start: usize, end: usize) -> String {
    chars[start..end].iter().collect::<String>().trim().to_string()
}

fn find_subsequence(chars: &[char], needle: &str) -> Option<usize> {
    let needle: Vec<char> = needle.chars().collect();
    if needle.is_empty() || chars.len() < needle.len() {
        return None;
    }
    (0..=chars.len() - needle.len()).find(|&i| chars[i..i + needle.len()] == needle[..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::parser::{AuthorLinePolicy, Markers, ParsePolicy};

    fn parse(text: &str) -> Result<CipRecord, ParseError> {
        extract_record(text, &Markers::standard(), ParsePolicy::default())
    }

    #[test]
    fn full_fixture() {
        let text = std::fs::read_to_string("tests/fixtures/cip_page.txt").unwrap();
        let record = parse(&text).unwrap();
        assert_eq!(record.title, "谜宫探案");
        assert_eq!(record.publisher, "人民文学出版社");
        assert_eq!(record.pubdate, "2019.3");
        assert_eq!(record.original_title, "The Mystery Casebook");
        assert_eq!(record.isbn, "9787020135846");
        assert_eq!(record.category_id, "I561.45");
        assert_eq!(record.cip_id, "045621");
        assert_eq!(record.authors, vec!["李明", "[英]亚瑟·柯南"]);
        assert_eq!(record.price, "45.00元");
    }

    #[test]
    fn minimal_fixture_soft_success() {
        let text = std::fs::read_to_string("tests/fixtures/cip_page_minimal.txt").unwrap();
        let record = parse(&text).unwrap();
        assert_eq!(record.title, "数据结构基础");
        assert_eq!(record.publisher, "清华大学出版社");
        assert_eq!(record.pubdate, "2008");
        assert_eq!(record.isbn, "9787302165054");
        assert_eq!(record.cip_id, "012345");
        assert!(record.original_title.is_empty());
        assert!(record.category_id.is_empty());
        assert!(record.authors.is_empty());
        assert!(record.price.is_empty());
    }

    #[test]
    fn title_publisher_date_round_trip() {
        let text = "图书在版编目\n书名 / 作者\n出版社：北京出版社，2020\nISBN 7-01-000001-0\n中国版本图书馆CIP数据核字第000001号\n";
        let record = parse(text).unwrap();
        assert_eq!(record.title, "书名");
        assert_eq!(record.publisher, "北京出版社");
        assert_eq!(record.pubdate, "2020");
    }

    #[test]
    fn dash_title_line_doubles_as_publisher_line() {
        let text = "图书在版编目\n活着 / 余华著. —北京：作家出版社，2012.8\nISBN 978-7-5063-6543-1\n中国版本图书馆CIP数据核字（2012）第170288号\n";
        let record = parse(text).unwrap();
        assert_eq!(record.title, "活着");
        assert_eq!(record.publisher, "作家出版社");
        assert_eq!(record.pubdate, "2012.8");
    }

    #[test]
    fn always_advance_policy_skips_dash_reuse() {
        let text = "图书在版编目\n活着 / 余华著. —北京：作家出版社，2012.8\n上海：另一出版社，2013\nISBN 978-7-5063-6543-1\n中国版本图书馆CIP数据核字第170288号\n";
        let policy = ParsePolicy {
            always_advance_for_publisher: true,
            ..ParsePolicy::default()
        };
        let record = extract_record(text, &Markers::standard(), policy).unwrap();
        assert_eq!(record.publisher, "另一出版社");
        assert_eq!(record.pubdate, "2013");
    }

    #[test]
    fn missing_isbn_is_hard_failure() {
        let text = "图书在版编目\n书名 / 作者\n出版社：北京出版社，2020\n中国版本图书馆CIP数据核字第000001号\n";
        assert_eq!(parse(text).unwrap_err(), ParseError::MissingIsbn);
    }

    #[test]
    fn missing_header_is_hard_failure() {
        assert_eq!(parse("随便一页文字\n没有任何标记\n").unwrap_err(), ParseError::MissingHeader);
    }

    #[test]
    fn missing_title_separator_is_hard_failure() {
        let text = "图书在版编目\n没有斜杠的行\n也没有\n";
        assert_eq!(parse(text).unwrap_err(), ParseError::MissingTitleSeparator);
    }

    #[test]
    fn missing_registry_line_is_hard_failure() {
        let text = "图书在版编目\n书名 / 作者\n出版社：北京出版社，2020\nISBN 7-01-000001-0\n";
        assert_eq!(parse(text).unwrap_err(), ParseError::MissingRegistryLine);
    }

    #[test]
    fn no_price_line_is_soft_success() {
        let text = "图书在版编目\n书名 / 作者\n出版社：北京出版社，2020\nISBN 7-01-000001-0\n中国版本图书馆CIP数据核字第000001号\n作者：张三 著\n";
        let record = parse(text).unwrap();
        assert_eq!(record.authors, vec!["张三"]);
        assert_eq!(record.price, "");
        assert_eq!(record.publisher, "北京出版社");
    }

    #[test]
    fn no_author_line_soft_by_default_hard_when_strict() {
        let text = "图书在版编目\n书名 / 佚名\n出版社：北京出版社，2020\nISBN 7-01-000001-0\n中国版本图书馆CIP数据核字第000001号\n";
        let record = parse(text).unwrap();
        assert!(record.authors.is_empty());

        let strict = ParsePolicy {
            author_line: AuthorLinePolicy::HardFail,
            ..ParsePolicy::default()
        };
        assert_eq!(
            extract_record(text, &Markers::standard(), strict).unwrap_err(),
            ParseError::MissingAuthorLine
        );
    }

    #[test]
    fn isbn_normalization_is_idempotent() {
        let markers = Markers::standard();
        let once = normalize_isbn("ISBN 978-7-111-54493-7", &markers);
        assert_eq!(once, "9787111544937");
        assert_eq!(normalize_isbn(&once, &markers), once);
    }

    #[test]
    fn isbn_en_dash_and_fullwidth_space_stripped() {
        let markers = Markers::standard();
        assert_eq!(normalize_isbn("ISBN\u{3000}978–7–02–013584–6", &markers), "9787020135846");
    }

    #[test]
    fn registry_id_between_last_bounds() {
        let text = "图书在版编目\n书名 / 佚名\n：出版社，2020\nISBN 7-01-000001-0\n中国版本图书馆CIP数据核字(2019)第045621号\n";
        let record = parse(text).unwrap();
        assert_eq!(record.cip_id, "045621");
    }

    #[test]
    fn registry_line_without_bounds_leaves_id_empty() {
        let text = "图书在版编目\n书名 / 佚名\n：出版社，2020\nISBN 7-01-000001-0\n中国版本图书馆CIP数据核字\n";
        let record = parse(text).unwrap();
        assert_eq!(record.cip_id, "");
    }

    #[test]
    fn fullwidth_slash_and_colon() {
        let text = "图书在版编目\n红楼梦 ／ 曹雪芹著. —北京：人民文学出版社，1982\nISBN 7-02-000220-5\n中国版本图书馆CIP数据核字第111号\n";
        let record = parse(text).unwrap();
        assert_eq!(record.title, "红楼梦");
        assert_eq!(record.publisher, "人民文学出版社");
        assert_eq!(record.pubdate, "1982");
    }

    #[test]
    fn author_label_line_without_marker_takes_rest_of_line() {
        let text = "图书在版编目\n书名 / 佚名\n：出版社，2020\nISBN 7-01-000001-0\n中国版本图书馆CIP数据核字第1号\n作者：王小波\n定价：12.50元\n";
        let record = parse(text).unwrap();
        assert_eq!(record.authors, vec!["王小波"]);
        assert_eq!(record.price, "12.50元");
    }

    #[test]
    fn price_ignores_other_numbers_on_the_line() {
        let text = "图书在版编目\n书名 / 佚名\n：出版社，2020\nISBN 7-01-000001-0\n中国版本图书馆CIP数据核字第1号\n作者：王小波\n2019年印刷 定价12.50元\n";
        let record = parse(text).unwrap();
        assert_eq!(record.price, "12.50元");
    }

    #[test]
    fn detached_currency_mark_falls_back_to_bare_amount() {
        let text = "图书在版编目\n书名 / 佚名\n：出版社，2020\nISBN 7-01-000001-0\n中国版本图书馆CIP数据核字第1号\n作者：王小波\n定价（元）：45.00\n";
        let record = parse(text).unwrap();
        assert_eq!(record.price, "45.00");
    }

    #[test]
    fn truncated_input_still_yields_partial_record() {
        // Simulates the html renderer cutting the page off after the
        // registry line.
        let text = "图书在版编目（CIP）数据\n小城故事 / 林海音著. —台北：文学出版社，1960\nISBN 978-957-000-000-1\n中国版本图书馆CIP数据核字第99号";
        let record = parse(text).unwrap();
        assert_eq!(record.title, "小城故事");
        assert!(record.authors.is_empty());
        assert!(record.price.is_empty());
    }
}
