/// Flatten an html fragment (epub/mobi page content) to plain text, 80
/// columns. The renderer may truncate pathological input; the extractor
/// copes with a cut-off page by soft-missing the trailing fields.
pub fn html_to_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), 80)
}
