use crate::extractor::PaperRecord;

/// Renders the HTML fragment embedded in a digest mail: per paper a numbered
/// title link, the author names and the comments. Empty input gives an empty string.
pub fn render(records: &[PaperRecord]) -> String {
    let mut body = String::new();
    for (idx, paper) in records.iter().enumerate() {
        let authors = paper
            .authors
            .iter()
            .map(|a| escape_html(&a.name))
            .collect::<Vec<_>>()
            .join(", ");

        body.push_str(&format!(
            "<p>[{}] <a href='{}'>{}</a></p>\n<p>{}</p>\n<p>Comments: {}</p>\n",
            idx + 1,
            escape_html(&paper.url.abstract_url),
            escape_html(&paper.title),
            authors,
            escape_html(&paper.comments),
        ));
    }
    body
}

/// Minimal escaping for text and single-quoted attribute values.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
