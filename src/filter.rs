use crate::extractor::PaperRecord;

/// Keeps the papers whose title contains at least one keyword, case-insensitively.
///
/// An empty keyword list selects nothing; callers that want every paper skip
/// filtering instead. Blank keywords never match. Other keywords are used as
/// given, surrounding spaces included, so `" mt"` only matches at a word start.
pub fn filter<S: AsRef<str>>(records: &[PaperRecord], keywords: &[S]) -> Vec<PaperRecord> {
    let needles: Vec<String> = keywords
        .iter()
        .map(|k| k.as_ref().to_lowercase())
        .filter(|k| !k.trim().is_empty())
        .collect();

    if needles.is_empty() {
        return Vec::new();
    }

    records
        .iter()
        .filter(|record| {
            let title = record.title.to_lowercase();
            needles.iter().any(|needle| title.contains(needle.as_str()))
        })
        .cloned()
        .collect()
}
