use crate::item::SourceItem;

/// Maximum number of README characters included in the summarization text.
pub const README_EXCERPT_CHARS: usize = 20_000;

const NOT_AVAILABLE: &str = "N/A";

/// Build the text the summarizer sees for one repository.
///
/// Missing fields read as `N/A` so the model never has to guess whether a
/// blank line is meaningful.
pub fn compose_text(item: &SourceItem, readme: Option<&str>) -> String {
    let d = &item.descriptor;
    let description = non_blank(&d.description).unwrap_or(NOT_AVAILABLE);
    let language = d.language.as_deref().and_then(non_blank).unwrap_or(NOT_AVAILABLE);
    let topics = if d.topics.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        d.topics.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    };
    let readme = readme
        .and_then(non_blank)
        .map(|r| excerpt(r, README_EXCERPT_CHARS))
        .unwrap_or(NOT_AVAILABLE);

    format!(
        "Repository: {}\nDescription: {}\nLanguage: {}\nTopics: {}\n\nREADME (excerpt):\n{}\n",
        item.full_name, description, language, topics, readme
    )
}

/// The first `max_chars` characters of `text`, cut on a char boundary.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn non_blank(s: &str) -> Option<&str> {
    (!s.trim().is_empty()).then_some(s)
}
