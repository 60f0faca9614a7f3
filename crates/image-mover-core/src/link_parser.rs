
use regex::Regex;
use std::sync::LazyLock;

// Compile regex once, reuse across calls
static IMAGE_EMBED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[.*?\]\((.*?)\)").unwrap()
});

/// Extract image paths from markdown `![alt](path)` embeds.
///
/// Returns the parenthesized paths in document order, duplicates included.
/// Nothing is unescaped or normalized: the path is whatever sits between the
/// opening parenthesis and the first closing one.
pub fn extract_image_references(markdown: &str) -> Vec<String> {
    let mut references = Vec::new();

    for cap in IMAGE_EMBED_RE.captures_iter(markdown) {
        let Some(path) = cap.get(1).map(|m| m.as_str()) else {
            tracing::warn!("Image embed without a path group: {}", &cap[0]);
            continue;
        };

        if path.is_empty() {
            tracing::warn!("Failed to extract image path from {}", &cap[0]);
            continue;
        }

        references.push(path.to_string());
    }

    references
}
