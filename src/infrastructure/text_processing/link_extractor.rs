use std::sync::LazyLock;

use regex::Regex;

pub const LINKS_SECTION_HEADER: &str = "--- Extracted Links ---";

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bhttps?://[^\s<>"'()\[\]]+"#).unwrap());

/// Appends a links section listing every distinct URL found in `text`, in
/// order of first appearance. Text without URLs is returned unchanged.
pub fn append_links_section(text: &str) -> String {
    let mut links: Vec<&str> = Vec::new();
    for found in URL.find_iter(text) {
        let url = found.as_str().trim_end_matches(['.', ',', ';', ':']);
        if !links.contains(&url) {
            links.push(url);
        }
    }

    if links.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + 64);
    out.push_str(text);
    out.push_str("\n\n");
    out.push_str(LINKS_SECTION_HEADER);
    for link in links {
        out.push('\n');
        out.push_str(link);
    }
    out
}
