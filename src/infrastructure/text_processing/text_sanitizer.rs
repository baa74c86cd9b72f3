use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static HYPHEN_NEWLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?P<prefix>\w)-[ \t]*\r?\n[ \t]*(?P<suffix>\w)").unwrap());

const BULLET_GLYPHS: [char; 6] = ['•', '●', '▪', '◦', '■', '‣'];

/// Normalizes text pulled out of a document: NFKC, rejoined hyphenated line
/// breaks, uniform `- ` bullets, single spaces, at most one blank line.
pub fn sanitize_extracted_text(raw: &str) -> String {
    let normalized: String = raw
        .nfkc()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect();
    let de_hyphenated = HYPHEN_NEWLINE.replace_all(&normalized, "$prefix$suffix");

    let mut result = String::with_capacity(de_hyphenated.len());
    let mut pending_blank = false;

    for line in de_hyphenated.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            pending_blank = !result.is_empty();
            continue;
        }

        if !result.is_empty() {
            result.push_str(if pending_blank { "\n\n" } else { "\n" });
        }
        pending_blank = false;

        let content = match trimmed.strip_prefix(BULLET_GLYPHS) {
            Some(rest) => {
                result.push_str("- ");
                rest.trim_start()
            }
            None => trimmed,
        };
        collapse_internal_whitespace(content, &mut result);
    }

    result
}

fn collapse_internal_whitespace(line: &str, out: &mut String) {
    let mut prev_was_space = false;

    for ch in line.chars() {
        if ch.is_whitespace() {
            if !prev_was_space {
                out.push(' ');
                prev_was_space = true;
            }
        } else {
            out.push(ch);
            prev_was_space = false;
        }
    }
}
