use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::domain::ScoreCard;

const MAX_KEYWORDS: usize = 20;
const MIN_TOKEN_CHARS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatch {
    pub score: u8,
    pub missing_keywords: Vec<String>,
}

/// Scores `text` by how many of the job description's most frequent words it
/// contains. Frequency ties keep the order of first appearance.
pub fn keyword_match(text: &str, job_description: &str) -> KeywordMatch {
    if text.trim().is_empty() || job_description.trim().is_empty() {
        return KeywordMatch {
            score: 0,
            missing_keywords: Vec::new(),
        };
    }

    let text_tokens: HashSet<String> = tokenize(text).collect();

    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for token in tokenize(job_description) {
        match index.get(&token) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(token.clone(), order.len());
                order.push((token, 1));
            }
        }
    }
    order.sort_by(|a, b| b.1.cmp(&a.1));

    let keywords: Vec<String> = order
        .into_iter()
        .take(MAX_KEYWORDS)
        .map(|(word, _)| word)
        .collect();
    if keywords.is_empty() {
        return KeywordMatch {
            score: 0,
            missing_keywords: Vec::new(),
        };
    }

    let (matched, missing): (Vec<String>, Vec<String>) = keywords
        .iter()
        .cloned()
        .partition(|keyword| text_tokens.contains(keyword));

    let score = ((matched.len() as f64 / keywords.len() as f64) * 100.0).round() as u8;

    KeywordMatch {
        score,
        missing_keywords: missing,
    }
}

/// Scores the source text (`pre`) and the generated representation (`post`).
pub fn score_card(source_text: &str, generated: &Value, job_description: Option<&str>) -> ScoreCard {
    let Some(job_description) = job_description else {
        return ScoreCard::default();
    };

    let generated_text = flatten_strings(generated);
    let pre = keyword_match(source_text, job_description);
    let post = keyword_match(&generated_text, job_description);

    ScoreCard {
        pre: pre.score,
        post: post.score,
        missing_keywords: post.missing_keywords,
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().filter_map(|word| {
        let cleaned: String = word
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_')
            .flat_map(char::to_lowercase)
            .collect();
        (cleaned.chars().count() >= MIN_TOKEN_CHARS).then_some(cleaned)
    })
}

fn flatten_strings(value: &Value) -> String {
    let mut out = String::new();
    collect_strings(value, &mut out);
    out
}

fn collect_strings(value: &Value, out: &mut String) {
    match value {
        Value::String(s) => {
            out.push_str(s);
            out.push(' ');
        }
        Value::Array(items) => items.iter().for_each(|item| collect_strings(item, out)),
        Value::Object(map) => map.values().for_each(|item| collect_strings(item, out)),
        _ => {}
    }
}
