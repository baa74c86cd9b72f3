use serde_json::{Map, Value};

use crate::application::ports::DocumentTemplate;

const STYLE: &str = r#"
body { font-family: Georgia, 'Times New Roman', serif; font-size: 11pt; margin: 0.6in; color: #111; }
h1 { font-size: 20pt; margin: 0; text-align: center; }
.contact { text-align: center; font-size: 9.5pt; margin: 4px 0 12px; }
h2 { font-size: 11.5pt; text-transform: uppercase; border-bottom: 1px solid #333; margin: 14px 0 6px; }
.entry { margin-bottom: 8px; }
.entry-head { display: flex; justify-content: space-between; font-weight: bold; }
.entry-sub { font-style: italic; }
ul { margin: 2px 0 0 18px; padding: 0; }
li { margin: 1px 0; }
"#;

/// Single-page resume layout over the merged chunk output.
pub struct HtmlResumeTemplate;

impl DocumentTemplate for HtmlResumeTemplate {
    fn render(&self, run_id: &str, data: &Value) -> String {
        let empty = Map::new();
        let data = data.as_object().unwrap_or(&empty);

        let mut body = String::new();
        render_header(data, &mut body);
        render_section("Objective", data.get("objective"), &mut body, |v, out| {
            push_paragraph(v, out)
        });
        render_section("Education", data.get("education"), &mut body, |v, out| {
            for item in items(v) {
                push_entry(field(item, "school"), field(item, "degree"), "", item.get("details"), out);
            }
        });
        render_section("Experience", data.get("experience"), &mut body, |v, out| {
            for item in items(v) {
                push_entry(field(item, "company"), field(item, "role"), field(item, "date"), item.get("bullets"), out);
            }
        });
        render_section("Projects", data.get("projects"), &mut body, |v, out| {
            for item in items(v) {
                push_entry(field(item, "name"), field(item, "description"), "", item.get("bullets"), out);
            }
        });
        render_section("Skills", data.get("skills"), &mut body, |v, out| {
            if let Some(skills) = v.as_object() {
                out.push_str("<ul>");
                for (label, value) in skills {
                    if let Some(text) = value.as_str().filter(|t| !t.trim().is_empty()) {
                        out.push_str(&format!("<li><b>{}:</b> {}</li>", escape(&title_case(label)), escape(text)));
                    }
                }
                out.push_str("</ul>");
            }
        });
        render_section("Certifications", data.get("certifications"), &mut body, push_list);
        render_section("Activities", data.get("activities"), &mut body, push_list);

        format!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title><style>{}</style></head><body>{}</body></html>",
            escape(run_id),
            STYLE,
            body
        )
    }
}

fn render_header(data: &Map<String, Value>, out: &mut String) {
    if let Some(name) = data.get("name").and_then(Value::as_str) {
        out.push_str(&format!("<h1>{}</h1>", escape(name)));
    }
    if let Some(contact) = data.get("contactInfo").and_then(Value::as_object) {
        let parts: Vec<String> = ["email", "phone", "location", "linkedin"]
            .iter()
            .filter_map(|k| contact.get(*k).and_then(Value::as_str))
            .filter(|s| !s.trim().is_empty())
            .map(escape)
            .collect();
        if !parts.is_empty() {
            out.push_str(&format!("<div class=\"contact\">{}</div>", parts.join(" | ")));
        }
    }
}

fn render_section(
    title: &str,
    value: Option<&Value>,
    out: &mut String,
    render: impl FnOnce(&Value, &mut String),
) {
    let Some(value) = value.filter(|v| !is_blank(v)) else {
        return;
    };
    out.push_str(&format!("<h2>{}</h2>", escape(title)));
    render(value, out);
}

fn push_entry(title: &str, subtitle: &str, date: &str, bullets: Option<&Value>, out: &mut String) {
    out.push_str("<div class=\"entry\"><div class=\"entry-head\"><span>");
    out.push_str(&escape(title));
    out.push_str("</span><span>");
    out.push_str(&escape(date));
    out.push_str("</span></div>");
    if !subtitle.is_empty() {
        out.push_str(&format!("<div class=\"entry-sub\">{}</div>", escape(subtitle)));
    }
    if let Some(bullets) = bullets {
        push_list(bullets, out);
    }
    out.push_str("</div>");
}

fn push_list(value: &Value, out: &mut String) {
    let lines: Vec<&str> = items(value).filter_map(Value::as_str).collect();
    if lines.is_empty() {
        return;
    }
    out.push_str("<ul>");
    for line in lines {
        out.push_str(&format!("<li>{}</li>", escape(line)));
    }
    out.push_str("</ul>");
}

fn push_paragraph(value: &Value, out: &mut String) {
    if let Some(text) = value.as_str() {
        out.push_str(&format!("<p>{}</p>", escape(text)));
    }
}

fn items(value: &Value) -> impl Iterator<Item = &Value> {
    value.as_array().into_iter().flatten()
}

fn field<'a>(item: &'a Value, key: &str) -> &'a str {
    item.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.values().all(is_blank),
        _ => false,
    }
}

fn title_case(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
