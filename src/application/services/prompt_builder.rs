use crate::domain::ChunkSpec;

const JOB_DESCRIPTION_PROMPT_LIMIT: usize = 500;

pub const DEFAULT_INSTRUCTION: &str =
    "Improve clarity and impact of the wording while keeping every fact unchanged.";

pub fn build_parse_prompt(source_text: &str, spec: &ChunkSpec) -> String {
    format!(
        r#"You are an expert resume parser.
1. Read the following resume text.
2. Extract *only* the content and structure it *exactly* according to the following JSON schema.
3. Do NOT optimize, rewrite, or improve the content. Keep it as close to the original as possible.
4. If a field is not present, return an empty value (e.g. "" or []).
5. For "experience" and "projects", look for URLs (especially in the '--- Extracted Links ---' section) and place the most relevant one in "primaryLinkUrl" and any others in "links".
6. FORMATTING: Ensure all strings are properly escaped. Do not include unescaped newlines inside JSON string values.
7. STRICT OUTPUT: Return ONLY the JSON object.

SECTION: {name}
JSON SCHEMA:
{schema}

-----BEGIN_RESUME_TEXT-----
{source_text}
-----END_RESUME_TEXT-----

Return *only* the populated JSON object."#,
        name = spec.name,
        schema = spec.schema,
    )
}

pub fn build_generate_prompt(
    source_text: &str,
    instruction: &str,
    job_description: Option<&str>,
    spec: &ChunkSpec,
) -> String {
    let tailoring = job_description
        .map(str::trim)
        .filter(|jd| !jd.is_empty())
        .map(|jd| {
            format!(
                "3. Tailor the content to better match this job description: \"{}\"\n",
                truncate_chars(jd, JOB_DESCRIPTION_PROMPT_LIMIT)
            )
        })
        .unwrap_or_default();

    format!(
        r#"You are an expert resume parser and optimizer.
1. Read the following resume text.
2. Apply this specific user instruction: "{instruction}".
{tailoring}4. Extract *only* the content and structure it *exactly* according to the following JSON schema.
5. If a field is not present in the resume text, return an empty value (e.g. "" or []).
6. For "experience" and "projects", look for URLs (especially in the '--- Extracted Links ---' section) and place the most relevant one in "primaryLinkUrl" and any others in "links".
7. Be conservative. If the instruction does not require a change, keep the original text.
8. FORMATTING: Ensure all strings are properly escaped. Do not include unescaped newlines inside JSON string values.
9. STRICT OUTPUT: Return ONLY the JSON object.

SECTION: {name}
JSON SCHEMA:
{schema}

-----BEGIN_RESUME_TEXT-----
{source_text}
-----END_RESUME_TEXT-----

Return *only* the populated JSON object."#,
        name = spec.name,
        schema = spec.schema,
    )
}

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
