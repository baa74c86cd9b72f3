use docpipe::application::ports::DocumentTemplate;
use docpipe::infrastructure::rendering::HtmlResumeTemplate;
use serde_json::json;

#[test]
fn given_full_representation_when_rendering_then_all_sections_present() {
    let data = json!({
        "name": "Ada Lovelace",
        "contactInfo": { "email": "ada@example.com", "phone": "" },
        "objective": "Build analytical engines",
        "education": [{ "school": "University of London", "degree": "Mathematics" }],
        "experience": [{ "company": "Babbage & Co", "role": "Engineer", "date": "1843", "bullets": ["Wrote the first program"] }],
        "skills": { "languages": "Rust, Python", "technologies": "" }
    });

    let html = HtmlResumeTemplate.render("run_abc", &data);

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>run_abc</title>"));
    assert!(html.contains("<h1>Ada Lovelace</h1>"));
    assert!(html.contains("<div class=\"contact\">ada@example.com</div>"));
    assert!(html.contains("<h2>Objective</h2><p>Build analytical engines</p>"));
    assert!(html.contains("Babbage &amp; Co"));
    assert!(html.contains("<li>Wrote the first program</li>"));
    assert!(html.contains("<li><b>Languages:</b> Rust, Python</li>"));
    assert!(!html.contains("Technologies"));
}

#[test]
fn given_non_object_data_when_rendering_then_empty_body() {
    let html = HtmlResumeTemplate.render("run_abc", &json!(["unexpected"]));

    assert!(html.ends_with("<body></body></html>"));
}

#[test]
fn given_markup_in_user_content_when_rendering_then_escaped() {
    let html = HtmlResumeTemplate.render("run_x", &json!({ "name": "<script>alert(1)</script>" }));

    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("<script>"));
}

#[test]
fn given_empty_section_when_rendering_then_section_skipped() {
    let html = HtmlResumeTemplate.render(
        "run_x",
        &json!({ "name": "Ada", "projects": [], "experience": [{ "company": "Acme", "bullets": ["Shipped"] }] }),
    );

    assert!(html.contains("<h2>Experience</h2>"));
    assert!(!html.contains("<h2>Projects</h2>"));
    assert!(html.contains("<li>Shipped</li>"));
}
