/// One independently-schemed section of a document. Parse and generate use
/// the same set; only the instructions around the schema differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpec {
    pub name: &'static str,
    pub schema: &'static str,
    /// Top-level keys this chunk owns in the merged result. Keys are disjoint
    /// across chunks.
    pub output_keys: &'static [&'static str],
}

impl ChunkSpec {
    pub fn owns(&self, key: &str) -> bool {
        self.output_keys.contains(&key)
    }
}

pub const CHUNK_SPECS: [ChunkSpec; 5] = [
    ChunkSpec {
        name: "header",
        schema: r#"{
  "name": "string (candidate's full name)",
  "contactInfo": {
    "email": "string",
    "phone": "string",
    "location": "string (City, State)",
    "linkedin": "string (profile URL)"
  },
  "objective": "string (a brief 1-2 sentence career objective, if present)"
}"#,
        output_keys: &["name", "contactInfo", "objective"],
    },
    ChunkSpec {
        name: "education",
        schema: r#"{
  "education": [
    {
      "school": "string (University Name, City, State)",
      "degree": "string (Degree, Major)",
      "details": ["string (e.g. Graduation Date: May 20XX)", "string (e.g. GPA: 3.X/4.0)"]
    }
  ]
}"#,
        output_keys: &["education"],
    },
    ChunkSpec {
        name: "experience",
        schema: r#"{
  "experience": [
    {
      "company": "string (Company Name, City, State)",
      "role": "string (Job Title)",
      "date": "string (e.g. Month 20XX - Present)",
      "primaryLinkUrl": "string (most relevant URL, or empty)",
      "links": [{ "text": "string", "url": "string" }],
      "bullets": ["string (achievement)"]
    }
  ]
}"#,
        output_keys: &["experience"],
    },
    ChunkSpec {
        name: "projects",
        schema: r#"{
  "projects": [
    {
      "name": "string (Project Name)",
      "description": "string (brief description or technologies)",
      "primaryLinkUrl": "string (most relevant URL, or empty)",
      "links": [{ "text": "string", "url": "string" }],
      "bullets": ["string (what you did)"]
    }
  ]
}"#,
        output_keys: &["projects"],
    },
    ChunkSpec {
        name: "skillsAndExtras",
        schema: r#"{
  "skills": {
    "languages": "string (e.g. JavaScript, Python, Java)",
    "technologies": "string (e.g. React, SQL, AWS, Docker)"
  },
  "certifications": ["string"],
  "activities": ["string"]
}"#,
        output_keys: &["skills", "certifications", "activities"],
    },
];

pub fn chunk_count() -> u32 {
    CHUNK_SPECS.len() as u32
}
