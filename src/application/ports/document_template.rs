use serde_json::Value;

/// Turns a structured result into a self-contained display document.
pub trait DocumentTemplate: Send + Sync {
    fn render(&self, run_id: &str, data: &Value) -> String;
}
