mod chromium_engine;
mod html_template;

pub use chromium_engine::{ChromiumEngine, ChromiumLauncher};
pub use html_template::HtmlResumeTemplate;
