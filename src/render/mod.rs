//! Encoders for the job graph document: JSON for tooling, HTML for people.

pub mod html;
pub mod json;

pub use html::render_html_report;
pub use json::{diff_sections, plan_to_json, to_json};
