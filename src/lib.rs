//! Physical execution plan model for multi-job stream applications, and its
//! serialization into a job graph document.
//!
//! ```text
//! plan.json --spec--> Plan --model--> JobGraphDoc --render--> JSON / HTML
//! ```

pub mod diagnostics;
pub mod model;
pub mod plan;
pub mod render;
pub mod spec;

#[cfg(test)]
mod testing;

pub type Result<T> = anyhow::Result<T>;

pub use model::{JobGraphDoc, build_job_graph_doc};
pub use plan::{Plan, PlanError};
pub use render::plan_to_json;
