//! Spec layer: the plan file schema and its validation.
//!
//! This module is intentionally separate from serialization. It owns:
//! - id rules for streams and tables
//! - the plan.json schema (raw serde shape) and its conversion into `plan::Plan`

pub mod ident;
pub mod plan;

pub use ident::IdRules;
pub use plan::{PlanSpec, RawJob, RawOperator, RawStream, RawTable};
