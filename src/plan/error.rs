use crate::plan::{OpCode, StreamRole};
use thiserror::Error;

/// A plan that cannot be serialized. Every variant names the offending id.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("job '{job}': operator '{op_id}' has negative retention {ttl_ms}ms")]
    NegativeRetention {
        job: String,
        op_id: String,
        ttl_ms: i64,
    },

    #[error("job '{job}': {op_code} operator '{op_id}' is missing {attribute}")]
    MissingAttribute {
        job: String,
        op_id: String,
        op_code: OpCode,
        attribute: &'static str,
    },

    #[error("job '{job}': operator '{op_id}' is referenced but not defined")]
    UnknownOperator { job: String, op_id: String },

    #[error(
        "table '{table_id}' registered with provider '{existing}' and again with '{conflicting}'"
    )]
    TableConflict {
        table_id: String,
        existing: String,
        conflicting: String,
    },

    #[error("stream '{stream_id}' is classified both as {first} and as {second}")]
    StreamRoleConflict {
        stream_id: String,
        first: StreamRole,
        second: StreamRole,
    },

    #[error("stream '{stream_id}' has no producing or consuming job")]
    UnattachedStream { stream_id: String },

    #[error("failed to encode job graph: {0}")]
    Encoding(#[from] serde_json::Error),
}
