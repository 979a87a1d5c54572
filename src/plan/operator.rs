//! Operator specs: the nodes of a job's internal dataflow graph.
//!
//! An `OperatorSpec` is a tagged union: `op_code` is the tag and the optional
//! fields carry the attributes only some kinds have. Which kinds need which
//! attribute is decided in one place, `model::operators::operator_to_doc`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Kind of an operator. `Other` keeps op codes this crate does not know about so
/// plans produced by a newer planner still serialize.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OpCode {
    Input,
    Map,
    FlatMap,
    AsyncFlatMap,
    Filter,
    Sink,
    SendTo,
    /// Windowed stream-stream join; carries a retention (`ttl_ms`).
    Join,
    StreamTableJoin,
    Window,
    Merge,
    PartitionBy,
    Broadcast,
    Output,
    Other(String),
}

impl OpCode {
    pub fn as_str(&self) -> &str {
        match self {
            OpCode::Input => "INPUT",
            OpCode::Map => "MAP",
            OpCode::FlatMap => "FLAT_MAP",
            OpCode::AsyncFlatMap => "ASYNC_FLAT_MAP",
            OpCode::Filter => "FILTER",
            OpCode::Sink => "SINK",
            OpCode::SendTo => "SEND_TO",
            OpCode::Join => "JOIN",
            OpCode::StreamTableJoin => "STREAM_TABLE_JOIN",
            OpCode::Window => "WINDOW",
            OpCode::Merge => "MERGE",
            OpCode::PartitionBy => "PARTITION_BY",
            OpCode::Broadcast => "BROADCAST",
            OpCode::Output => "OUTPUT",
            OpCode::Other(name) => name,
        }
    }
}

impl From<String> for OpCode {
    fn from(s: String) -> Self {
        match s.as_str() {
            "INPUT" => OpCode::Input,
            "MAP" => OpCode::Map,
            "FLAT_MAP" => OpCode::FlatMap,
            "ASYNC_FLAT_MAP" => OpCode::AsyncFlatMap,
            "FILTER" => OpCode::Filter,
            "SINK" => OpCode::Sink,
            "SEND_TO" => OpCode::SendTo,
            "JOIN" => OpCode::Join,
            "STREAM_TABLE_JOIN" => OpCode::StreamTableJoin,
            "WINDOW" => OpCode::Window,
            "MERGE" => OpCode::Merge,
            "PARTITION_BY" => OpCode::PartitionBy,
            "BROADCAST" => OpCode::Broadcast,
            "OUTPUT" => OpCode::Output,
            _ => OpCode::Other(s),
        }
    }
}

impl From<OpCode> for String {
    fn from(code: OpCode) -> Self {
        match code {
            OpCode::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dataflow node. `next_operator_ids` holds direct successors only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorSpec {
    /// Unique within the owning job.
    pub op_id: String,
    pub op_code: OpCode,
    /// Free-form location of the user code that declared the operator.
    pub source_location: String,
    pub next_operator_ids: BTreeSet<String>,

    /// Required for `OUTPUT` and `PARTITION_BY`; optional for `SEND_TO` and
    /// `BROADCAST`, which may target a table or no single stream.
    pub output_stream_id: Option<String>,
    /// Set for `STREAM_TABLE_JOIN`.
    pub table_id: Option<String>,
    /// Set for `JOIN`. Kept signed so a bad planner value is caught at assembly.
    pub ttl_ms: Option<i64>,
}

impl OperatorSpec {
    pub fn new(op_id: impl Into<String>, op_code: OpCode) -> Self {
        Self {
            op_id: op_id.into(),
            op_code,
            source_location: String::new(),
            next_operator_ids: BTreeSet::new(),
            output_stream_id: None,
            table_id: None,
            ttl_ms: None,
        }
    }

    pub fn with_source_location(mut self, location: impl Into<String>) -> Self {
        self.source_location = location.into();
        self
    }

    pub fn with_next(mut self, op_id: impl Into<String>) -> Self {
        self.next_operator_ids.insert(op_id.into());
        self
    }

    pub fn with_output_stream(mut self, stream_id: impl Into<String>) -> Self {
        self.output_stream_id = Some(stream_id.into());
        self
    }

    pub fn with_table(mut self, table_id: impl Into<String>) -> Self {
        self.table_id = Some(table_id.into());
        self
    }

    pub fn with_ttl_ms(mut self, ttl_ms: i64) -> Self {
        self.ttl_ms = Some(ttl_ms);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_op_codes_keep_their_wire_names() {
        for name in ["INPUT", "PARTITION_BY", "STREAM_TABLE_JOIN", "ASYNC_FLAT_MAP"] {
            let code = OpCode::from(name.to_string());
            assert!(!matches!(code, OpCode::Other(_)), "{name} parsed as Other");
            assert_eq!(code.as_str(), name);
        }
    }

    #[test]
    fn unknown_op_code_is_preserved() {
        let code: OpCode = serde_json::from_str("\"SESSION_WINDOW\"").unwrap();
        assert_eq!(code, OpCode::Other("SESSION_WINDOW".to_string()));
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"SESSION_WINDOW\"");
    }
}
