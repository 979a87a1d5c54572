//! Plan data model.
//!
//! Everything here is produced once by the planner and read, never mutated, by
//! the serializer in `model`.

pub mod error;
pub mod job;
pub mod operator;
pub mod stream;

pub use error::PlanError;
pub use job::{JobNode, Plan, Table};
pub use operator::{OpCode, OperatorSpec};
pub use stream::{PARTITIONS_UNKNOWN, Stream, StreamEdge, StreamRole};
