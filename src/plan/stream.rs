//! Stream descriptors and the edges that connect jobs through them.

use std::fmt;

/// Partition count recorded for a stream whose partitioning was never resolved.
pub const PARTITIONS_UNKNOWN: i32 = -1;

/// A physical stream as resolved by the planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stream {
    pub id: String,
    /// Transport (system) the stream lives on, e.g. `kafka`.
    pub system_name: String,
    pub physical_name: String,
    pub partition_count: i32,
}

impl Stream {
    pub fn new(
        id: impl Into<String>,
        system_name: impl Into<String>,
        physical_name: impl Into<String>,
        partition_count: i32,
    ) -> Self {
        Self {
            id: id.into(),
            system_name: system_name.into(),
            physical_name: physical_name.into(),
            partition_count,
        }
    }
}

/// A stream plus the jobs producing into it and consuming from it.
///
/// Identity is the wrapped stream's id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEdge {
    pub stream: Stream,
    pub source_jobs: Vec<String>,
    pub target_jobs: Vec<String>,
}

/// Topological role of a stream edge within the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StreamRole {
    /// Produced outside the plan.
    Source,
    /// Consumed outside the plan.
    Sink,
    Intermediate,
}

impl StreamEdge {
    pub fn new(stream: Stream) -> Self {
        Self {
            stream,
            source_jobs: Vec::new(),
            target_jobs: Vec::new(),
        }
    }

    pub fn with_source_job(mut self, job_name: impl Into<String>) -> Self {
        self.source_jobs.push(job_name.into());
        self
    }

    pub fn with_target_job(mut self, job_name: impl Into<String>) -> Self {
        self.target_jobs.push(job_name.into());
        self
    }

    pub fn stream_id(&self) -> &str {
        &self.stream.id
    }

    /// Role derived from the producer/consumer lists.
    ///
    /// An edge with neither producers nor consumers would be both a source and a
    /// sink; it has no single role and yields `None`.
    pub fn role(&self) -> Option<StreamRole> {
        match (self.source_jobs.is_empty(), self.target_jobs.is_empty()) {
            (true, true) => None,
            (true, false) => Some(StreamRole::Source),
            (false, true) => Some(StreamRole::Sink),
            (false, false) => Some(StreamRole::Intermediate),
        }
    }
}

impl fmt::Display for StreamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StreamRole::Source => "source",
            StreamRole::Sink => "sink",
            StreamRole::Intermediate => "intermediate",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge() -> StreamEdge {
        StreamEdge::new(Stream::new("s1", "kafka", "s1-topic", 4))
    }

    #[test]
    fn role_follows_producer_and_consumer_lists() {
        assert_eq!(edge().with_target_job("a").role(), Some(StreamRole::Source));
        assert_eq!(edge().with_source_job("a").role(), Some(StreamRole::Sink));
        assert_eq!(
            edge().with_source_job("a").with_target_job("b").role(),
            Some(StreamRole::Intermediate)
        );
    }

    #[test]
    fn unattached_edge_has_no_role() {
        assert_eq!(edge().role(), None);
    }
}
