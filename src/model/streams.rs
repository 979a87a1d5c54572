//! Stream edge classification into source, sink and intermediate buckets.

use crate::diagnostics;
use crate::model::{StreamEdgeDoc, StreamSpecDoc};
use crate::plan::{Plan, PlanError, StreamEdge, StreamRole};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// The three role buckets, keyed by stream id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamBuckets {
    pub sources: BTreeMap<String, StreamEdgeDoc>,
    pub sinks: BTreeMap<String, StreamEdgeDoc>,
    pub intermediates: BTreeMap<String, StreamEdgeDoc>,
}

/// Deduplicates stream edges by id, first encounter wins.
#[derive(Debug, Default)]
pub struct StreamEdgeRegistry<'a> {
    edges: BTreeMap<&'a str, (StreamRole, &'a StreamEdge)>,
}

impl<'a> StreamEdgeRegistry<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `edge` if its id is new; return the registered edge either way.
    ///
    /// A repeat whose role differs from the registered one is a planner bug and
    /// fails. A repeat with the same role but different content is reported and
    /// ignored.
    pub fn insert(&mut self, edge: &'a StreamEdge) -> Result<&'a StreamEdge, PlanError> {
        let stream_id = edge.stream_id();
        let role = edge.role().ok_or_else(|| PlanError::UnattachedStream {
            stream_id: stream_id.to_string(),
        })?;

        match self.edges.entry(stream_id) {
            Entry::Vacant(entry) => {
                entry.insert((role, edge));
                Ok(edge)
            }
            Entry::Occupied(entry) => {
                let (first, registered) = *entry.get();
                if first != role {
                    return Err(PlanError::StreamRoleConflict {
                        stream_id: stream_id.to_string(),
                        first,
                        second: role,
                    });
                }
                if registered != edge {
                    diagnostics::warn(format!(
                        "stream '{}' is described differently by two jobs; keeping the first description",
                        stream_id
                    ));
                }
                Ok(registered)
            }
        }
    }

    pub fn into_buckets(self) -> StreamBuckets {
        let mut buckets = StreamBuckets::default();
        for (stream_id, (role, edge)) in self.edges {
            let bucket = match role {
                StreamRole::Source => &mut buckets.sources,
                StreamRole::Sink => &mut buckets.sinks,
                StreamRole::Intermediate => &mut buckets.intermediates,
            };
            bucket.insert(stream_id.to_string(), stream_edge_doc(edge));
        }
        buckets
    }
}

/// Classify every stream referenced as an input or output by any job.
pub fn classify_stream_edges(plan: &Plan) -> Result<StreamBuckets, PlanError> {
    let mut registry = StreamEdgeRegistry::new();
    for job in plan.sorted_jobs() {
        for edge in job.input_edges.values().chain(job.output_edges.values()) {
            registry.insert(edge)?;
        }
    }
    Ok(registry.into_buckets())
}

fn stream_edge_doc(edge: &StreamEdge) -> StreamEdgeDoc {
    StreamEdgeDoc {
        stream_spec: StreamSpecDoc {
            id: edge.stream.id.clone(),
            system_name: edge.stream.system_name.clone(),
            physical_name: edge.stream.physical_name.clone(),
            partition_count: edge.stream.partition_count,
        },
        source_jobs: edge.source_jobs.clone(),
        target_jobs: edge.target_jobs.clone(),
    }
}
