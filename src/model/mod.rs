//! Document model: the serializable shape of a plan, and its assembly.
//!
//! `build_job_graph_doc` runs the stream classifier and table registry once over
//! the whole plan and the operator walker once per job, then merges the results.
//! All maps are `BTreeMap` and all id sets are emitted sorted, so two builds of
//! the same plan produce identical documents.

pub mod operators;
pub mod streams;
pub mod tables;

use crate::plan::{OpCode, Plan, PlanError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamSpecDoc {
    pub id: String,
    pub system_name: String,
    pub physical_name: String,
    pub partition_count: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamEdgeDoc {
    pub stream_spec: StreamSpecDoc,
    pub source_jobs: Vec<String>,
    pub target_jobs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDoc {
    pub id: String,
    pub provider_factory: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputStreamDoc {
    pub stream_id: String,
    /// Operators fed directly by the stream's input operator.
    pub next_operator_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputStreamDoc {
    pub stream_id: String,
}

/// Serialized attributes of one operator: the base set plus whatever its kind adds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorDoc {
    pub op_code: OpCode,
    pub op_id: String,
    pub source_location: String,
    pub next_operator_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_stream_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_ms: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorGraphDoc {
    pub input_streams: Vec<InputStreamDoc>,
    pub output_streams: Vec<OutputStreamDoc>,
    pub operators: BTreeMap<String, OperatorDoc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDoc {
    pub job_name: String,
    pub job_id: String,
    pub operator_graph: OperatorGraphDoc,
}

/// Top-level document handed to deployment and visualization tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobGraphDoc {
    pub application_name: String,
    pub application_id: String,
    pub source_streams: BTreeMap<String, StreamEdgeDoc>,
    pub sink_streams: BTreeMap<String, StreamEdgeDoc>,
    pub intermediate_streams: BTreeMap<String, StreamEdgeDoc>,
    pub tables: BTreeMap<String, TableDoc>,
    pub jobs: Vec<JobDoc>,
}

/// Assemble the document for `plan`.
///
/// Fails on the first malformed element; no partial document is returned.
pub fn build_job_graph_doc(plan: &Plan) -> Result<JobGraphDoc, PlanError> {
    let streams = streams::classify_stream_edges(plan)?;
    let tables = tables::build_table_registry(plan)?;

    let mut jobs = Vec::with_capacity(plan.jobs.len());
    for job in plan.sorted_jobs() {
        jobs.push(JobDoc {
            job_name: job.job_name.clone(),
            job_id: job.job_id.clone(),
            operator_graph: operators::walk_operator_graph(job)?,
        });
    }

    Ok(JobGraphDoc {
        application_name: plan.application_name.clone(),
        application_id: plan.application_id.clone(),
        source_streams: streams.sources,
        sink_streams: streams.sinks,
        intermediate_streams: streams.intermediates,
        tables,
        jobs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{JobNode, OperatorSpec, StreamRole, Table};
    use crate::testing::{edge, linear_job, stream};
    use pretty_assertions::assert_eq;

    #[test]
    fn single_job_plan_has_one_source_and_one_sink() {
        let mut plan = Plan::new("app", "1");
        plan.jobs.push(linear_job("a", "in", "out"));

        let doc = build_job_graph_doc(&plan).unwrap();

        assert_eq!(doc.jobs.len(), 1);
        assert_eq!(doc.source_streams.len(), 1);
        assert_eq!(doc.sink_streams.len(), 1);
        assert_eq!(doc.intermediate_streams.len(), 0);
        assert_eq!(doc.tables.len(), 0);
        assert!(doc.source_streams.contains_key("in"));
        assert!(doc.sink_streams.contains_key("out"));
    }

    #[test]
    fn shared_stream_between_jobs_is_intermediate() {
        let s1 = edge("s1", &["A"], &["B"]);

        let mut a = JobNode::new("A", "1");
        a.add_input(edge("in", &[], &["A"]), None);
        a.add_output(s1.clone());
        let mut b = JobNode::new("B", "1");
        b.add_input(s1, None);
        b.add_output(edge("out", &["B"], &[]));

        let mut plan = Plan::new("app", "1");
        plan.jobs.push(b);
        plan.jobs.push(a);

        let doc = build_job_graph_doc(&plan).unwrap();

        let s1 = &doc.intermediate_streams["s1"];
        assert_eq!(s1.source_jobs, vec!["A".to_string()]);
        assert_eq!(s1.target_jobs, vec!["B".to_string()]);
        assert!(!doc.source_streams.contains_key("s1"));
        assert!(!doc.sink_streams.contains_key("s1"));
        let names: Vec<&str> = doc.jobs.iter().map(|j| j.job_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn every_stream_lands_in_exactly_one_bucket() {
        let mut a = linear_job("a", "in", "mid");
        a.output_edges.insert("mid".into(), edge("mid", &["a"], &["b"]));
        let mut b = linear_job("b", "mid", "out");
        b.input_edges.insert("mid".into(), edge("mid", &["a"], &["b"]));
        let mut plan = Plan::new("app", "1");
        plan.jobs.extend([a, b]);

        let doc = build_job_graph_doc(&plan).unwrap();

        for id in ["in", "mid", "out"] {
            let hits = [
                doc.source_streams.contains_key(id),
                doc.sink_streams.contains_key(id),
                doc.intermediate_streams.contains_key(id),
            ];
            assert_eq!(hits.iter().filter(|h| **h).count(), 1, "stream {id}");
        }
    }

    #[test]
    fn table_shared_by_two_jobs_is_registered_once() {
        let mut a = linear_job("a", "in-a", "out-a");
        a.add_table(Table::new("users", "RocksDbTableProviderFactory"));
        let mut b = linear_job("b", "in-b", "out-b");
        b.add_table(Table::new("users", "RocksDbTableProviderFactory"));
        let mut plan = Plan::new("app", "1");
        plan.jobs.extend([a, b]);

        let doc = build_job_graph_doc(&plan).unwrap();

        assert_eq!(doc.tables.len(), 1);
        assert_eq!(doc.tables["users"].provider_factory, "RocksDbTableProviderFactory");
    }

    #[test]
    fn building_twice_is_identical_regardless_of_job_order() {
        let mut first = Plan::new("app", "1");
        first.jobs.push(linear_job("a", "in-a", "out-a"));
        first.jobs.push(linear_job("b", "in-b", "out-b"));
        let mut second = first.clone();
        second.jobs.reverse();

        let a = crate::render::json::to_json(&build_job_graph_doc(&first).unwrap(), false).unwrap();
        let b = crate::render::json::to_json(&build_job_graph_doc(&second).unwrap(), false).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn malformed_operator_aborts_the_whole_document() {
        let mut job = JobNode::new("a", "1");
        job.add_input(edge("in", &[], &["a"]), Some("input"));
        job.add_operator(OperatorSpec::new("input", OpCode::Input).with_next("join"));
        job.add_operator(OperatorSpec::new("join", OpCode::Join).with_ttl_ms(-5));
        let mut plan = Plan::new("app", "1");
        plan.jobs.push(job);

        let err = build_job_graph_doc(&plan).unwrap_err();

        assert!(matches!(err, PlanError::NegativeRetention { ttl_ms: -5, .. }));
        assert!(err.to_string().contains("'join'"));
    }

    #[test]
    fn jobs_disagreeing_on_a_stream_role_abort_the_document() {
        // "a" consumes s1 believing nothing produces it; "b" claims to produce it.
        let mut reader = JobNode::new("a", "1");
        reader.add_input(edge("s1", &[], &["a"]), None);
        let mut writer = JobNode::new("b", "2");
        writer.add_output(edge("s1", &["b"], &["a"]));
        let mut plan = Plan::new("app", "1");
        plan.jobs.push(writer);
        plan.jobs.push(reader);

        let err = build_job_graph_doc(&plan).unwrap_err();

        match err {
            PlanError::StreamRoleConflict {
                stream_id,
                first,
                second,
            } => {
                assert_eq!(stream_id, "s1");
                assert_eq!(first, StreamRole::Source);
                assert_eq!(second, StreamRole::Intermediate);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn stream_spec_fields_come_from_the_descriptor() {
        let mut plan = Plan::new("app", "1");
        plan.jobs.push(linear_job("a", "in", "out"));

        let doc = build_job_graph_doc(&plan).unwrap();

        let expected = stream("in");
        let spec = &doc.source_streams["in"].stream_spec;
        assert_eq!(spec.id, expected.id);
        assert_eq!(spec.system_name, expected.system_name);
        assert_eq!(spec.physical_name, expected.physical_name);
        assert_eq!(spec.partition_count, expected.partition_count);
    }
}
