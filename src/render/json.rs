//! JSON encoding of the job graph document.

use crate::model::{self, JobGraphDoc};
use crate::plan::{Plan, PlanError};
use serde_json::Value;

/// Encode a document. `pretty` selects indented output for humans and diffs.
pub fn to_json(doc: &JobGraphDoc, pretty: bool) -> Result<String, PlanError> {
    let json = if pretty {
        serde_json::to_string_pretty(doc)?
    } else {
        serde_json::to_string(doc)?
    };
    Ok(json)
}

/// Build and encode the document for `plan` in one step.
pub fn plan_to_json(plan: &Plan) -> Result<String, PlanError> {
    to_json(&model::build_job_graph_doc(plan)?, false)
}

/// Sections of `actual` that differ from `expected`, in document order.
///
/// Top-level keys are compared whole, except `jobs`, which is compared per job so
/// a regression points at the job that changed. An empty result means equal.
pub fn diff_sections(actual: &Value, expected: &Value) -> Vec<String> {
    const SECTIONS: [&str; 6] = [
        "applicationName",
        "applicationId",
        "sourceStreams",
        "sinkStreams",
        "intermediateStreams",
        "tables",
    ];

    let mut out: Vec<String> = SECTIONS
        .iter()
        .filter(|key| actual.get(**key) != expected.get(**key))
        .map(|key| key.to_string())
        .collect();

    let actual_jobs = jobs_of(actual);
    let expected_jobs = jobs_of(expected);
    if actual_jobs.len() != expected_jobs.len() {
        out.push(format!(
            "jobs (count {} vs expected {})",
            actual_jobs.len(),
            expected_jobs.len()
        ));
    }
    for (i, (a, e)) in actual_jobs.iter().zip(expected_jobs.iter()).enumerate() {
        if a != e {
            let name = a
                .get("jobName")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| i.to_string());
            out.push(format!("jobs[{}] ({})", i, name));
        }
    }

    out
}

fn jobs_of(doc: &Value) -> &[Value] {
    doc.get("jobs")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{JobNode, OpCode, OperatorSpec, Table};
    use crate::testing::{edge, linear_job};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn document_shape_matches_reference_encoding() {
        let mut job = JobNode::new("enricher", "1");
        job.add_input(edge("clicks", &[], &["enricher"]), Some("input-clicks"));
        job.add_output(edge("enriched", &["enricher"], &[]));
        job.add_table(Table::new("users", "RocksDbTableProviderFactory"));
        job.add_operator(OperatorSpec::new("input-clicks", OpCode::Input).with_next("lookup"));
        job.add_operator(
            OperatorSpec::new("lookup", OpCode::StreamTableJoin)
                .with_source_location("Enricher.java:40")
                .with_table("users")
                .with_next("send"),
        );
        job.add_operator(OperatorSpec::new("send", OpCode::Output).with_output_stream("enriched"));
        let mut plan = Plan::new("enrich-app", "7");
        plan.jobs.push(job);

        let actual: Value = serde_json::from_str(&plan_to_json(&plan).unwrap()).unwrap();

        assert_eq!(
            actual,
            json!({
                "applicationName": "enrich-app",
                "applicationId": "7",
                "sourceStreams": {
                    "clicks": {
                        "streamSpec": {
                            "id": "clicks",
                            "systemName": "kafka",
                            "physicalName": "clicks-topic",
                            "partitionCount": 4
                        },
                        "sourceJobs": [],
                        "targetJobs": ["enricher"]
                    }
                },
                "sinkStreams": {
                    "enriched": {
                        "streamSpec": {
                            "id": "enriched",
                            "systemName": "kafka",
                            "physicalName": "enriched-topic",
                            "partitionCount": 4
                        },
                        "sourceJobs": ["enricher"],
                        "targetJobs": []
                    }
                },
                "intermediateStreams": {},
                "tables": {
                    "users": { "id": "users", "providerFactory": "RocksDbTableProviderFactory" }
                },
                "jobs": [{
                    "jobName": "enricher",
                    "jobId": "1",
                    "operatorGraph": {
                        "inputStreams": [
                            { "streamId": "clicks", "nextOperatorIds": ["lookup"] }
                        ],
                        "outputStreams": [ { "streamId": "enriched" } ],
                        "operators": {
                            "lookup": {
                                "opCode": "STREAM_TABLE_JOIN",
                                "opId": "lookup",
                                "sourceLocation": "Enricher.java:40",
                                "nextOperatorIds": ["send"],
                                "tableId": "users"
                            },
                            "send": {
                                "opCode": "OUTPUT",
                                "opId": "send",
                                "sourceLocation": "",
                                "nextOperatorIds": [],
                                "outputStreamId": "enriched"
                            }
                        }
                    }
                }]
            })
        );
    }

    #[test]
    fn encoding_is_byte_for_byte_stable() {
        let mut plan = Plan::new("app", "1");
        plan.jobs.push(linear_job("b", "in-b", "out-b"));
        plan.jobs.push(linear_job("a", "in-a", "out-a"));

        assert_eq!(plan_to_json(&plan).unwrap(), plan_to_json(&plan).unwrap());
    }

    #[test]
    fn diff_points_at_changed_sections() {
        let mut plan = Plan::new("app", "1");
        plan.jobs.push(linear_job("a", "in", "out"));
        let expected = serde_json::to_value(model::build_job_graph_doc(&plan).unwrap()).unwrap();

        plan.application_id = "2".into();
        plan.jobs[0]
            .operators
            .get_mut("map")
            .unwrap()
            .source_location = "moved".into();
        let actual = serde_json::to_value(model::build_job_graph_doc(&plan).unwrap()).unwrap();

        assert_eq!(
            diff_sections(&actual, &expected),
            vec!["applicationId".to_string(), "jobs[0] (a)".to_string()]
        );
        assert!(diff_sections(&expected, &expected).is_empty());
    }
}
