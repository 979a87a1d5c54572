//! Operator graph walker and per-kind attribute extension.

use crate::model::{InputStreamDoc, OperatorDoc, OperatorGraphDoc, OutputStreamDoc};
use crate::plan::{JobNode, OpCode, OperatorSpec, PlanError};
use std::collections::{BTreeMap, BTreeSet};

/// Walk every operator reachable from the job's input streams.
///
/// Each reachable operator is emitted exactly once no matter how many paths lead
/// to it. `INPUT` operators are walked through but not emitted: the input stream
/// list already records them. Inputs without a root operator contribute an entry
/// with no successors.
pub fn walk_operator_graph(job: &JobNode) -> Result<OperatorGraphDoc, PlanError> {
    let mut operators: BTreeMap<String, OperatorDoc> = BTreeMap::new();
    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut input_streams = Vec::with_capacity(job.input_edges.len());

    for stream_id in job.input_edges.keys() {
        let Some(root_id) = job.input_operator(stream_id) else {
            input_streams.push(InputStreamDoc {
                stream_id: stream_id.clone(),
                next_operator_ids: Vec::new(),
            });
            continue;
        };

        let root = lookup(job, root_id)?;
        input_streams.push(InputStreamDoc {
            stream_id: stream_id.clone(),
            next_operator_ids: root.next_operator_ids.iter().cloned().collect(),
        });

        // Explicit stack instead of recursion; long pipelines stay flat.
        let mut stack: Vec<&OperatorSpec> = vec![root];
        while let Some(spec) = stack.pop() {
            if !visited.insert(spec.op_id.as_str()) {
                continue;
            }
            if spec.op_code != OpCode::Input {
                operators.insert(spec.op_id.clone(), operator_to_doc(job, spec)?);
            }
            for next_id in spec.next_operator_ids.iter().rev() {
                if !visited.contains(next_id.as_str()) {
                    stack.push(lookup(job, next_id)?);
                }
            }
        }
    }

    let output_streams = job
        .output_edges
        .keys()
        .map(|stream_id| OutputStreamDoc {
            stream_id: stream_id.clone(),
        })
        .collect();

    Ok(OperatorGraphDoc {
        input_streams,
        output_streams,
        operators,
    })
}

/// Serialize one operator: base attributes plus the fields its kind carries.
pub fn operator_to_doc(job: &JobNode, spec: &OperatorSpec) -> Result<OperatorDoc, PlanError> {
    let mut doc = OperatorDoc {
        op_code: spec.op_code.clone(),
        op_id: spec.op_id.clone(),
        source_location: spec.source_location.clone(),
        next_operator_ids: spec.next_operator_ids.iter().cloned().collect(),
        output_stream_id: None,
        table_id: None,
        ttl_ms: None,
    };

    match &spec.op_code {
        OpCode::Output | OpCode::PartitionBy => {
            let stream_id = required(job, spec, spec.output_stream_id.as_ref(), "outputStreamId")?;
            doc.output_stream_id = Some(stream_id.clone());
        }
        // Send-to-table and broadcast operators may not name a stream.
        OpCode::SendTo | OpCode::Broadcast => {
            doc.output_stream_id = spec.output_stream_id.clone();
        }
        OpCode::StreamTableJoin => {
            let table_id = required(job, spec, spec.table_id.as_ref(), "tableId")?;
            doc.table_id = Some(table_id.clone());
        }
        OpCode::Join => {
            let ttl_ms = *required(job, spec, spec.ttl_ms.as_ref(), "ttlMs")?;
            if ttl_ms < 0 {
                return Err(PlanError::NegativeRetention {
                    job: job.job_name.clone(),
                    op_id: spec.op_id.clone(),
                    ttl_ms,
                });
            }
            doc.ttl_ms = Some(ttl_ms);
        }
        OpCode::Input
        | OpCode::Map
        | OpCode::FlatMap
        | OpCode::AsyncFlatMap
        | OpCode::Filter
        | OpCode::Sink
        | OpCode::Window
        | OpCode::Merge
        | OpCode::Other(_) => {}
    }

    Ok(doc)
}

fn lookup<'a>(job: &'a JobNode, op_id: &str) -> Result<&'a OperatorSpec, PlanError> {
    job.operator(op_id).ok_or_else(|| PlanError::UnknownOperator {
        job: job.job_name.clone(),
        op_id: op_id.to_string(),
    })
}

fn required<'a, T>(
    job: &JobNode,
    spec: &OperatorSpec,
    value: Option<&'a T>,
    attribute: &'static str,
) -> Result<&'a T, PlanError> {
    value.ok_or_else(|| PlanError::MissingAttribute {
        job: job.job_name.clone(),
        op_id: spec.op_id.clone(),
        op_code: spec.op_code.clone(),
        attribute,
    })
}
