//! Plan file (plan.json) written by the planner.
//!
//! JSON shape:
//! {
//!   "applicationName": "page-view-app",
//!   "applicationId": "1",
//!   "streams": [
//!     { "id": "page-views", "systemName": "kafka", "physicalName": "PageViews", "partitionCount": 8 }
//!   ],
//!   "tables": [ { "id": "users", "providerFactory": "RocksDbTableProviderFactory" } ],
//!   "jobs": [
//!     {
//!       "jobName": "filter",
//!       "jobId": "1",
//!       "inputs": ["page-views"],          // stream ids consumed
//!       "outputs": ["filtered"],           // stream ids produced
//!       "tables": ["users"],               // optional
//!       "inputOperators": { "page-views": "input-1" },   // null => task-only input
//!       "operators": [
//!         { "opId": "input-1", "opCode": "INPUT", "next": ["filter-2"] },
//!         ...
//!       ]
//!     }
//!   ]
//! }
//!
//! Streams and tables are declared once; jobs refer to them by id. Producer and
//! consumer lists of each stream edge are derived from the jobs' outputs/inputs.

use crate::Result;
use crate::diagnostics;
use crate::plan::{
    JobNode, OpCode, OperatorSpec, PARTITIONS_UNKNOWN, Plan, Stream, StreamEdge, Table,
};
use crate::spec::IdRules;

use anyhow::bail;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSpec {
    pub application_name: String,

    #[serde(default)]
    pub application_id: String,

    #[serde(default)]
    pub streams: Vec<RawStream>,

    #[serde(default)]
    pub tables: Vec<RawTable>,

    #[serde(default)]
    pub jobs: Vec<RawJob>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStream {
    pub id: String,

    pub system_name: String,

    /// Defaults to the stream id.
    #[serde(default)]
    pub physical_name: Option<String>,

    #[serde(default = "unknown_partitions")]
    pub partition_count: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTable {
    pub id: String,
    pub provider_factory: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawJob {
    pub job_name: String,

    #[serde(default = "default_job_id")]
    pub job_id: String,

    #[serde(default)]
    pub inputs: Vec<String>,

    #[serde(default)]
    pub outputs: Vec<String>,

    #[serde(default)]
    pub tables: Vec<String>,

    #[serde(default)]
    pub input_operators: BTreeMap<String, Option<String>>,

    #[serde(default)]
    pub operators: Vec<RawOperator>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOperator {
    pub op_id: String,

    pub op_code: OpCode,

    #[serde(default)]
    pub source_location: String,

    #[serde(default)]
    pub next: Vec<String>,

    #[serde(default)]
    pub output_stream_id: Option<String>,

    #[serde(default)]
    pub table_id: Option<String>,

    #[serde(default)]
    pub ttl_ms: Option<i64>,
}

fn unknown_partitions() -> i32 {
    PARTITIONS_UNKNOWN
}

fn default_job_id() -> String {
    "1".to_string()
}

impl PlanSpec {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| {
            anyhow::anyhow!(
                "{}",
                diagnostics::error_message(format!("malformed plan file: {}", e))
            )
        })
    }

    /// Validate references and build the in-memory plan.
    ///
    /// Phases:
    /// 1) Streams and tables: valid, unique ids; sane partition counts.
    /// 2) Jobs: unique (name, id); every stream, table and operator reference resolves.
    /// 3) Derive producer/consumer lists and attach stream edges to jobs.
    pub fn validate_and_build(&self) -> Result<Plan> {
        let ids = IdRules::new()?;

        // Phase 1a: streams.
        let mut streams: BTreeMap<&str, Stream> = BTreeMap::new();
        for raw in &self.streams {
            ids.check("stream", &raw.id)?;
            if raw.partition_count < 1 && raw.partition_count != PARTITIONS_UNKNOWN {
                bail!(
                    "{}",
                    diagnostics::error_message(format!(
                        "stream '{}' has invalid partition count {}",
                        raw.id, raw.partition_count
                    ))
                );
            }
            let stream = Stream::new(
                raw.id.as_str(),
                raw.system_name.as_str(),
                raw.physical_name.clone().unwrap_or_else(|| raw.id.clone()),
                raw.partition_count,
            );
            if streams.insert(&raw.id, stream).is_some() {
                bail!(
                    "{}",
                    diagnostics::error_message(format!("duplicate stream id in plan: {}", raw.id))
                );
            }
        }

        // Phase 1b: tables.
        let mut tables: BTreeMap<&str, Table> = BTreeMap::new();
        for raw in &self.tables {
            ids.check("table", &raw.id)?;
            if tables
                .insert(&raw.id, Table::new(raw.id.as_str(), raw.provider_factory.as_str()))
                .is_some()
            {
                bail!(
                    "{}",
                    diagnostics::error_message(format!("duplicate table id in plan: {}", raw.id))
                );
            }
        }

        // Phase 2: jobs.
        let mut seen_jobs: BTreeSet<(&str, &str)> = BTreeSet::new();
        let mut jobs: Vec<JobNode> = Vec::with_capacity(self.jobs.len());
        for raw in &self.jobs {
            if !seen_jobs.insert((raw.job_name.as_str(), raw.job_id.as_str())) {
                bail!(
                    "{}",
                    diagnostics::error_message(format!(
                        "duplicate job '{}' (id {}) in plan",
                        raw.job_name, raw.job_id
                    ))
                );
            }
            jobs.push(build_job(raw, &streams, &tables)?);
        }

        // Phase 3: producer/consumer lists, in job declaration order.
        let mut producers: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        let mut consumers: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for raw in &self.jobs {
            for s in &raw.outputs {
                producers.entry(s).or_default().push(&raw.job_name);
            }
            for s in &raw.inputs {
                consumers.entry(s).or_default().push(&raw.job_name);
            }
        }

        let edge_for = |stream_id: &str| -> StreamEdge {
            let edge = producers
                .get(stream_id)
                .into_iter()
                .flatten()
                .fold(StreamEdge::new(streams[stream_id].clone()), |e, job| {
                    e.with_source_job(*job)
                });
            consumers
                .get(stream_id)
                .into_iter()
                .flatten()
                .fold(edge, |e, job| e.with_target_job(*job))
        };

        for (job, raw) in jobs.iter_mut().zip(&self.jobs) {
            for s in &raw.inputs {
                let root = raw.input_operators.get(s).and_then(Option::as_deref);
                job.add_input(edge_for(s), root);
            }
            for s in &raw.outputs {
                job.add_output(edge_for(s));
            }
        }

        for id in streams.keys() {
            if !producers.contains_key(id) && !consumers.contains_key(id) {
                diagnostics::warn(format!(
                    "stream '{}' is declared but no job reads or writes it; it is left out of the job graph",
                    id
                ));
            }
        }

        Ok(Plan {
            application_name: self.application_name.clone(),
            application_id: self.application_id.clone(),
            jobs,
            tables: tables.into_values().collect(),
        })
    }
}

/// Build one job's operator arena and table list. Stream edges are attached later,
/// once every job's inputs and outputs are known.
fn build_job(
    raw: &RawJob,
    streams: &BTreeMap<&str, Stream>,
    tables: &BTreeMap<&str, Table>,
) -> Result<JobNode> {
    let job_name = raw.job_name.as_str();
    let mut job = JobNode::new(job_name, raw.job_id.as_str());

    let stream_ref = |s: &str, role: &str| -> Result<()> {
        if !streams.contains_key(s) {
            bail!(
                "{}",
                diagnostics::error_message(format!(
                    "job '{}' {} unknown stream '{}'",
                    job_name, role, s
                ))
            );
        }
        Ok(())
    };

    for (list, role) in [(&raw.inputs, "reads"), (&raw.outputs, "writes")] {
        let mut seen = BTreeSet::new();
        for s in list {
            stream_ref(s, role)?;
            if !seen.insert(s) {
                bail!(
                    "{}",
                    diagnostics::error_message(format!(
                        "job '{}' lists stream '{}' twice in its {}",
                        job_name,
                        s,
                        if role == "reads" { "inputs" } else { "outputs" }
                    ))
                );
            }
        }
    }

    // Operators.
    for op in &raw.operators {
        if job.operators.contains_key(&op.op_id) {
            bail!(
                "{}",
                diagnostics::error_message(format!(
                    "job '{}' has duplicate operator id '{}'",
                    job_name, op.op_id
                ))
            );
        }
        let mut spec = OperatorSpec::new(op.op_id.as_str(), op.op_code.clone())
            .with_source_location(op.source_location.as_str());
        spec.next_operator_ids = op.next.iter().cloned().collect();
        spec.output_stream_id = op.output_stream_id.clone();
        spec.table_id = op.table_id.clone();
        spec.ttl_ms = op.ttl_ms;
        job.add_operator(spec);
    }

    for spec in job.operators.values() {
        for next in &spec.next_operator_ids {
            if !job.operators.contains_key(next) {
                bail!(
                    "{}",
                    diagnostics::error_message(format!(
                        "job '{}': operator '{}' references missing next operator '{}'",
                        job_name, spec.op_id, next
                    ))
                );
            }
        }
        if let Some(s) = &spec.output_stream_id {
            stream_ref(s, "has an operator writing to")?;
        }
    }

    // Root operator per input stream.
    for (stream_id, root) in &raw.input_operators {
        if !raw.inputs.contains(stream_id) {
            bail!(
                "{}",
                diagnostics::error_message(format!(
                    "job '{}' roots an operator on '{}', which is not one of its inputs",
                    job_name, stream_id
                ))
            );
        }
        if let Some(op_id) = root {
            if !job.operators.contains_key(op_id) {
                bail!(
                    "{}",
                    diagnostics::error_message(format!(
                        "job '{}': input '{}' starts at missing operator '{}'",
                        job_name, stream_id, op_id
                    ))
                );
            }
        }
    }

    // Tables: declared ones first, then any a join refers to without declaring.
    let mut table_ids: Vec<&str> = Vec::new();
    for t in &raw.tables {
        lookup_table(tables, job_name, t)?;
        if !table_ids.contains(&t.as_str()) {
            table_ids.push(t);
        }
    }
    for spec in job.operators.values() {
        if let Some(t) = &spec.table_id {
            lookup_table(tables, job_name, t)?;
            if !table_ids.contains(&t.as_str()) {
                table_ids.push(t);
            }
        }
    }
    let job_tables: Vec<Table> = table_ids
        .into_iter()
        .map(|t| lookup_table(tables, job_name, t).cloned())
        .collect::<Result<_>>()?;
    for table in job_tables {
        job.add_table(table);
    }

    Ok(job)
}

fn lookup_table<'a>(
    tables: &'a BTreeMap<&str, Table>,
    job_name: &str,
    table_id: &str,
) -> Result<&'a Table> {
    match tables.get(table_id) {
        Some(table) => Ok(table),
        None => bail!(
            "{}",
            diagnostics::error_message(format!(
                "job '{}' references unknown table '{}'",
                job_name, table_id
            ))
        ),
    }
}
