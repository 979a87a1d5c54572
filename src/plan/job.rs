//! Jobs, tables and the plan that owns them.

use crate::plan::{OperatorSpec, StreamEdge};
use std::collections::BTreeMap;

/// Keyed lookup table attached to the operators that join against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub id: String,
    /// Names the external strategy that constructs the table at runtime.
    pub provider_factory: String,
}

impl Table {
    pub fn new(id: impl Into<String>, provider_factory: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            provider_factory: provider_factory.into(),
        }
    }
}

/// One deployable unit of the plan.
///
/// The job owns its operator specs in `operators`; `input_operators` maps an input
/// stream to the id of the operator that receives it. An input stream without an
/// entry has no user-defined operator graph (task-only job).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobNode {
    pub job_name: String,
    pub job_id: String,
    pub input_edges: BTreeMap<String, StreamEdge>,
    pub output_edges: BTreeMap<String, StreamEdge>,
    pub input_operators: BTreeMap<String, String>,
    pub operators: BTreeMap<String, OperatorSpec>,
    pub tables: Vec<Table>,
}

impl JobNode {
    pub fn new(job_name: impl Into<String>, job_id: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            job_id: job_id.into(),
            ..Self::default()
        }
    }

    /// Declare an input stream, optionally rooted at operator `root`.
    pub fn add_input(&mut self, edge: StreamEdge, root: Option<&str>) {
        let stream_id = edge.stream_id().to_string();
        match root {
            Some(op_id) => {
                self.input_operators.insert(stream_id.clone(), op_id.to_string());
            }
            None => {
                self.input_operators.remove(&stream_id);
            }
        }
        self.input_edges.insert(stream_id, edge);
    }

    pub fn add_output(&mut self, edge: StreamEdge) {
        self.output_edges.insert(edge.stream_id().to_string(), edge);
    }

    pub fn add_operator(&mut self, spec: OperatorSpec) {
        self.operators.insert(spec.op_id.clone(), spec);
    }

    pub fn add_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    /// Root operator id for an input stream, `None` for a task-only input.
    pub fn input_operator(&self, stream_id: &str) -> Option<&str> {
        self.input_operators.get(stream_id).map(String::as_str)
    }

    pub fn operator(&self, op_id: &str) -> Option<&OperatorSpec> {
        self.operators.get(op_id)
    }
}

/// The physical plan of one application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub application_name: String,
    pub application_id: String,
    pub jobs: Vec<JobNode>,
    /// Tables declared at the application level. Jobs carry the tables they use
    /// as well; the same table may show up in both places.
    pub tables: Vec<Table>,
}

impl Plan {
    pub fn new(application_name: impl Into<String>, application_id: impl Into<String>) -> Self {
        Self {
            application_name: application_name.into(),
            application_id: application_id.into(),
            ..Self::default()
        }
    }

    /// Jobs in their serialization order: by job id, then job name.
    ///
    /// Ids are opaque strings and compare lexicographically, so `"10"` sorts
    /// before `"2"`.
    pub fn sorted_jobs(&self) -> Vec<&JobNode> {
        let mut jobs: Vec<&JobNode> = self.jobs.iter().collect();
        jobs.sort_by(|a, b| {
            a.job_id
                .cmp(&b.job_id)
                .then_with(|| a.job_name.cmp(&b.job_name))
        });
        jobs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_ids_sort_as_strings() {
        let mut plan = Plan::new("app", "1");
        for (name, id) in [("b", "2"), ("c", "10"), ("a", "2")] {
            plan.jobs.push(JobNode::new(name, id));
        }

        let order: Vec<(&str, &str)> = plan
            .sorted_jobs()
            .into_iter()
            .map(|j| (j.job_id.as_str(), j.job_name.as_str()))
            .collect();

        assert_eq!(order, vec![("10", "c"), ("2", "a"), ("2", "b")]);
    }
}
