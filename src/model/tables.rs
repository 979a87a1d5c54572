//! Global table registry.

use crate::model::TableDoc;
use crate::plan::{Plan, PlanError, Table};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// One entry per table id, insert-if-absent.
#[derive(Debug, Default)]
pub struct TableRegistry {
    tables: BTreeMap<String, TableDoc>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `table`, or return the existing entry for its id.
    ///
    /// The same id with a different provider factory is rejected rather than
    /// overwritten.
    pub fn insert(&mut self, table: &Table) -> Result<&TableDoc, PlanError> {
        match self.tables.entry(table.id.clone()) {
            Entry::Vacant(entry) => Ok(&*entry.insert(TableDoc {
                id: table.id.clone(),
                provider_factory: table.provider_factory.clone(),
            })),
            Entry::Occupied(entry) => {
                let existing = entry.into_mut();
                if existing.provider_factory != table.provider_factory {
                    return Err(PlanError::TableConflict {
                        table_id: table.id.clone(),
                        existing: existing.provider_factory.clone(),
                        conflicting: table.provider_factory.clone(),
                    });
                }
                Ok(&*existing)
            }
        }
    }

    pub fn into_tables(self) -> BTreeMap<String, TableDoc> {
        self.tables
    }
}

/// Collect application-level tables, then the tables each job uses.
pub fn build_table_registry(plan: &Plan) -> Result<BTreeMap<String, TableDoc>, PlanError> {
    let mut registry = TableRegistry::new();
    for table in &plan.tables {
        registry.insert(table)?;
    }
    for job in plan.sorted_jobs() {
        for table in &job.tables {
            registry.insert(table)?;
        }
    }
    Ok(registry.into_tables())
}
