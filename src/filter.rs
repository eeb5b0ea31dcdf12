//! Per-view row filtering over the loaded dataset

use std::collections::BTreeSet;

use crate::data::{Dataset, Record};

/// Default slider position for every view, fixed at (0, 100) no matter how
/// large the dataset's true maximum is (reference behavior, kept as-is)
pub const DEFAULT_CASE_RANGE: CaseRange = CaseRange {
    min: 0.0,
    max: 100.0,
};

/// Inclusive range over case counts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaseRange {
    pub min: f64,
    pub max: f64,
}

impl CaseRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A null count is never inside any range
    pub fn contains(&self, value: Option<f64>) -> bool {
        matches!(value, Some(v) if self.min <= v && v <= self.max)
    }
}

/// One predicate over a record field
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    RegionEquals(String),
    TownIn(BTreeSet<String>),
    CasesBetween(CaseRange),
}

impl Predicate {
    fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::RegionEquals(region) => record.region == *region,
            Predicate::TownIn(towns) => towns.contains(&record.town),
            Predicate::CasesBetween(range) => range.contains(record.case_count),
        }
    }
}

/// A conjunction of predicates narrowing one view's displayed rows.
/// Rebuilt from the current user input on every interaction, never persisted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSpec {
    predicates: Vec<Predicate>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Tree map view: one region plus a case range
    pub fn tree_map(region: &str, range: CaseRange) -> Self {
        Self::new()
            .with(Predicate::RegionEquals(region.to_string()))
            .with(Predicate::CasesBetween(range))
    }

    /// Line chart view: a set of towns plus a case range
    pub fn line_chart(towns: BTreeSet<String>, range: CaseRange) -> Self {
        Self::new()
            .with(Predicate::TownIn(towns))
            .with(Predicate::CasesBetween(range))
    }

    /// Bubble chart view: same predicates as the line chart. The range applies
    /// to the case count only, never to the percentage on the chart's x-axis.
    pub fn bubble_chart(towns: BTreeSet<String>, range: CaseRange) -> Self {
        Self::line_chart(towns, range)
    }

    /// True when the record satisfies every predicate
    pub fn matches(&self, record: &Record) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }

    /// Records satisfying the whole conjunction, dataset order preserved.
    /// No rows are fabricated, merged, or deduplicated; an empty result is
    /// a valid outcome, not an error.
    pub fn apply(&self, dataset: &Dataset) -> Vec<Record> {
        dataset
            .records()
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }
}
