use crate::model::BenchmarkResult;

/// A single comparison cell, the average of one scenario on one target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// average time in nanoseconds
    Average(u64),
    /// scenario missing on that target or failed there
    Unavailable,
}

impl Cell {
    pub fn avg_ms(&self) -> Option<u64> {
        match self {
            Self::Average(nanos) => Some(nanos / 1_000_000),
            Self::Unavailable => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRow<'r> {
    pub key: &'r str,
    pub name: &'r str,
    /// one cell per result, in result order
    pub cells: Vec<Cell>,
}

/// Read-only cross-target view over an ordered list of results.
///
/// Rows are the scenarios of the first result in its order. Scenarios that
/// only appear in later results have no row.
#[derive(Debug, Clone, Copy)]
pub struct Comparison<'r> {
    results: &'r [BenchmarkResult],
}

impl<'r> Comparison<'r> {
    /// `None` unless at least two results are present
    pub fn new(results: &'r [BenchmarkResult]) -> Option<Self> {
        if results.len() < 2 {
            None
        } else {
            Some(Self { results })
        }
    }

    pub fn targets(&self) -> impl Iterator<Item = &'r str> {
        self.results.iter().map(|result| result.target_name.as_str())
    }

    pub fn rows(&self) -> impl Iterator<Item = ComparisonRow<'r>> + 'r {
        let results = self.results;

        results[0].outcomes().iter().map(move |outcome| ComparisonRow {
            key: outcome.key.as_str(),
            name: outcome.name.as_str(),
            cells: results
                .iter()
                .map(|result| {
                    result
                        .get(&outcome.key)
                        .and_then(|other| other.timing())
                        .map_or(Cell::Unavailable, |timing| Cell::Average(timing.avg_ns))
                })
                .collect(),
        })
    }

    pub fn row_count(&self) -> usize {
        self.results[0].len()
    }
}
