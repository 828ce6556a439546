//! Generation history and its tabular form.
//!
//! [`GenerationHistory`] accumulates one [`GenerationRecord`] per executed
//! generation. At the end of a run it is materialized once into an
//! [`EvolutionTable`], a column-oriented view with one named column per
//! record field.

use evosim_types::GenerationRecord;
use serde::Serialize;

/// Ordered records of the executed generations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GenerationHistory {
    records: Vec<GenerationRecord>,
}

impl GenerationHistory {
    /// Create an empty history with room for `capacity` records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Append a record.
    pub fn push(&mut self, record: GenerationRecord) {
        self.records.push(record);
    }

    /// All records in generation order.
    pub fn records(&self) -> &[GenerationRecord] {
        &self.records
    }

    /// The most recent record.
    pub fn last(&self) -> Option<&GenerationRecord> {
        self.records.last()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no generation has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Build the column-oriented table.
    pub fn to_table(&self) -> EvolutionTable {
        let mut columns: Vec<Column> = GenerationRecord::COLUMNS
            .iter()
            .map(|&name| Column {
                name,
                values: Vec::with_capacity(self.records.len()),
            })
            .collect();
        for record in &self.records {
            for (column, value) in columns.iter_mut().zip(record.values()) {
                column.values.push(value);
            }
        }
        EvolutionTable { columns }
    }
}

/// One named column of an [`EvolutionTable`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    /// Record field name.
    pub name: &'static str,
    /// One value per generation.
    pub values: Vec<f64>,
}

/// Column-oriented view of a run, one column per record field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionTable {
    columns: Vec<Column>,
}

impl EvolutionTable {
    /// Every column, in record field order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Look up a column by field name.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Number of rows (generations).
    pub fn rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }
}
