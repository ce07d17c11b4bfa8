//! Minimal catalog and table-scan interfaces.
//!
//! The physical operators only need two things from the outside world: a
//! way to look up a table's column names/types/stats (`Catalog`), and a way
//! to pull its data chunk-by-chunk (`TableReader`). Everything upstream of
//! that - parsing, planning, storage format - is somebody else's problem;
//! this module's in-memory implementations exist so the runner can be
//! exercised and tested without a real storage engine.

use crate::common::error::{PrismDBError, PrismDBResult};
use crate::common::constants::STANDARD_VECTOR_SIZE;
use crate::types::{DataChunk, LogicalType, Vector};
use std::collections::HashMap;

/// Column and row-count statistics the planner/operators may consult.
#[derive(Debug, Clone, Default)]
pub struct TableStats {
    pub row_count: usize,
}

/// The schema of one table: column names, their types, and primary key
/// column indices.
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub columns: Vec<String>,
    pub types: Vec<LogicalType>,
    pub primary_key: Vec<usize>,
    pub stats: TableStats,
}

impl TableSchema {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Whatever can answer "what does table X look like" for a database.
pub trait Catalog: std::fmt::Debug {
    fn table(&self, db: &str, table: &str) -> PrismDBResult<TableSchema>;
}

/// Result of pulling one batch from a `TableReader`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadResult {
    HaveOutput,
    Done,
}

/// A cursor over one table's rows, restricted to the columns the caller
/// actually wants. Implementations own their position; `next` fills `chunk`
/// in place and reports whether it produced anything.
pub trait TableReader {
    fn next(&mut self, chunk: &mut DataChunk) -> PrismDBResult<ReadResult>;
    fn close(&mut self) -> PrismDBResult<()>;
}

/// A table held entirely in memory as column vectors, split into
/// `STANDARD_VECTOR_SIZE`-row batches as it's read.
#[derive(Debug, Clone)]
pub struct MemoryTable {
    pub schema: TableSchema,
    pub columns: Vec<Vec<crate::types::Value>>,
}

impl MemoryTable {
    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }
}

/// In-memory catalog + table store, keyed by `(db, table)`. Good enough to
/// drive the runner in tests without a real storage layer.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    tables: HashMap<(String, String), MemoryTable>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&mut self, db: &str, name: &str, table: MemoryTable) {
        self.tables.insert((db.to_string(), name.to_string()), table);
    }

    pub fn open(&self, db: &str, table: &str, wanted_columns: &[String]) -> PrismDBResult<MemoryTableReader> {
        let mem_table = self
            .tables
            .get(&(db.to_string(), table.to_string()))
            .ok_or_else(|| PrismDBError::Catalog(format!("no such table {}.{}", db, table)))?;

        let indices: Vec<usize> = if wanted_columns.is_empty() {
            (0..mem_table.schema.columns.len()).collect()
        } else {
            wanted_columns
                .iter()
                .map(|name| {
                    mem_table
                        .schema
                        .column_index(name)
                        .ok_or_else(|| PrismDBError::Catalog(format!("no such column {}", name)))
                })
                .collect::<PrismDBResult<Vec<_>>>()?
        };

        Ok(MemoryTableReader {
            columns: indices.iter().map(|&i| mem_table.columns[i].clone()).collect(),
            types: indices.iter().map(|&i| mem_table.schema.types[i].clone()).collect(),
            position: 0,
        })
    }
}

impl Catalog for MemoryCatalog {
    fn table(&self, db: &str, table: &str) -> PrismDBResult<TableSchema> {
        self.tables
            .get(&(db.to_string(), table.to_string()))
            .map(|t| t.schema.clone())
            .ok_or_else(|| PrismDBError::Catalog(format!("no such table {}.{}", db, table)))
    }
}

/// Reads a `MemoryTable`'s projected columns out in fixed-size batches.
pub struct MemoryTableReader {
    columns: Vec<Vec<crate::types::Value>>,
    types: Vec<LogicalType>,
    position: usize,
}

impl TableReader for MemoryTableReader {
    fn next(&mut self, chunk: &mut DataChunk) -> PrismDBResult<ReadResult> {
        let total_rows = self.columns.first().map(|c| c.len()).unwrap_or(0);
        if self.position >= total_rows {
            chunk.reset();
            return Ok(ReadResult::Done);
        }

        let batch_end = (self.position + STANDARD_VECTOR_SIZE).min(total_rows);
        let batch_len = batch_end - self.position;

        let mut vectors = Vec::with_capacity(self.columns.len());
        for (col_idx, column) in self.columns.iter().enumerate() {
            let mut vector = Vector::new(self.types[col_idx].clone(), batch_len);
            vector.resize(batch_len)?;
            for row in 0..batch_len {
                vector.set_value(row, &column[self.position + row])?;
            }
            vectors.push(vector);
        }

        chunk.reset();
        for (i, vector) in vectors.into_iter().enumerate() {
            chunk.add_vector(vector)?;
            let _ = i;
        }
        chunk.resize(batch_len)?;
        self.position = batch_end;
        Ok(ReadResult::HaveOutput)
    }

    fn close(&mut self) -> PrismDBResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn sample_table() -> MemoryTable {
        MemoryTable {
            schema: TableSchema {
                columns: vec!["id".to_string(), "name".to_string()],
                types: vec![LogicalType::Integer, LogicalType::Varchar],
                primary_key: vec![0],
                stats: TableStats { row_count: 3 },
            },
            columns: vec![
                vec![Value::integer(1), Value::integer(2), Value::integer(3)],
                vec![
                    Value::varchar("a".to_string()),
                    Value::varchar("b".to_string()),
                    Value::varchar("c".to_string()),
                ],
            ],
        }
    }

    #[test]
    fn test_catalog_lookup() -> PrismDBResult<()> {
        let mut catalog = MemoryCatalog::new();
        catalog.add_table("tpch", "t", sample_table());
        let schema = catalog.table("tpch", "t")?;
        assert_eq!(schema.columns, vec!["id", "name"]);
        Ok(())
    }

    #[test]
    fn test_reader_projects_wanted_columns_and_terminates() -> PrismDBResult<()> {
        let mut catalog = MemoryCatalog::new();
        catalog.add_table("tpch", "t", sample_table());
        let mut reader = catalog.open("tpch", "t", &["name".to_string()])?;

        let mut chunk = DataChunk::new();
        assert_eq!(reader.next(&mut chunk)?, ReadResult::HaveOutput);
        assert_eq!(chunk.column_count(), 1);
        assert_eq!(chunk.count(), 3);

        assert_eq!(reader.next(&mut chunk)?, ReadResult::Done);
        Ok(())
    }
}
