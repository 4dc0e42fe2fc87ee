//! Minimal row/column table: CSV loading, inner join, projection, cleaning.
//!
//! Cells are kept as optional strings until the typed ingestion step in
//! [`crate::extract`]. Every operation returns a new table.

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{PipelineError, Result};

/// Cell values that count as missing, mirroring common dataframe readers.
const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Suffixes given to overlapping non-key columns by [`Table::inner_join`].
const LEFT_SUFFIX: &str = "_x";
const RIGHT_SUFFIX: &str = "_y";

pub type Row = Vec<Option<String>>;

/// An in-memory table of optional string cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

fn to_cell(raw: &str) -> Option<String> {
    if NA_MARKERS.contains(&raw) {
        None
    } else {
        Some(raw.to_string())
    }
}

impl Table {
    /// Build a table from headers and rows.
    ///
    /// Every row must have exactly one cell per column.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        if let Some(pos) = rows.iter().position(|r| r.len() != columns.len()) {
            return Err(PipelineError::schema(format!(
                "row {} has {} cells, expected {}",
                pos,
                rows[pos].len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Read a CSV file with a header row.
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let load_error = |message: String| PipelineError::DataLoadError {
            path: path.display().to_string(),
            message,
        };
        let file = std::fs::File::open(path).map_err(|e| load_error(e.to_string()))?;
        Self::from_csv_reader(file).map_err(|e| match e {
            PipelineError::DataLoadError { message, .. } => load_error(message),
            other => other,
        })
    }

    /// Read CSV data with a header row from any reader.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let load_error = |e: csv::Error| PipelineError::DataLoadError {
            path: "<reader>".to_string(),
            message: e.to_string(),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let columns: Vec<String> = reader
            .headers()
            .map_err(load_error)?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(load_error)?;
            rows.push(record.iter().map(to_cell).collect());
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `name`, or a schema error listing the available columns.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| {
                PipelineError::schema(format!(
                    "missing column '{}' (available: {})",
                    name,
                    self.columns.join(", ")
                ))
            })
    }

    /// Cell at (`row`, `column`), `None` when null or out of range.
    pub fn get(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_deref()
    }

    /// Inner join on `key`, present in both tables.
    ///
    /// Output rows follow left-table order, then right-match order. Output
    /// columns are the left columns followed by the right columns without
    /// the key; names present on both sides get `_x`/`_y` suffixes. Null
    /// keys never match.
    pub fn inner_join(&self, right: &Table, key: &str) -> Result<Table> {
        let left_key = self.column_index(key)?;
        let right_key = right.column_index(key)?;

        let left_names: HashSet<&str> = self.columns.iter().map(String::as_str).collect();
        let right_names: HashSet<&str> = right
            .columns
            .iter()
            .filter(|c| c.as_str() != key)
            .map(String::as_str)
            .collect();

        let mut columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                if c != key && right_names.contains(c.as_str()) {
                    format!("{}{}", c, LEFT_SUFFIX)
                } else {
                    c.clone()
                }
            })
            .collect();
        let right_keep: Vec<usize> = (0..right.columns.len())
            .filter(|&i| i != right_key)
            .collect();
        for &i in &right_keep {
            let name = &right.columns[i];
            if left_names.contains(name.as_str()) {
                columns.push(format!("{}{}", name, RIGHT_SUFFIX));
            } else {
                columns.push(name.clone());
            }
        }

        let mut index: HashMap<&str, Vec<usize>> = HashMap::new();
        for (i, row) in right.rows.iter().enumerate() {
            if let Some(value) = row[right_key].as_deref() {
                index.entry(value).or_default().push(i);
            }
        }

        let mut rows = Vec::new();
        for left_row in &self.rows {
            let Some(value) = left_row[left_key].as_deref() else {
                continue;
            };
            let Some(matches) = index.get(value) else {
                continue;
            };
            for &m in matches {
                let mut row = left_row.clone();
                row.extend(right_keep.iter().map(|&i| right.rows[m][i].clone()));
                rows.push(row);
            }
        }

        debug!(
            "joined {} x {} rows on '{}' into {} rows",
            self.len(),
            right.len(),
            key,
            rows.len()
        );
        Ok(Table { columns, rows })
    }

    /// Restrict to `names`, in that order.
    pub fn select(&self, names: &[&str]) -> Result<Table> {
        let indices = names
            .iter()
            .map(|n| self.column_index(n))
            .collect::<Result<Vec<_>>>()?;

        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Ok(Table {
            columns: names.iter().map(|n| n.to_string()).collect(),
            rows,
        })
    }

    /// Drop every row holding at least one null cell.
    pub fn drop_nulls(&self) -> Table {
        let rows = self
            .rows
            .iter()
            .filter(|row| row.iter().all(Option::is_some))
            .cloned()
            .collect();
        Table {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Drop rows identical to an earlier row, keeping the first occurrence.
    pub fn drop_duplicates(&self) -> Table {
        let mut seen: HashSet<&Row> = HashSet::new();
        let rows = self
            .rows
            .iter()
            .filter(|row| seen.insert(*row))
            .cloned()
            .collect();
        Table {
            columns: self.columns.clone(),
            rows,
        }
    }
}
