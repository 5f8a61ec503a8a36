//! Tabular sheets and the reader seam.
//!
//! A sheet is an ordered list of rows; a row maps column name → JSON scalar.
//! Only JSON files (an array of objects) and in-memory sheets are supported
//! here. Spreadsheet and remote readers plug in through [`SheetReader`].

use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::vocab::is_truthy;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(pub Map<String, Value>);

impl Row {
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.0.get(column).filter(|v| !v.is_null())
    }

    /// Cell rendered as text; numbers and booleans are stringified, null is `None`.
    pub fn text(&self, column: &str) -> Option<String> {
        match self.value(column)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }

    /// Like [`Row::text`], but blank cells are `None` too.
    pub fn non_empty(&self, column: &str) -> Option<String> {
        self.text(column).filter(|s| !s.trim().is_empty())
    }

    pub fn truthy(&self, column: &str) -> bool {
        self.text(column).is_some_and(|s| is_truthy(&s))
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Row>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Build a sheet from a JSON array of objects.
    pub fn from_json(name: impl Into<String>, value: Value) -> Result<Self> {
        let name = name.into();
        let Value::Array(items) = value else {
            return Err(anyhow!("sheet '{name}' must be a JSON array of rows"));
        };
        let mut rows = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            match item {
                Value::Object(map) => rows.push(Row(map)),
                _ => return Err(anyhow!("sheet '{name}' row {i} is not an object")),
            }
        }
        Ok(Self { name, rows })
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.rows.iter().any(|r| r.0.contains_key(column))
    }

    /// Rows whose `column` equals `value` after trimming.
    pub fn rows_where<'a>(
        &'a self,
        column: &'a str,
        value: &'a str,
    ) -> impl Iterator<Item = &'a Row> + 'a {
        self.rows
            .iter()
            .filter(move |r| r.text(column).is_some_and(|v| v.trim() == value))
    }
}

/// Source of tabular sheets.
pub trait SheetReader {
    fn read_sheet(&self, path: &Path) -> Result<Sheet>;
}

/// Reads each sheet from a JSON file holding an array of row objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSheetReader;

impl SheetReader for JsonSheetReader {
    fn read_sheet(&self, path: &Path) -> Result<Sheet> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading sheet {}", path.display()))?;
        let value: Value = serde_json::from_str(&text)
            .with_context(|| format!("parsing sheet {}", path.display()))?;
        Sheet::from_json(path.display().to_string(), value)
    }
}

/// Sheets held in memory, keyed by the path a loader asks for.
#[derive(Debug, Clone, Default)]
pub struct MemorySheetReader {
    sheets: BTreeMap<PathBuf, Sheet>,
}

impl MemorySheetReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, value: Value) -> Result<()> {
        let path = path.into();
        let sheet = Sheet::from_json(path.display().to_string(), value)?;
        self.sheets.insert(path, sheet);
        Ok(())
    }

    pub fn with_sheet(mut self, path: impl Into<PathBuf>, value: Value) -> Result<Self> {
        self.insert(path, value)?;
        Ok(self)
    }
}

impl SheetReader for MemorySheetReader {
    fn read_sheet(&self, path: &Path) -> Result<Sheet> {
        self.sheets
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("no sheet registered for {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_reader_reads_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("master.json");
        let rows = json!([
            {"id": "CFIHOS-00000001", "name": "Pump", "count": 3, "fcc": true},
            {"id": "CFIHOS-00000002", "name": " ", "count": null}
        ]);
        std::fs::write(&path, rows.to_string()).unwrap();

        let sheet = JsonSheetReader.read_sheet(&path).unwrap();
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].text("count").as_deref(), Some("3"));
        assert!(sheet.rows[0].truthy("fcc"));
        assert_eq!(sheet.rows[1].non_empty("name"), None);
        assert_eq!(sheet.rows[1].text("count"), None);
        assert_eq!(sheet.rows_where("id", "CFIHOS-00000002").count(), 1);
    }

    #[test]
    fn test_json_reader_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let err = JsonSheetReader.read_sheet(&path).unwrap_err();
        assert!(format!("{err:#}").contains("missing.json"));

        let bad = dir.path().join("object.json");
        std::fs::write(&bad, r#"{"id": 1}"#).unwrap();
        assert!(JsonSheetReader.read_sheet(&bad).is_err());
    }
}
