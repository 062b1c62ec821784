//! Column-keyed result records.

use super::value::Value;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// One result row, addressable by column name or position.
///
/// Column names are shared across all rows of a result set, so a large
/// result pays for its header once.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) const fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Returns the value in the named column, if the column exists.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.values.get(idx)
    }

    /// Returns the value at the given position, if in range.
    #[must_use]
    pub fn get_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Returns the integer in the named column, if present and an integer.
    #[must_use]
    pub fn integer(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(Value::as_integer)
    }

    /// Returns the text in the named column, if present and text.
    #[must_use]
    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_text)
    }

    /// Returns the column names of this row's result set.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.columns.iter().zip(&self.values) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> Row {
        let columns: Arc<[String]> = vec!["id".to_string(), "phone".to_string()].into();
        Row::new(
            columns,
            vec![Value::Integer(1), Value::Text("13800000000".to_string())],
        )
    }

    #[test]
    fn test_get_by_name() {
        let row = sample_row();
        assert_eq!(row.get("id"), Some(&Value::Integer(1)));
        assert_eq!(row.text("phone"), Some("13800000000"));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn test_get_by_index() {
        let row = sample_row();
        assert_eq!(row.get_at(0), Some(&Value::Integer(1)));
        assert_eq!(row.get_at(2), None);
    }

    #[test]
    fn test_typed_accessors() {
        let row = sample_row();
        assert_eq!(row.integer("id"), Some(1));
        assert_eq!(row.integer("phone"), None);
        assert_eq!(row.len(), 2);
        assert!(!row.is_empty());
    }

    #[test]
    fn test_serialize_as_object() {
        let row = sample_row();
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 1, "phone": "13800000000"})
        );
    }
}
