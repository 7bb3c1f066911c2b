//! Feature frame module
//!
//! Builds a dense feature matrix from a column-oriented JSON payload:
//!
//! ```json
//! {"RM": {"0": 6.575, "1": 6.421}, "LSTAT": {"0": 4.98, "1": 9.14}}
//! ```
//!
//! Columns keep the payload's key order. Rows keep the first column's key order;
//! every other column must carry the same row keys.

use ndarray::{Array2, Axis};
use serde_json::{Map, Value};

use crate::error::PredictError;

/// Named feature columns over a `rows x columns` matrix
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    columns: Vec<String>,
    rows: Vec<String>,
    values: Array2<f64>,
}

impl FeatureFrame {
    /// Parse a request body into a frame
    pub fn from_json(body: &[u8]) -> Result<Self, PredictError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(PredictError::BadRequest("empty payload".to_string()));
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|e| PredictError::BadRequest(format!("malformed JSON: {e}")))?;

        match value {
            Value::Object(map) => Self::from_columns(&map),
            other => Err(PredictError::BadRequest(format!(
                "payload must be a JSON object of feature columns, got {}",
                json_type(&other)
            ))),
        }
    }

    /// Build a frame from `feature -> {row -> value}` columns
    pub fn from_columns(columns: &Map<String, Value>) -> Result<Self, PredictError> {
        let Some((first_name, first_column)) = columns.iter().next() else {
            return Err(PredictError::BadRequest("payload has no feature columns".to_string()));
        };

        let rows: Vec<String> = as_column(first_name, first_column)?.keys().cloned().collect();
        if rows.is_empty() {
            return Err(PredictError::BadRequest(format!(
                "feature '{first_name}' has no rows"
            )));
        }

        let mut names = Vec::with_capacity(columns.len());
        let mut cells: Vec<Vec<f64>> = Vec::with_capacity(columns.len());

        for (name, column) in columns {
            let column = as_column(name, column)?;
            if column.len() != rows.len() {
                return Err(PredictError::BadRequest(format!(
                    "feature '{name}' has {} rows, expected {}",
                    column.len(),
                    rows.len()
                )));
            }

            let mut values = Vec::with_capacity(rows.len());
            for row in &rows {
                let cell = column.get(row).ok_or_else(|| {
                    PredictError::BadRequest(format!("feature '{name}' is missing row '{row}'"))
                })?;
                let number = cell.as_f64().ok_or_else(|| {
                    PredictError::BadRequest(format!(
                        "feature '{name}' row '{row}' must be a number, got {}",
                        json_type(cell)
                    ))
                })?;
                values.push(number);
            }

            names.push(name.clone());
            cells.push(values);
        }

        let values = Array2::from_shape_fn((rows.len(), names.len()), |(r, c)| cells[c][r]);

        Ok(Self {
            columns: names,
            rows,
            values,
        })
    }

    /// Select columns in the given order.
    ///
    /// Every expected name must be present and no other column may be.
    pub fn reorder(&self, expected: &[String]) -> Result<Self, PredictError> {
        let missing: Vec<&str> = expected
            .iter()
            .filter(|name| !self.columns.contains(name))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(PredictError::BadRequest(format!(
                "missing features: {}",
                missing.join(", ")
            )));
        }

        let unknown: Vec<&str> = self
            .columns
            .iter()
            .filter(|name| !expected.contains(name))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            return Err(PredictError::BadRequest(format!(
                "unknown features: {}",
                unknown.join(", ")
            )));
        }

        let indices: Vec<usize> = expected
            .iter()
            .filter_map(|name| self.columns.iter().position(|c| c == name))
            .collect();

        Ok(Self {
            columns: expected.to_vec(),
            rows: self.rows.clone(),
            values: self.values.select(Axis(1), &indices),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_keys(&self) -> &[String] {
        &self.rows
    }

    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_columns(&self) -> usize {
        self.values.ncols()
    }
}

fn as_column<'a>(name: &str, value: &'a Value) -> Result<&'a Map<String, Value>, PredictError> {
    value.as_object().ok_or_else(|| {
        PredictError::BadRequest(format!(
            "feature '{name}' must be an object keyed by row index, got {}",
            json_type(value)
        ))
    })
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUSING: &str = r#"{"CHAS":{"0":0},"RM":{"0":6.575},"TAX":{"0":296.0},"PTRATIO":{"0":15.3},"B":{"0":396.9},"LSTAT":{"0":4.98}}"#;

    fn bad_request_message(result: Result<FeatureFrame, PredictError>) -> String {
        match result {
            Err(PredictError::BadRequest(msg)) => msg,
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn test_single_row_housing_payload() {
        let frame = FeatureFrame::from_json(HOUSING.as_bytes()).unwrap();
        assert_eq!(frame.n_rows(), 1);
        assert_eq!(frame.n_columns(), 6);
        assert_eq!(frame.columns(), ["CHAS", "RM", "TAX", "PTRATIO", "B", "LSTAT"]);
        assert!((frame.values()[[0, 1]] - 6.575).abs() < f64::EPSILON);
        assert!((frame.values()[[0, 5]] - 4.98).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rows_keep_payload_order() {
        let body = br#"{"a":{"10":3.0,"2":2.0,"1":1.0},"b":{"1":10.0,"10":30.0,"2":20.0}}"#;
        let frame = FeatureFrame::from_json(body).unwrap();
        assert_eq!(frame.row_keys(), ["10", "2", "1"]);
        assert_eq!(frame.values().column(0).to_vec(), vec![3.0, 2.0, 1.0]);
        // second column is aligned by key, not by position
        assert_eq!(frame.values().column(1).to_vec(), vec![30.0, 20.0, 10.0]);
    }

    #[test]
    fn test_non_numeric_row_keys_keep_order() {
        let body = br#"{"a":{"b":1.0,"a":2.0}}"#;
        let frame = FeatureFrame::from_json(body).unwrap();
        assert_eq!(frame.row_keys(), ["b", "a"]);
    }

    #[test]
    fn test_empty_and_malformed_payloads() {
        assert!(bad_request_message(FeatureFrame::from_json(b"")).contains("empty"));
        assert!(bad_request_message(FeatureFrame::from_json(b"  \n")).contains("empty"));
        assert!(bad_request_message(FeatureFrame::from_json(b"{\"RM\":")).contains("malformed"));
        assert!(bad_request_message(FeatureFrame::from_json(b"{}")).contains("no feature"));
        assert!(bad_request_message(FeatureFrame::from_json(b"[1,2]")).contains("array"));
    }

    #[test]
    fn test_column_must_be_object() {
        let msg = bad_request_message(FeatureFrame::from_json(br#"{"RM":6.5}"#));
        assert!(msg.contains("'RM'"));
        assert!(msg.contains("number"));
    }

    #[test]
    fn test_empty_column_rejected() {
        let msg = bad_request_message(FeatureFrame::from_json(br#"{"RM":{}}"#));
        assert!(msg.contains("no rows"));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let msg = bad_request_message(FeatureFrame::from_json(
            br#"{"a":{"0":1.0,"1":2.0},"b":{"0":1.0}}"#,
        ));
        assert!(msg.contains("'b'"));

        let msg = bad_request_message(FeatureFrame::from_json(
            br#"{"a":{"0":1.0,"1":2.0},"b":{"0":1.0,"2":2.0}}"#,
        ));
        assert!(msg.contains("missing row '1'"));
    }

    #[test]
    fn test_non_numeric_cells_rejected() {
        let msg = bad_request_message(FeatureFrame::from_json(br#"{"a":{"0":"6.5"}}"#));
        assert!(msg.contains("string"));
        let msg = bad_request_message(FeatureFrame::from_json(br#"{"a":{"0":null}}"#));
        assert!(msg.contains("null"));
    }

    #[test]
    fn test_reorder_to_expected_columns() {
        let frame = FeatureFrame::from_json(br#"{"b":{"0":2.0},"a":{"0":1.0}}"#).unwrap();
        let reordered = frame.reorder(&["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(reordered.columns(), ["a", "b"]);
        assert_eq!(reordered.values().row(0).to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_reorder_reports_missing_and_unknown() {
        let frame = FeatureFrame::from_json(br#"{"a":{"0":1.0},"z":{"0":2.0}}"#).unwrap();
        let msg = bad_request_message(frame.reorder(&["a".to_string(), "b".to_string()]));
        assert_eq!(msg, "missing features: b");

        let msg = bad_request_message(frame.reorder(&["a".to_string()]));
        assert_eq!(msg, "unknown features: z");
    }
}
