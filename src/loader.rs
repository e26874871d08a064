use crate::error::{DashboardError, Result};
use crate::types::{FieldValue, Row};
use csv::ReaderBuilder;
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub skipped_rows: usize,
}

/// Load a snapshot of project records from a `.json` or `.csv` export.
pub fn load_rows(path: impl AsRef<Path>) -> Result<(Vec<Row>, LoadReport)> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let (rows, report) = match ext.as_str() {
        "json" => rows_from_json_str(&std::fs::read_to_string(path)?)?,
        "csv" => rows_from_csv_reader(std::fs::File::open(path)?)?,
        other => return Err(DashboardError::UnsupportedFormat(other.to_string())),
    };
    info!(
        path = %path.display(),
        loaded = report.loaded_rows,
        skipped = report.skipped_rows,
        "loaded obras snapshot"
    );
    Ok((rows, report))
}

/// Rows from an API payload: a bare array, or an object wrapping the array in
/// `data` or `rows`. A `data` key that is not an array falls through to `rows`.
pub fn rows_from_json_str(s: &str) -> Result<(Vec<Row>, LoadReport)> {
    let payload: Value = serde_json::from_str(s)?;
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut obj) => match (obj.remove("data"), obj.remove("rows")) {
            (Some(Value::Array(items)), _) | (_, Some(Value::Array(items))) => items,
            _ => return Err(DashboardError::MissingRows),
        },
        _ => return Err(DashboardError::MissingRows),
    };

    let total_rows = items.len();
    let mut skipped_rows = 0usize;
    let mut rows = Vec::with_capacity(total_rows);
    for item in items {
        match item {
            Value::Object(obj) => rows.push(
                obj.into_iter()
                    .map(|(k, v)| (k, FieldValue::from(v)))
                    .collect::<Row>(),
            ),
            other => {
                warn!(kind = json_kind(&other), "skipping non-object record");
                skipped_rows += 1;
            }
        }
    }
    let loaded_rows = rows.len();
    Ok((rows, LoadReport { total_rows, loaded_rows, skipped_rows }))
}

/// Rows from a CSV export whose header row names the columns. Every cell is
/// kept as text; empty cells become null.
pub fn rows_from_csv_reader<R: Read>(reader: R) -> Result<(Vec<Row>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut total_rows = 0usize;
    let mut skipped_rows = 0usize;
    let mut rows = Vec::new();

    for result in rdr.records() {
        total_rows += 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, line = total_rows + 1, "skipping unreadable CSV record");
                skipped_rows += 1;
                continue;
            }
        };
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(h, cell)| {
                let value = if cell.trim().is_empty() {
                    FieldValue::Null
                } else {
                    FieldValue::Text(cell.to_string())
                };
                (h.trim().to_string(), value)
            })
            .collect();
        rows.push(row);
    }
    let loaded_rows = rows.len();
    Ok((rows, LoadReport { total_rows, loaded_rows, skipped_rows }))
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_array() {
        let (rows, report) = rows_from_json_str(r#"[{"A": "1"}, {"A": 2}]"#).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("A"), Some(&FieldValue::Number(2.0)));
        assert_eq!(report, LoadReport { total_rows: 2, loaded_rows: 2, skipped_rows: 0 });
    }

    #[test]
    fn unwraps_data_and_rows() {
        let (rows, _) = rows_from_json_str(r#"{"data": [{"A": "x"}], "total": 1}"#).unwrap();
        assert_eq!(rows[0].text("A"), "x");
        let (rows, _) = rows_from_json_str(r#"{"rows": [{"A": "y"}]}"#).unwrap();
        assert_eq!(rows[0].text("A"), "y");
    }

    #[test]
    fn non_array_data_falls_back_to_rows() {
        for payload in [
            r#"{"data": null, "rows": [{"A": "z"}]}"#,
            r#"{"data": {}, "rows": [{"A": "z"}]}"#,
            r#"{"data": "n/a", "rows": [{"A": "z"}]}"#,
        ] {
            let (rows, report) = rows_from_json_str(payload).unwrap();
            assert_eq!(report.loaded_rows, 1, "{}", payload);
            assert_eq!(rows[0].text("A"), "z");
        }
        let (rows, _) = rows_from_json_str(r#"{"data": [{"A": "d"}], "rows": [{"A": "r"}]}"#).unwrap();
        assert_eq!(rows[0].text("A"), "d");
        assert!(matches!(
            rows_from_json_str(r#"{"data": null, "rows": null}"#),
            Err(DashboardError::MissingRows)
        ));
    }

    #[test]
    fn non_object_items_are_counted() {
        let (rows, report) = rows_from_json_str(r#"[{"A": 1}, 5, null]"#).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(report.skipped_rows, 2);
    }

    #[test]
    fn payload_without_rows_is_an_error() {
        assert!(matches!(
            rows_from_json_str(r#"{"items": []}"#),
            Err(DashboardError::MissingRows)
        ));
        assert!(matches!(rows_from_json_str("42"), Err(DashboardError::MissingRows)));
        assert!(matches!(rows_from_json_str("{"), Err(DashboardError::Json(_))));
    }

    #[test]
    fn csv_cells_are_text_and_blanks_null() {
        let data = "NOMBRE,COSTO\nPuente,\"1.500.000\"\nParque,\n";
        let (rows, report) = rows_from_csv_reader(data.as_bytes()).unwrap();
        assert_eq!(report.loaded_rows, 2);
        assert_eq!(rows[0].get("COSTO"), Some(&FieldValue::Text("1.500.000".into())));
        assert_eq!(rows[1].get("COSTO"), Some(&FieldValue::Null));
    }
}
