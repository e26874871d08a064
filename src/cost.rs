// Final cost of a project: the updated cost unless it is blank or zero, in
// which case the estimated cost. Per-row and total paths share `row_cost`.
use crate::fields::{Field, FieldMap};
use crate::types::{FieldValue, Row};
use crate::util::to_number;

fn is_blank(value: Option<&FieldValue>) -> bool {
    match value {
        None | Some(FieldValue::Null) => true,
        Some(FieldValue::Text(t)) => {
            let t = t.trim();
            t.is_empty() || t == "undefined"
        }
        _ => false,
    }
}

pub fn resolve_cost(updated: Option<&FieldValue>, estimated: Option<&FieldValue>) -> f64 {
    let value = to_number(updated);
    if is_blank(updated) || value == 0.0 {
        to_number(estimated)
    } else {
        value
    }
}

pub fn row_cost(row: &Row, fields: &FieldMap) -> f64 {
    resolve_cost(
        row.get(fields.column(Field::CostoTotalActualizado)),
        row.get(fields.column(Field::CostoEstimadoTotal)),
    )
}

pub fn total_cost(rows: &[Row], fields: &FieldMap) -> f64 {
    rows.iter().map(|r| row_cost(r, fields)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::DEFAULT_FIELDS;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    #[test]
    fn falls_back_when_updated_is_missing_blank_or_zero() {
        let est = text("500");
        assert_eq!(resolve_cost(None, Some(&est)), 500.0);
        assert_eq!(resolve_cost(Some(&FieldValue::Null), Some(&est)), 500.0);
        assert_eq!(resolve_cost(Some(&text("")), Some(&est)), 500.0);
        assert_eq!(resolve_cost(Some(&text("undefined")), Some(&est)), 500.0);
        assert_eq!(resolve_cost(Some(&text("0")), Some(&est)), 500.0);
        assert_eq!(resolve_cost(Some(&FieldValue::Number(0.0)), Some(&est)), 500.0);
        // Unparseable updated cost reads as 0 and falls back too.
        assert_eq!(resolve_cost(Some(&text("s/d")), Some(&est)), 500.0);
    }

    #[test]
    fn keeps_updated_when_present() {
        let est = text("1000");
        assert_eq!(resolve_cost(Some(&text("1.500.000")), Some(&est)), 1_500_000.0);
        assert_eq!(resolve_cost(Some(&FieldValue::Number(-3.0)), Some(&est)), -3.0);
    }

    #[test]
    fn both_missing_is_zero() {
        assert_eq!(resolve_cost(None, None), 0.0);
    }

    #[test]
    fn total_matches_sum_of_rows() {
        let f = &*DEFAULT_FIELDS;
        let act = f.column(Field::CostoTotalActualizado);
        let est = f.column(Field::CostoEstimadoTotal);
        let rows = vec![
            Row::new().with(act, "1.500.000").with(est, "1000"),
            Row::new().with(act, "").with(est, "500"),
            Row::new().with(act, "0").with(est, "200"),
        ];
        let per_row: Vec<f64> = rows.iter().map(|r| row_cost(r, f)).collect();
        assert_eq!(per_row, vec![1_500_000.0, 500.0, 200.0]);
        assert_eq!(total_cost(&rows, f), 1_500_700.0);
    }
}
