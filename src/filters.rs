use crate::fields::{Field, FieldMap};
use crate::types::{FilterKey, Filters, Row};
use tracing::trace;

const EQUALITY_FILTERS: [(FilterKey, Field); 4] = [
    (FilterKey::Proyecto, Field::Proyecto),
    (FilterKey::Comuna, Field::Comuna),
    (FilterKey::Dependencia, Field::Dependencia),
    (FilterKey::Tipo, Field::Tipo),
];

/// Rows that satisfy every active filter, in input order.
pub fn apply_filters(rows: &[Row], filters: &Filters, fields: &FieldMap) -> Vec<Row> {
    let kept: Vec<Row> = rows
        .iter()
        .filter(|r| row_matches(r, filters, fields))
        .cloned()
        .collect();
    trace!(input = rows.len(), kept = kept.len(), "applied filters");
    kept
}

pub fn row_matches(row: &Row, filters: &Filters, fields: &FieldMap) -> bool {
    for (key, field) in EQUALITY_FILTERS {
        if let Some(wanted) = filters.get(key) {
            if row.text(fields.column(field)) != wanted {
                return false;
            }
        }
    }
    within_range(
        &row.text(fields.column(Field::FechaInicio)),
        filters.get(FilterKey::Desde),
        filters.get(FilterKey::Hasta),
    )
}

// Each bound is compared against the date prefix of the bound's own length:
// `2023` compares years, `2023-04` compares year-months. Rows without a date
// are never excluded.
fn within_range(date: &str, desde: Option<&str>, hasta: Option<&str>) -> bool {
    let date = date.trim();
    if date.is_empty() {
        return true;
    }
    if let Some(lower) = desde {
        if prefix(date, lower.len()) < lower {
            return false;
        }
    }
    if let Some(upper) = hasta {
        if prefix(date, upper.len()) > upper {
            return false;
        }
    }
    true
}

fn prefix(s: &str, n: usize) -> &str {
    s.get(..n).unwrap_or(s)
}
