//! Cascading filter options.
//!
//! The options offered for a dimension depend on the *other* active filters,
//! so picking a project narrows the districts and agencies on offer.
use crate::fields::{Field, FieldMap};
use crate::filters::row_matches;
use crate::types::{FilterKey, FilterOptions, Filters, Row};
use std::collections::BTreeSet;

/// Options per dimension, each computed from the rows that pass every active
/// filter except the dimension's own.
pub fn get_filter_options(rows: &[Row], current: &Filters, fields: &FieldMap) -> FilterOptions {
    let column_values = |key: FilterKey, field: Field| {
        distinct_values(rows, &current.without(key), fields, |row| {
            Some(row.text(fields.column(field)))
        })
    };
    let year_filters = current.without(FilterKey::Desde).without(FilterKey::Hasta);

    FilterOptions {
        proyectos: column_values(FilterKey::Proyecto, Field::Proyecto),
        comunas: column_values(FilterKey::Comuna, Field::Comuna),
        dependencias: column_values(FilterKey::Dependencia, Field::Dependencia),
        tipos: column_values(FilterKey::Tipo, Field::Tipo),
        anios: distinct_values(rows, &year_filters, fields, |row| {
            let date = row.text(fields.column(Field::FechaInicio));
            let year: String = date.trim().chars().take(4).collect();
            (year.len() == 4 && year.chars().all(|c| c.is_ascii_digit())).then_some(year)
        }),
    }
}

fn distinct_values<F>(rows: &[Row], filters: &Filters, fields: &FieldMap, value: F) -> Vec<String>
where
    F: Fn(&Row) -> Option<String>,
{
    rows.iter()
        .filter(|r| row_matches(r, filters, fields))
        .filter_map(value)
        .filter(|v| !v.trim().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Clear selections that may be invalid after `changed` was updated.
///
/// Dependency order is proyecto -> dependencia -> comuna; tipo and the date
/// range are independent. Call this right after updating a filter and before
/// applying the result.
pub fn clean_dependent_filters(current: &Filters, changed: FilterKey) -> Filters {
    match changed {
        FilterKey::Proyecto => current
            .without(FilterKey::Dependencia)
            .without(FilterKey::Comuna),
        FilterKey::Dependencia => current.without(FilterKey::Comuna),
        FilterKey::Comuna | FilterKey::Tipo | FilterKey::Desde | FilterKey::Hasta => {
            current.clone()
        }
    }
}
