use crate::aggregate::{
    build_two_series_dataset_by, group_sum_by, sort_desc, top_n_with_others, Overflow,
};
use crate::cost::row_cost;
use crate::fields::{Field, FieldMap};
use crate::types::{GroupedEntry, KpiRow, KpiSummary, ObraRow, Row, TableDataset};
use crate::util::{format_int, format_number, format_pct, ratio, to_number};
use std::cmp::Ordering;
use tracing::debug;

/// Resolved investment per comuna, largest first, capped at `top_n` plus an
/// "others" bucket.
pub fn investment_by_comuna(
    rows: &[Row],
    fields: &FieldMap,
    top_n: usize,
    others_label: &str,
) -> Vec<GroupedEntry> {
    let mut entries = group_sum_by(rows, fields.column(Field::Comuna), |r| row_cost(r, fields));
    sort_desc(&mut entries);
    debug!(groups = entries.len(), "investment by comuna");
    top_n_with_others(entries, top_n, others_label)
}

/// Number of projects per intervention type, most frequent first.
pub fn works_by_tipo(rows: &[Row], fields: &FieldMap) -> Vec<GroupedEntry> {
    let mut entries = group_sum_by(rows, fields.column(Field::Tipo), |_| 1.0);
    sort_desc(&mut entries);
    entries
}

pub const COSTO_FINAL_LABEL: &str = "COSTO FINAL";

/// Resolved cost vs executed budget per agency, so works with only an
/// estimated cost count the same way they do in the investment KPI.
pub fn budget_by_dependencia(rows: &[Row], fields: &FieldMap, top_n: usize) -> TableDataset {
    let ejecutado = fields.column(Field::PresupuestoEjecutado);
    build_two_series_dataset_by(
        rows,
        fields.column(Field::Dependencia),
        (COSTO_FINAL_LABEL, |r: &Row| row_cost(r, fields)),
        (ejecutado, |r: &Row| to_number(r.get(ejecutado))),
        top_n,
        Overflow::Drop,
    )
}

/// One line per project with its resolved cost, most expensive first.
pub fn project_table(rows: &[Row], fields: &FieldMap) -> Vec<ObraRow> {
    let mut scored: Vec<(f64, ObraRow)> = rows
        .iter()
        .map(|r| {
            let cost = row_cost(r, fields);
            let executed = to_number(r.get(fields.column(Field::PresupuestoEjecutado)));
            let has_risk = !r.text(fields.column(Field::DescripcionRiesgo)).trim().is_empty();
            let row = ObraRow {
                nombre: r.text(fields.column(Field::Nombre)).trim().to_string(),
                comuna: r.text(fields.column(Field::Comuna)).trim().to_string(),
                dependencia: r.text(fields.column(Field::Dependencia)).trim().to_string(),
                estado: r.text(fields.column(Field::Estado)).trim().to_string(),
                costo_final: format_number(cost, 2),
                ejecutado: format_number(executed, 2),
                pct_ejecutado: format_pct(ratio(executed, cost)),
                alerta: if has_risk { "Sí".to_string() } else { "No".to_string() },
            };
            (cost, row)
        })
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    scored.into_iter().map(|(_, row)| row).collect()
}

pub fn kpi_table(summary: &KpiSummary) -> KpiRow {
    KpiRow {
        total_obras: format_int(summary.total_obras),
        inv_total: format_number(summary.inv_total, 2),
        ejec: format_number(summary.ejec, 2),
        pct_ejec: format_pct(summary.pct_ejec),
        entregadas: format_int(summary.entregadas),
        pct_entregadas: format_pct(summary.pct_entregadas),
        alertas: format_int(summary.alertas),
    }
}
