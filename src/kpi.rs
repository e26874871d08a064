use crate::cost::total_cost;
use crate::fields::{Field, FieldMap};
use crate::types::{KpiSummary, Row};
use crate::util::{ratio, to_number, year_of};
use chrono::{Datelike, Local};

/// Summary metrics for `rows`, judged against the current local year.
pub fn kpis(rows: &[Row], fields: &FieldMap) -> KpiSummary {
    kpis_at(rows, fields, Local::now().year())
}

pub fn kpis_at(rows: &[Row], fields: &FieldMap, current_year: i32) -> KpiSummary {
    let total_obras = rows.len();
    let inv_total = total_cost(rows, fields);
    let ejec: f64 = rows
        .iter()
        .map(|r| to_number(r.get(fields.column(Field::PresupuestoEjecutado))))
        .sum();
    let entregadas = rows
        .iter()
        .filter(|r| is_delivered(r, fields, current_year))
        .count();
    let alertas = rows
        .iter()
        .filter(|r| !r.text(fields.column(Field::DescripcionRiesgo)).trim().is_empty())
        .count();

    KpiSummary {
        total_obras,
        inv_total,
        ejec,
        entregadas,
        pct_entregadas: ratio(entregadas as f64, total_obras as f64),
        pct_ejec: ratio(ejec, inv_total),
        alertas,
    }
}

/// Status mentions delivery ("entregada", "Entregado"), or failing that the
/// delivery date falls in a year up to `current_year`.
pub fn is_delivered(row: &Row, fields: &FieldMap, current_year: i32) -> bool {
    if row
        .text(fields.column(Field::Estado))
        .to_lowercase()
        .contains("entreg")
    {
        return true;
    }
    let year = year_of(row.get(fields.column(Field::FechaEntrega)));
    year != 0 && year <= current_year
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::DEFAULT_FIELDS;

    fn obra(estado: &str, entrega: &str, act: &str, est: &str, ejec: &str, riesgo: &str) -> Row {
        let f = &*DEFAULT_FIELDS;
        Row::new()
            .with(f.column(Field::Estado), estado)
            .with(f.column(Field::FechaEntrega), entrega)
            .with(f.column(Field::CostoTotalActualizado), act)
            .with(f.column(Field::CostoEstimadoTotal), est)
            .with(f.column(Field::PresupuestoEjecutado), ejec)
            .with(f.column(Field::DescripcionRiesgo), riesgo)
    }

    #[test]
    fn empty_rows_give_zeroes() {
        assert_eq!(kpis_at(&[], &DEFAULT_FIELDS, 2025), KpiSummary::default());
    }

    #[test]
    fn full_summary() {
        let rows = vec![
            obra("ENTREGADA", "", "1.500.000", "1000", "750.000", ""),
            obra("En ejecución", "2024-12-01", "", "500", "100", "Retraso en licencias"),
            obra("En ejecución", "2030-01-01", "0", "200", "", "   "),
            obra("Planeación", "", "300", "", "50", ""),
        ];
        let k = kpis_at(&rows, &DEFAULT_FIELDS, 2025);
        assert_eq!(k.total_obras, 4);
        assert_eq!(k.inv_total, 1_501_000.0);
        assert_eq!(k.ejec, 750_150.0);
        assert_eq!(k.entregadas, 2);
        assert_eq!(k.pct_entregadas, 0.5);
        assert_eq!(k.pct_ejec, 750_150.0 / 1_501_000.0);
        assert_eq!(k.alertas, 1);
    }

    #[test]
    fn delivery_date_only_checked_when_status_fails() {
        let f = &*DEFAULT_FIELDS;
        assert!(is_delivered(&obra("Entregado", "2099", "", "", "", ""), f, 2025));
        assert!(is_delivered(&obra("", "2025", "", "", "", ""), f, 2025));
        assert!(!is_delivered(&obra("", "2026-01-01", "", "", "", ""), f, 2025));
        assert!(!is_delivered(&obra("", "sin fecha", "", "", "", ""), f, 2025));
        assert!(!is_delivered(&Row::new(), f, 2025));
    }

    #[test]
    fn day_first_and_free_text_future_dates_are_not_delivered() {
        let f = &*DEFAULT_FIELDS;
        for fecha in ["15-03-2030", "03-15-2030", "15 de marzo de 2030", "1/2030"] {
            assert!(!is_delivered(&obra("", fecha, "", "", "", ""), f, 2025), "{}", fecha);
        }
        assert!(is_delivered(&obra("", "15-03-2024", "", "", "", ""), f, 2025));
        let rows = vec![obra("", "15-03-2030", "", "", "", "")];
        assert_eq!(kpis_at(&rows, f, 2025).entregadas, 0);
    }

    #[test]
    fn zero_investment_gives_zero_execution_pct() {
        let rows = vec![obra("", "", "", "", "100", "")];
        let k = kpis_at(&rows, &DEFAULT_FIELDS, 2025);
        assert_eq!(k.inv_total, 0.0);
        assert_eq!(k.pct_ejec, 0.0);
    }
}
