use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use tabled::Tabled;

/// A single cell of an upstream record.
///
/// Upstream exports mix strings, numbers and nulls freely, so every JSON value
/// is accepted: booleans and nested values are kept as their JSON text.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum FieldValue {
    #[default]
    Null,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl From<serde_json::Value> for FieldValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Text(b.to_string()),
            serde_json::Value::Number(n) => FieldValue::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => FieldValue::Text(s),
            other => FieldValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        FieldValue::Date(d)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Null => s.serialize_none(),
            FieldValue::Text(t) => s.serialize_str(t),
            FieldValue::Number(n) => s.serialize_f64(*n),
            FieldValue::Date(d) => s.serialize_str(&d.format("%Y-%m-%d").to_string()),
        }
    }
}

// Stringification used for equality filters, grouping keys and date prefixes.
// Null renders as the empty string; `f64` Display already drops a trailing
// `.0`, so `1500.0` renders as `1500`.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Text(t) => f.write_str(t),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// One public-works project record, keyed by upstream column names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(HashMap<String, FieldValue>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter; rows are never mutated after construction.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.0.get(column)
    }

    /// Stringified value of `column`; missing columns render as `""`.
    pub fn text(&self, column: &str) -> String {
        self.get(column).map(|v| v.to_string()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Row(iter.into_iter().collect())
    }
}

/// Currently active filter selections. Absent or empty means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    pub proyecto: Option<String>,
    pub comuna: Option<String>,
    pub dependencia: Option<String>,
    pub tipo: Option<String>,
    pub desde: Option<String>,
    pub hasta: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    Proyecto,
    Comuna,
    Dependencia,
    Tipo,
    Desde,
    Hasta,
}

impl FilterKey {
    pub const ALL: [FilterKey; 6] = [
        FilterKey::Proyecto,
        FilterKey::Comuna,
        FilterKey::Dependencia,
        FilterKey::Tipo,
        FilterKey::Desde,
        FilterKey::Hasta,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FilterKey::Proyecto => "proyecto",
            FilterKey::Comuna => "comuna",
            FilterKey::Dependencia => "dependencia",
            FilterKey::Tipo => "tipo",
            FilterKey::Desde => "desde",
            FilterKey::Hasta => "hasta",
        }
    }

    pub fn parse(s: &str) -> Option<FilterKey> {
        let s = s.trim().to_lowercase();
        FilterKey::ALL.into_iter().find(|k| k.name() == s)
    }
}

impl Filters {
    fn slot(&self, key: FilterKey) -> &Option<String> {
        match key {
            FilterKey::Proyecto => &self.proyecto,
            FilterKey::Comuna => &self.comuna,
            FilterKey::Dependencia => &self.dependencia,
            FilterKey::Tipo => &self.tipo,
            FilterKey::Desde => &self.desde,
            FilterKey::Hasta => &self.hasta,
        }
    }

    fn slot_mut(&mut self, key: FilterKey) -> &mut Option<String> {
        match key {
            FilterKey::Proyecto => &mut self.proyecto,
            FilterKey::Comuna => &mut self.comuna,
            FilterKey::Dependencia => &mut self.dependencia,
            FilterKey::Tipo => &mut self.tipo,
            FilterKey::Desde => &mut self.desde,
            FilterKey::Hasta => &mut self.hasta,
        }
    }

    /// Active value for `key`; empty strings count as inactive.
    pub fn get(&self, key: FilterKey) -> Option<&str> {
        self.slot(key).as_deref().filter(|v| !v.is_empty())
    }

    /// Copy with `key` set to `value` (an empty value clears it).
    pub fn with(&self, key: FilterKey, value: impl Into<String>) -> Filters {
        let value = value.into();
        let mut next = self.clone();
        *next.slot_mut(key) = if value.is_empty() { None } else { Some(value) };
        next
    }

    /// Copy with `key` cleared.
    pub fn without(&self, key: FilterKey) -> Filters {
        let mut next = self.clone();
        *next.slot_mut(key) = None;
        next
    }

    pub fn is_empty(&self) -> bool {
        FilterKey::ALL.iter().all(|k| self.get(*k).is_none())
    }
}

/// Selectable values per filter dimension, each sorted and deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub proyectos: Vec<String>,
    pub comunas: Vec<String>,
    pub dependencias: Vec<String>,
    pub tipos: Vec<String>,
    pub anios: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct GroupedEntry {
    pub name: String,
    pub value: f64,
}

impl GroupedEntry {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self { name: name.into(), value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(t) => f.write_str(t),
            Cell::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Chart input: row 0 is the header, every following row is
/// `[label, value1, value2, ...]` with the header's width.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TableDataset(Vec<Vec<Cell>>);

impl TableDataset {
    pub fn new(header: &[&str]) -> Self {
        TableDataset(vec![header
            .iter()
            .map(|h| Cell::Text(h.to_string()))
            .collect()])
    }

    pub fn push_row(&mut self, label: impl Into<String>, values: &[f64]) {
        let mut row = Vec::with_capacity(values.len() + 1);
        row.push(Cell::Text(label.into()));
        row.extend(values.iter().map(|v| Cell::Number(*v)));
        self.0.push(row);
    }

    pub fn header(&self) -> &[Cell] {
        &self.0[0]
    }

    pub fn data_rows(&self) -> &[Vec<Cell>] {
        &self.0[1..]
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.0
    }

    pub fn width(&self) -> usize {
        self.header().len()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    pub total_obras: usize,
    pub inv_total: f64,
    pub ejec: f64,
    pub entregadas: usize,
    pub pct_entregadas: f64,
    pub pct_ejec: f64,
    pub alertas: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct KpiRow {
    #[serde(rename = "TotalObras")]
    #[tabled(rename = "TotalObras")]
    pub total_obras: String,
    #[serde(rename = "InversionTotal")]
    #[tabled(rename = "InversionTotal")]
    pub inv_total: String,
    #[serde(rename = "Ejecutado")]
    #[tabled(rename = "Ejecutado")]
    pub ejec: String,
    #[serde(rename = "PctEjecutado")]
    #[tabled(rename = "PctEjecutado")]
    pub pct_ejec: String,
    #[serde(rename = "Entregadas")]
    #[tabled(rename = "Entregadas")]
    pub entregadas: String,
    #[serde(rename = "PctEntregadas")]
    #[tabled(rename = "PctEntregadas")]
    pub pct_entregadas: String,
    #[serde(rename = "Alertas")]
    #[tabled(rename = "Alertas")]
    pub alertas: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ObraRow {
    #[serde(rename = "Nombre")]
    #[tabled(rename = "Nombre")]
    pub nombre: String,
    #[serde(rename = "Comuna")]
    #[tabled(rename = "Comuna")]
    pub comuna: String,
    #[serde(rename = "Dependencia")]
    #[tabled(rename = "Dependencia")]
    pub dependencia: String,
    #[serde(rename = "Estado")]
    #[tabled(rename = "Estado")]
    pub estado: String,
    #[serde(rename = "CostoFinal")]
    #[tabled(rename = "CostoFinal")]
    pub costo_final: String,
    #[serde(rename = "Ejecutado")]
    #[tabled(rename = "Ejecutado")]
    pub ejecutado: String,
    #[serde(rename = "PctEjecutado")]
    #[tabled(rename = "PctEjecutado")]
    pub pct_ejecutado: String,
    #[serde(rename = "Alerta")]
    #[tabled(rename = "Alerta")]
    pub alerta: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_value_from_json_covers_every_kind() {
        let row: Row = serde_json::from_str(
            r#"{"a": null, "b": "x", "c": 1500, "d": true, "e": [1, 2]}"#,
        )
        .unwrap();
        assert_eq!(row.get("a"), Some(&FieldValue::Null));
        assert_eq!(row.get("b"), Some(&FieldValue::Text("x".into())));
        assert_eq!(row.get("c"), Some(&FieldValue::Number(1500.0)));
        assert_eq!(row.get("d"), Some(&FieldValue::Text("true".into())));
        assert_eq!(row.get("e"), Some(&FieldValue::Text("[1,2]".into())));
    }

    #[test]
    fn text_stringifies_like_the_dashboard() {
        let row = Row::new()
            .with("n", 1500.0)
            .with("f", 1.5)
            .with("d", NaiveDate::from_ymd_opt(2024, 3, 9).unwrap())
            .with("z", FieldValue::Null);
        assert_eq!(row.text("n"), "1500");
        assert_eq!(row.text("f"), "1.5");
        assert_eq!(row.text("d"), "2024-03-09");
        assert_eq!(row.text("z"), "");
        assert_eq!(row.text("missing"), "");
    }

    #[test]
    fn empty_filter_values_are_inactive() {
        let f = Filters::default().with(FilterKey::Comuna, "");
        assert_eq!(f.get(FilterKey::Comuna), None);
        assert!(f.is_empty());
        let f = f.with(FilterKey::Tipo, "Vías");
        assert_eq!(f.get(FilterKey::Tipo), Some("Vías"));
        assert!(f.without(FilterKey::Tipo).is_empty());
    }

    #[test]
    fn filter_key_parse_is_case_insensitive() {
        assert_eq!(FilterKey::parse(" Comuna "), Some(FilterKey::Comuna));
        assert_eq!(FilterKey::parse("barrio"), None);
    }
}
