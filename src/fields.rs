//! Canonical field names and their upstream column names.
//!
//! Every column the metrics read goes through a [`FieldMap`]; no module
//! hardcodes an upstream column name.
use crate::error::{DashboardError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Nombre,
    Proyecto,
    Comuna,
    Dependencia,
    Tipo,
    FechaInicio,
    FechaEntrega,
    Estado,
    CostoTotalActualizado,
    CostoEstimadoTotal,
    PresupuestoEjecutado,
    DescripcionRiesgo,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::Nombre,
        Field::Proyecto,
        Field::Comuna,
        Field::Dependencia,
        Field::Tipo,
        Field::FechaInicio,
        Field::FechaEntrega,
        Field::Estado,
        Field::CostoTotalActualizado,
        Field::CostoEstimadoTotal,
        Field::PresupuestoEjecutado,
        Field::DescripcionRiesgo,
    ];

    /// Column name used by the city's open-data "obras" export.
    pub fn default_column(self) -> &'static str {
        match self {
            Field::Nombre => "NOMBRE DE LA OBRA",
            Field::Proyecto => "PROYECTO ESTRATÉGICO",
            Field::Comuna => "COMUNA O CORREGIMIENTO",
            Field::Dependencia => "DEPENDENCIA",
            Field::Tipo => "TIPO DE INTERVENCIÓN",
            Field::FechaInicio => "FECHA DE INICIO",
            Field::FechaEntrega => "FECHA ESTIMADA DE ENTREGA",
            Field::Estado => "ESTADO DE LA OBRA",
            Field::CostoTotalActualizado => "COSTO TOTAL ACTUALIZADO",
            Field::CostoEstimadoTotal => "COSTO ESTIMADO TOTAL",
            Field::PresupuestoEjecutado => "PRESUPUESTO EJECUTADO",
            Field::DescripcionRiesgo => "DESCRIPCIÓN DEL RIESGO",
        }
    }
}

/// Read-only lookup from [`Field`] to the actual column name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    columns: HashMap<Field, String>,
}

pub static DEFAULT_FIELDS: Lazy<FieldMap> = Lazy::new(FieldMap::default);

impl Default for FieldMap {
    fn default() -> Self {
        let columns = Field::ALL
            .iter()
            .map(|f| (*f, f.default_column().to_string()))
            .collect();
        Self { columns }
    }
}

impl FieldMap {
    pub fn column(&self, field: Field) -> &str {
        self.columns
            .get(&field)
            .map(String::as_str)
            .unwrap_or_else(|| field.default_column())
    }

    /// Defaults with the given entries replaced.
    pub fn with_overrides(overrides: HashMap<Field, String>) -> Self {
        let mut map = Self::default();
        for (field, column) in overrides {
            map.columns.insert(field, column);
        }
        map
    }

    /// Parse a JSON object such as `{"comuna": "COMUNA"}` into a map built on
    /// top of the defaults. Unknown keys and blank column names are rejected.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let overrides: HashMap<Field, String> =
            serde_json::from_str(s).map_err(|e| DashboardError::InvalidFieldMap(e.to_string()))?;
        if let Some((field, _)) = overrides.iter().find(|(_, c)| c.trim().is_empty()) {
            return Err(DashboardError::InvalidFieldMap(format!(
                "blank column name for {:?}",
                field
            )));
        }
        Ok(Self::with_overrides(overrides))
    }
}
