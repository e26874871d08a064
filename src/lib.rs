//! Metrics engine for a municipal public-works ("obras") dashboard.
//!
//! Raw project records go through [`filters`] and then feed [`aggregate`]
//! (chart datasets) and [`kpi`] (summary figures). [`options`] computes the
//! cascading filter choices. Everything in the core is pure and infallible;
//! [`loader`], [`output`] and [`config`] are the I/O edges.
pub mod aggregate;
pub mod cache;
pub mod config;
pub mod cost;
pub mod error;
pub mod fields;
pub mod filters;
pub mod kpi;
pub mod loader;
pub mod logging;
pub mod options;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;

pub use error::{DashboardError, Result};
pub use fields::{Field, FieldMap, DEFAULT_FIELDS};
pub use types::{
    Cell, FieldValue, FilterKey, FilterOptions, Filters, GroupedEntry, KpiSummary, Row,
    TableDataset,
};
