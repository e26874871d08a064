use crate::error::Result;
use crate::types::TableDataset;
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Header row first, then one line per data row.
pub fn write_dataset_csv(path: impl AsRef<Path>, dataset: &TableDataset) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in dataset.rows() {
        wtr.write_record(row.iter().map(|c| c.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

pub fn preview_dataset(dataset: &TableDataset, max_rows: usize) {
    if dataset.data_rows().is_empty() {
        println!("(no rows)\n");
        return;
    }
    println!("{}\n", dataset_markdown(dataset, max_rows));
}

fn dataset_markdown(dataset: &TableDataset, max_rows: usize) -> String {
    let records: Vec<Vec<String>> = dataset
        .rows()
        .iter()
        .take(max_rows + 1)
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();
    let mut table = Builder::from(records).build();
    table.with(Style::markdown());
    table.to_string()
}
