use crate::types::{GroupedEntry, Row, TableDataset};
use crate::util::to_number;
use std::cmp::Ordering;
use std::collections::HashMap;

/// How `build_two_series_dataset_with` treats names beyond the top N.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow<'a> {
    /// Leave them out entirely.
    Drop,
    /// Sum them into one trailing row with this label.
    Others(&'a str),
}

/// Sum `value_field` per distinct `key_field`, skipping blank keys.
/// Entries come out in first-seen order.
pub fn group_sum(rows: &[Row], key_field: &str, value_field: &str) -> Vec<GroupedEntry> {
    group_sum_by(rows, key_field, |row| to_number(row.get(value_field)))
}

/// Like [`group_sum`] with an arbitrary per-row value.
pub fn group_sum_by<F>(rows: &[Row], key_field: &str, value: F) -> Vec<GroupedEntry>
where
    F: Fn(&Row) -> f64,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut entries: Vec<GroupedEntry> = Vec::new();
    for row in rows {
        let key = row.text(key_field);
        if key.trim().is_empty() {
            continue;
        }
        let v = value(row);
        match index.get(&key) {
            Some(&i) => entries[i].value += v,
            None => {
                index.insert(key.clone(), entries.len());
                entries.push(GroupedEntry::new(key, v));
            }
        }
    }
    entries
}

/// Stable sort, largest value first.
pub fn sort_desc(entries: &mut [GroupedEntry]) {
    entries.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
}

/// Keep the first `n` entries and fold the rest into `label`.
///
/// `entries` must already be sorted descending. The extra entry is only added
/// when the remainder is strictly positive.
pub fn top_n_with_others(entries: Vec<GroupedEntry>, n: usize, label: &str) -> Vec<GroupedEntry> {
    if entries.len() <= n {
        return entries;
    }
    let mut entries = entries;
    let rest = entries.split_off(n);
    let remainder: f64 = rest.iter().map(|e| e.value).sum();
    if remainder > 0.0 {
        entries.push(GroupedEntry::new(label, remainder));
    }
    entries
}

/// Two series per `dim_field`, ordered by their combined total, limited to
/// the top `top_n` names. Overflow names are dropped.
pub fn build_two_series_dataset(
    rows: &[Row],
    dim_field: &str,
    val1_field: &str,
    val2_field: &str,
    top_n: usize,
) -> TableDataset {
    build_two_series_dataset_with(rows, dim_field, val1_field, val2_field, top_n, Overflow::Drop)
}

pub fn build_two_series_dataset_with(
    rows: &[Row],
    dim_field: &str,
    val1_field: &str,
    val2_field: &str,
    top_n: usize,
    overflow: Overflow<'_>,
) -> TableDataset {
    build_two_series_dataset_by(
        rows,
        dim_field,
        (val1_field, |r: &Row| to_number(r.get(val1_field))),
        (val2_field, |r: &Row| to_number(r.get(val2_field))),
        top_n,
        overflow,
    )
}

/// Two-series dataset over arbitrary per-row values; each series is given
/// as `(header label, value)`.
pub fn build_two_series_dataset_by<F1, F2>(
    rows: &[Row],
    dim_field: &str,
    (label1, value1): (&str, F1),
    (label2, value2): (&str, F2),
    top_n: usize,
    overflow: Overflow<'_>,
) -> TableDataset
where
    F1: Fn(&Row) -> f64,
    F2: Fn(&Row) -> f64,
{
    let first = group_sum_by(rows, dim_field, value1);
    let second = group_sum_by(rows, dim_field, value2);

    // (name, v1, v2) keyed in first-seen order across both series.
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<(String, f64, f64)> = Vec::with_capacity(first.len());
    for e in first {
        index.insert(e.name.clone(), merged.len());
        merged.push((e.name, e.value, 0.0));
    }
    for e in second {
        match index.get(&e.name) {
            Some(&i) => merged[i].2 = e.value,
            None => {
                index.insert(e.name.clone(), merged.len());
                merged.push((e.name, 0.0, e.value));
            }
        }
    }
    merged.sort_by(|a, b| {
        (b.1 + b.2)
            .partial_cmp(&(a.1 + a.2))
            .unwrap_or(Ordering::Equal)
    });

    let rest = if merged.len() > top_n {
        merged.split_off(top_n)
    } else {
        Vec::new()
    };

    let mut dataset = TableDataset::new(&[dim_field, label1, label2]);
    for (name, v1, v2) in merged {
        dataset.push_row(name, &[v1, v2]);
    }
    if let Overflow::Others(label) = overflow {
        let (r1, r2) = rest
            .iter()
            .fold((0.0, 0.0), |(s1, s2), (_, v1, v2)| (s1 + v1, s2 + v2));
        if r1 + r2 > 0.0 {
            dataset.push_row(label, &[r1, r2]);
        }
    }
    dataset
}

/// Grouped entries as a one-series chart dataset.
pub fn series_dataset(entries: &[GroupedEntry], dim_label: &str, value_label: &str) -> TableDataset {
    let mut dataset = TableDataset::new(&[dim_label, value_label]);
    for e in entries {
        dataset.push_row(e.name.clone(), &[e.value]);
    }
    dataset
}
