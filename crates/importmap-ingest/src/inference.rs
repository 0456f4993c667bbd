//! Column type inference and sample extraction.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use importmap_model::{ColumnType, ImportColumn, ImportTable};
use regex::Regex;

/// Number of non-empty values kept as a column sample.
pub const SAMPLE_SIZE: usize = 3;

static DATE_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}/\d{1,2}/\d{4}").expect("Invalid date-like regex"));

/// Infers the type of a column from its non-empty values.
///
/// Precedence is number, then email, then date. A column without values is
/// text.
pub fn infer_type<'a>(values: impl IntoIterator<Item = &'a str>) -> ColumnType {
    let values: Vec<&str> = values.into_iter().filter(|v| !v.is_empty()).collect();
    if values.is_empty() {
        return ColumnType::Text;
    }
    if values.iter().all(|v| is_numeric(v)) {
        ColumnType::Number
    } else if values.iter().any(|v| v.contains('@')) {
        ColumnType::Email
    } else if values.iter().any(|v| DATE_LIKE.is_match(v)) {
        ColumnType::Date
    } else {
        ColumnType::Text
    }
}

fn is_numeric(value: &str) -> bool {
    value.trim().parse::<f64>().is_ok_and(f64::is_finite)
}

/// Builds one [`ImportColumn`] per column index up to the widest row.
///
/// Values come from data rows only. When there is no header row, or the
/// header cell is missing or blank, the column is named `Column N`. A header
/// name that repeats gets a ` (n)` suffix so every column name is unique.
pub fn analyze(rows: &[Vec<String>], has_header: bool) -> Vec<ImportColumn> {
    let table = ImportTable::new(rows.to_vec(), has_header);
    analyze_table(&table)
}

/// [`analyze`] over an already built table.
pub fn analyze_table(table: &ImportTable) -> Vec<ImportColumn> {
    let header = table.header().unwrap_or_default();
    let data = table.data_rows();
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();

    (0..table.width())
        .map(|index| {
            let values = data
                .iter()
                .map(|row| row.get(index).map_or("", String::as_str));
            let column_type = infer_type(values.clone());
            let sample = values
                .filter(|v| !v.is_empty())
                .take(SAMPLE_SIZE)
                .map(str::to_string)
                .collect();

            let base = header
                .get(index)
                .map(|h| h.trim())
                .filter(|h| !h.is_empty())
                .map_or_else(|| ImportColumn::synthesized_name(index), str::to_string);
            let name = unique_name(&mut seen, base);

            ImportColumn {
                name,
                index,
                sample,
                column_type,
            }
        })
        .collect()
}

fn unique_name(seen: &mut BTreeMap<String, usize>, base: String) -> String {
    let count = seen.entry(base.to_lowercase()).or_insert(0);
    *count += 1;
    if *count == 1 {
        base
    } else {
        let renamed = format!("{base} ({count})");
        tracing::warn!(column = %base, renamed = %renamed, "Duplicate column name in header");
        renamed
    }
}
