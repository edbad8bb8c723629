use crate::{ArchiverError, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// One spreadsheet row. Values are stored as read (trimmed); validity is a
/// separate question answered by [`is_valid_row`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuRow {
    pub sku: String,
    pub url: String,
}

/// Reads `sku`/`url` rows from a CSV spreadsheet with a header row.
///
/// Header names are matched case-insensitively after trimming; column order
/// does not matter and extra columns are ignored. Missing either required
/// column aborts before any row is produced.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<SkuRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let sku_idx = find_column(&headers, "sku");
    let url_idx = find_column(&headers, "url");
    let (sku_idx, url_idx) = match (sku_idx, url_idx) {
        (Some(sku), Some(url)) => (sku, url),
        (sku, url) => {
            let mut missing: Vec<&str> = Vec::new();
            if sku.is_none() {
                missing.push("sku");
            }
            if url.is_none() {
                missing.push("url");
            }
            return Err(ArchiverError::MissingColumns(missing.join(", ")));
        }
    };

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(SkuRow {
            sku: record.get(sku_idx).unwrap_or("").trim().to_string(),
            url: record.get(url_idx).unwrap_or("").trim().to_string(),
        });
    }
    Ok(rows)
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
}

/// A row is processable when both cells are non-empty after trimming and the
/// url is not the literal "nan" (a stringized empty spreadsheet cell).
pub fn is_valid_row(row: &SkuRow) -> bool {
    let sku = row.sku.trim();
    let url = row.url.trim();
    !sku.is_empty() && !url.is_empty() && !url.eq_ignore_ascii_case("nan")
}
