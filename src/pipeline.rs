use crate::archive::ArchiveBuilder;
use crate::classify::{classify, ClassifiedUrl};
use crate::fetch::{build_agent, fetch_bytes};
use crate::normalize::normalize_to_canvas;
use crate::resolve::resolve_main_image;
use crate::rows::{is_valid_row, read_rows, SkuRow};
use crate::Result;
use serde::Serialize;
use std::io::Read;

/// What happened to a single spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Added { filename: String },
    SkippedInvalidRow,
    SkippedUnsupportedUrl,
    SkippedNoImageFound,
    Failed { message: String },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ArchiveSummary {
    pub rows_seen: usize,
    pub images_added: usize,
    pub skipped_invalid_rows: usize,
    pub skipped_unsupported_urls: usize,
    pub skipped_no_image_found: usize,
    pub failed_rows: usize,
}

#[derive(Debug, Clone)]
pub struct ArchiveOutput {
    pub zip_bytes: Vec<u8>,
    pub summary: ArchiveSummary,
}

/// Reads `sku`/`url` rows from a CSV spreadsheet and builds the archive over
/// HTTP. A malformed spreadsheet aborts before any row is processed.
pub fn build_archive_from_csv<R, FLog>(reader: R, log_line: FLog) -> Result<ArchiveOutput>
where
    R: Read,
    FLog: FnMut(&str, &str, serde_json::Value) -> Result<()>,
{
    let rows = read_rows(reader)?;
    build_archive_http(&rows, log_line)
}

/// Builds the archive for pre-parsed rows, fetching over HTTP.
pub fn build_archive_http<FLog>(rows: &[SkuRow], log_line: FLog) -> Result<ArchiveOutput>
where
    FLog: FnMut(&str, &str, serde_json::Value) -> Result<()>,
{
    let agent = build_agent();
    build_archive(rows, |url| fetch_bytes(&agent, url), log_line)
}

/// Core row loop. `fetch` retrieves raw bytes for a URL (page HTML or image
/// alike); `log_line` receives (level, event, fields) per informational
/// status. Rows are processed strictly one at a time in input order, and a
/// failing row never aborts the batch: fetch/decode/archive errors are
/// caught at the row boundary, logged with the offending SKU, and counted.
pub fn build_archive<FFetch, FLog>(
    rows: &[SkuRow],
    mut fetch: FFetch,
    mut log_line: FLog,
) -> Result<ArchiveOutput>
where
    FFetch: FnMut(&str) -> Result<Vec<u8>>,
    FLog: FnMut(&str, &str, serde_json::Value) -> Result<()>,
{
    let mut archive = ArchiveBuilder::new();
    let mut summary = ArchiveSummary::default();

    for row in rows {
        summary.rows_seen += 1;
        match process_row(row, &mut archive, &mut fetch, &mut log_line)? {
            RowOutcome::Added { .. } => summary.images_added += 1,
            RowOutcome::SkippedInvalidRow => summary.skipped_invalid_rows += 1,
            RowOutcome::SkippedUnsupportedUrl => summary.skipped_unsupported_urls += 1,
            RowOutcome::SkippedNoImageFound => summary.skipped_no_image_found += 1,
            RowOutcome::Failed { .. } => summary.failed_rows += 1,
        }
    }

    Ok(ArchiveOutput {
        zip_bytes: archive.finalize()?,
        summary,
    })
}

fn process_row<FFetch, FLog>(
    row: &SkuRow,
    archive: &mut ArchiveBuilder,
    fetch: &mut FFetch,
    log_line: &mut FLog,
) -> Result<RowOutcome>
where
    FFetch: FnMut(&str) -> Result<Vec<u8>>,
    FLog: FnMut(&str, &str, serde_json::Value) -> Result<()>,
{
    if !is_valid_row(row) {
        return Ok(RowOutcome::SkippedInvalidRow);
    }
    let sku = row.sku.trim();
    let url = row.url.trim();

    let fetched: Result<Option<Vec<u8>>> = match classify(url) {
        ClassifiedUrl::DirectImage(image_url) => fetch(image_url).map(Some),
        ClassifiedUrl::ProductPage(page_url) => {
            log_line(
                "info",
                "product_page_lookup",
                serde_json::json!({ "sku": sku }),
            )?;
            match fetch(page_url) {
                Ok(page_bytes) => {
                    let html = String::from_utf8_lossy(&page_bytes).into_owned();
                    match resolve_main_image(&html) {
                        Some(image_url) => fetch(&image_url).map(Some),
                        None => Ok(None),
                    }
                }
                Err(err) => Err(err),
            }
        }
        ClassifiedUrl::Unsupported(_) => {
            log_line(
                "warn",
                "unsupported_url",
                serde_json::json!({ "sku": sku, "url": url }),
            )?;
            return Ok(RowOutcome::SkippedUnsupportedUrl);
        }
    };

    let image_bytes = match fetched {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            log_line(
                "warn",
                "no_image_found",
                serde_json::json!({ "sku": sku }),
            )?;
            return Ok(RowOutcome::SkippedNoImageFound);
        }
        Err(err) => {
            let message = err.to_string();
            log_line(
                "error",
                "row_failed",
                serde_json::json!({ "sku": sku, "error": message }),
            )?;
            return Ok(RowOutcome::Failed { message });
        }
    };

    match normalize_to_canvas(&image_bytes)
        .and_then(|normalized| archive.add_entry(sku, &normalized))
    {
        Ok(filename) => {
            log_line(
                "info",
                "image_added",
                serde_json::json!({ "sku": sku, "filename": filename }),
            )?;
            Ok(RowOutcome::Added { filename })
        }
        Err(err) => {
            let message = err.to_string();
            log_line(
                "error",
                "row_failed",
                serde_json::json!({ "sku": sku, "error": message }),
            )?;
            Ok(RowOutcome::Failed { message })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArchiverError;
    use image::{Rgb, RgbImage};
    use std::collections::HashMap;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([90, 40, 40]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).expect("png");
        buf.into_inner()
    }

    fn fetch_from(map: HashMap<String, Vec<u8>>) -> impl FnMut(&str) -> crate::Result<Vec<u8>> {
        move |url: &str| {
            map.get(url).cloned().ok_or_else(|| ArchiverError::Fetch {
                url: url.to_string(),
                reason: "status=404".to_string(),
            })
        }
    }

    fn no_log(_level: &str, _event: &str, _fields: serde_json::Value) -> crate::Result<()> {
        Ok(())
    }

    fn row(sku: &str, url: &str) -> SkuRow {
        SkuRow {
            sku: sku.to_string(),
            url: url.to_string(),
        }
    }

    fn archive_names(zip_bytes: Vec<u8>) -> Vec<String> {
        let archive = zip::ZipArchive::new(Cursor::new(zip_bytes)).expect("archive");
        archive.file_names().map(str::to_string).collect()
    }

    #[test]
    fn direct_image_row_lands_in_the_archive() {
        let mut responses = HashMap::new();
        responses.insert("http://x.com/img.jpg".to_string(), png_bytes(8, 8));

        let rows = vec![row("A1", "http://x.com/img.jpg")];
        let out = build_archive(&rows, fetch_from(responses), no_log).expect("build");

        assert_eq!(out.summary.images_added, 1);
        assert_eq!(archive_names(out.zip_bytes), vec!["A1-1.jpg"]);
    }

    #[test]
    fn duplicate_skus_append_numbered_entries() {
        let mut responses = HashMap::new();
        responses.insert("http://x.com/a.jpg".to_string(), png_bytes(8, 8));
        responses.insert("http://x.com/b.jpg".to_string(), png_bytes(9, 9));

        let rows = vec![
            row("A1", "http://x.com/a.jpg"),
            row("A1", "http://x.com/b.jpg"),
        ];
        let out = build_archive(&rows, fetch_from(responses), no_log).expect("build");

        let mut names = archive_names(out.zip_bytes);
        names.sort();
        assert_eq!(names, vec!["A1-1.jpg", "A1-2.jpg"]);
    }

    #[test]
    fn nan_and_blank_rows_are_skipped_silently() {
        let rows = vec![row("A1", "nan"), row("", "http://x.com/a.jpg"), row("B2", " ")];
        let mut events: Vec<String> = Vec::new();
        let out = build_archive(
            &rows,
            |url| {
                panic!("no fetch expected for {url}");
            },
            |_level, event, _fields| {
                events.push(event.to_string());
                Ok(())
            },
        )
        .expect("build");

        assert_eq!(out.summary.skipped_invalid_rows, 3);
        assert_eq!(out.summary.images_added, 0);
        assert!(events.is_empty(), "events={events:?}");
        assert!(archive_names(out.zip_bytes).is_empty());
    }

    #[test]
    fn unsupported_urls_are_skipped_and_logged() {
        let rows = vec![row("A1", "https://example.com/page")];
        let mut events: Vec<String> = Vec::new();
        let out = build_archive(
            &rows,
            |url| panic!("no fetch expected for {url}"),
            |_level, event, _fields| {
                events.push(event.to_string());
                Ok(())
            },
        )
        .expect("build");

        assert_eq!(out.summary.skipped_unsupported_urls, 1);
        assert_eq!(events, vec!["unsupported_url"]);
    }

    #[test]
    fn product_page_rows_resolve_and_fetch_the_main_image() {
        let html = r#"
        <html><body>
          <img id="landingImage" data-old-hires="https://img.example.com/hires.jpg" />
        </body></html>
        "#;
        let mut responses = HashMap::new();
        responses.insert(
            "https://www.amazon.com/dp/ABC".to_string(),
            html.as_bytes().to_vec(),
        );
        responses.insert("https://img.example.com/hires.jpg".to_string(), png_bytes(12, 4));

        let rows = vec![row("A1", "https://www.amazon.com/dp/ABC")];
        let out = build_archive(&rows, fetch_from(responses), no_log).expect("build");

        assert_eq!(out.summary.images_added, 1);
        assert_eq!(archive_names(out.zip_bytes), vec!["A1-1.jpg"]);
    }

    #[test]
    fn product_page_without_a_main_image_is_skipped() {
        let html = "<html><body><p>sold out</p></body></html>";
        let mut responses = HashMap::new();
        responses.insert(
            "https://www.amazon.com/dp/GONE".to_string(),
            html.as_bytes().to_vec(),
        );

        let rows = vec![row("A1", "https://www.amazon.com/dp/GONE")];
        let mut events: Vec<String> = Vec::new();
        let out = build_archive(&rows, fetch_from(responses), |_l, event, _f| {
            events.push(event.to_string());
            Ok(())
        })
        .expect("build");

        assert_eq!(out.summary.skipped_no_image_found, 1);
        assert_eq!(events, vec!["product_page_lookup", "no_image_found"]);
        assert!(archive_names(out.zip_bytes).is_empty());
    }

    #[test]
    fn a_failing_row_does_not_abort_the_batch() {
        let mut responses = HashMap::new();
        responses.insert("http://x.com/a.jpg".to_string(), png_bytes(8, 8));
        // b.jpg missing: fetch fails. c.jpg returns bytes that do not decode.
        responses.insert("http://x.com/c.jpg".to_string(), b"not an image".to_vec());
        responses.insert("http://x.com/d.jpg".to_string(), png_bytes(6, 6));

        let rows = vec![
            row("A1", "http://x.com/a.jpg"),
            row("B2", "http://x.com/b.jpg"),
            row("C3", "http://x.com/c.jpg"),
            row("D4", "http://x.com/d.jpg"),
        ];
        let out = build_archive(&rows, fetch_from(responses), no_log).expect("build");

        assert_eq!(out.summary.images_added, 2);
        assert_eq!(out.summary.failed_rows, 2);
        let mut names = archive_names(out.zip_bytes);
        names.sort();
        assert_eq!(names, vec!["A1-1.jpg", "D4-1.jpg"]);
    }

    #[test]
    fn failed_rows_log_the_offending_sku() {
        let rows = vec![row("B2", "http://x.com/missing.jpg")];
        let mut logged: Vec<(String, serde_json::Value)> = Vec::new();
        let out = build_archive(
            &rows,
            fetch_from(HashMap::new()),
            |_level, event, fields| {
                logged.push((event.to_string(), fields));
                Ok(())
            },
        )
        .expect("build");

        assert_eq!(out.summary.failed_rows, 1);
        let (event, fields) = &logged[0];
        assert_eq!(event, "row_failed");
        assert_eq!(fields["sku"], "B2");
        assert!(fields["error"].as_str().unwrap_or("").contains("status=404"));
    }
}
