use anyhow::{bail, Context, Result};
use arrow::{
    array::{ArrayRef, Float64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::{RecordBatch, RecordBatchOptions},
};
use csv::ReaderBuilder;
use std::{fs, path::Path, sync::Arc};
use tracing::{info, instrument, warn};

use crate::process::utils::{clean_headers, infer_column_dtype, is_missing, parse_number};

/// Read `csv_filename` into a [`RecordBatch`], skipping the first
/// `ignore_lines` lines before the header row.
///
/// `delimiter` is accepted but not applied: the file is always parsed as
/// comma-separated.
#[instrument(level = "info", skip(csv_filename), fields(path = %csv_filename.as_ref().display()))]
pub fn read_csv<P: AsRef<Path>>(
    csv_filename: P,
    ignore_lines: usize,
    delimiter: char,
) -> Result<RecordBatch> {
    let path = csv_filename.as_ref();
    if delimiter != ',' {
        warn!(%delimiter, "delimiter argument is ignored; parsing as comma-separated");
    }

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read CSV file: {:?}", path))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    let body: String = text.split_inclusive('\n').skip(ignore_lines).collect();
    if body.trim().is_empty() {
        bail!(
            "no header row in {:?} after skipping {} lines",
            path,
            ignore_lines
        );
    }

    let batch = parse_csv(&body).with_context(|| format!("CSV parse error in {:?}", path))?;
    info!(
        rows = batch.num_rows(),
        columns = batch.num_columns(),
        "loaded CSV"
    );
    Ok(batch)
}

/// Parse headed CSV text into typed columns.
fn parse_csv(body: &str) -> Result<RecordBatch> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = clean_headers(rdr.headers().context("reading header row")?.iter());
    let width = headers.len();
    if width == 0 {
        bail!("empty header row");
    }

    // column-major cells; short rows are padded with missing values
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); width];
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("record {}", idx))?;
        if record.len() > width {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            bail!(
                "line {}: expected {} fields, saw {}",
                line,
                width,
                record.len()
            );
        }
        for (col, column) in cells.iter_mut().enumerate() {
            column.push(record.get(col).unwrap_or_default().to_string());
        }
    }

    let num_rows = cells.first().map(Vec::len).unwrap_or(0);
    let mut fields = Vec::with_capacity(width);
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(width);
    for (name, column) in headers.into_iter().zip(cells) {
        let dtype = infer_column_dtype(column.iter().map(String::as_str));
        let array: ArrayRef = match dtype {
            DataType::Float64 => Arc::new(
                column
                    .iter()
                    .map(|c| if is_missing(c) { None } else { parse_number(c) })
                    .collect::<Float64Array>(),
            ),
            _ => Arc::new(
                column
                    .iter()
                    .map(|c| if is_missing(c) { None } else { Some(c.as_str()) })
                    .collect::<StringArray>(),
            ),
        };
        fields.push(Field::new(name, dtype, true));
        columns.push(array);
    }

    let options = RecordBatchOptions::new().with_row_count(Some(num_rows));
    RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), columns, &options)
        .context("building record batch")
}
