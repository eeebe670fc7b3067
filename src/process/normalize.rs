use anyhow::{Context, Result};
use arrow::{
    array::{Array, ArrayRef, Float64Array, StringArray},
    compute::{cast_with_options, CastOptions},
    datatypes::{DataType, Field, Schema},
    record_batch::{RecordBatch, RecordBatchOptions},
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::process::years::{get_country_codes, get_years, get_years_data};

/// A time-indexed table: one row per year, one `Float64` column per entity.
#[derive(Debug, Clone)]
pub struct YearTable {
    /// Row labels, in source column order.
    pub years: Vec<String>,
    /// Values; column names are the entity codes.
    pub values: RecordBatch,
}

impl YearTable {
    pub fn num_rows(&self) -> usize {
        self.years.len()
    }

    /// Column labels (entity codes).
    pub fn codes(&self) -> Vec<String> {
        self.values
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Values of the column at `idx`. Every column is `Float64` without nulls.
    pub fn series(&self, idx: usize) -> Option<&Float64Array> {
        if idx >= self.values.num_columns() {
            return None;
        }
        self.values.column(idx).as_any().downcast_ref::<Float64Array>()
    }

    /// The table with the years as a leading `Year` column, for display.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let mut fields = vec![Field::new("Year", DataType::Utf8, false)];
        fields.extend(self.values.schema().fields().iter().map(|f| f.as_ref().clone()));
        let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from(self.years.clone()))];
        columns.extend(self.values.columns().iter().cloned());
        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
    }
}

/// Reshape the wide table into a [`YearTable`].
///
/// Steps: capture the country codes, keep the year columns, transpose so years
/// become rows, interpolate each entity's series, drop the years that still
/// have gaps, and label the columns with the codes.
#[instrument(level = "info", skip(data), fields(rows = data.num_rows()))]
pub fn normalize(data: &RecordBatch) -> Result<YearTable> {
    let codes = get_country_codes(data, None)?;
    let years = get_years(data);
    let years_data = get_years_data(data)?;

    // 1) numeric year columns, row-major per entity after the transpose
    let options = CastOptions {
        safe: false,
        ..Default::default()
    };
    let mut by_year: Vec<Vec<Option<f64>>> = Vec::with_capacity(years.len());
    for (year, column) in years.iter().zip(years_data.columns()) {
        let column = cast_with_options(column, &DataType::Float64, &options)
            .with_context(|| format!("year column {:?} is not numeric", year))?;
        let column = column
            .as_any()
            .downcast_ref::<Float64Array>()
            .with_context(|| format!("year column {:?} is not numeric", year))?;
        by_year.push(column.iter().collect());
    }

    // 2) interpolate along years for each entity
    let mut by_entity: Vec<Vec<Option<f64>>> = (0..codes.len())
        .map(|e| by_year.iter().map(|row| row[e]).collect())
        .collect();
    for series in &mut by_entity {
        interpolate_linear(series);
    }

    // 3) drop years that still have a gap in any entity
    let keep: Vec<usize> = (0..years.len())
        .filter(|&y| by_entity.iter().all(|s| s[y].is_some()))
        .collect();
    debug!(kept = keep.len(), of = years.len(), "dropped incomplete years");

    // 4) relabel with the captured codes
    let fields: Vec<Field> = codes
        .iter()
        .map(|c| Field::new(c.unwrap_or("NaN"), DataType::Float64, false))
        .collect();
    let columns: Vec<ArrayRef> = by_entity
        .iter()
        .map(|s| {
            let values: Float64Array = keep.iter().map(|&y| s[y]).collect();
            Arc::new(values) as ArrayRef
        })
        .collect();
    let values = RecordBatch::try_new_with_options(
        Arc::new(Schema::new(fields)),
        columns,
        &RecordBatchOptions::new().with_row_count(Some(keep.len())),
    )
    .context("building normalized table")?;

    let years: Vec<String> = keep.into_iter().map(|y| years[y].clone()).collect();
    info!(years = years.len(), entities = values.num_columns(), "normalized");
    Ok(YearTable { years, values })
}

/// Fill gaps by linear interpolation over positions. Leading gaps stay empty;
/// trailing gaps take the last known value.
pub fn interpolate_linear(series: &mut [Option<f64>]) {
    let mut last: Option<(usize, f64)> = None;
    for i in 0..series.len() {
        let Some(value) = series[i] else { continue };
        if let Some((j, prev)) = last {
            let span = (i - j) as f64;
            for k in j + 1..i {
                series[k] = Some(prev + (value - prev) * (k - j) as f64 / span);
            }
        }
        last = Some((i, value));
    }
    if let Some((j, prev)) = last {
        for slot in &mut series[j + 1..] {
            *slot = Some(prev);
        }
    }
}
