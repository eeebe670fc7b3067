use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{Array, BooleanArray, Float64Array, Scalar, StringArray},
    compute::{filter_record_batch, kernels::cmp::eq, or_kleene},
    datatypes::DataType,
    record_batch::RecordBatch,
};
use tracing::{debug, instrument};

/// Column holding the entity key in indicator exports.
pub const COUNTRY_CODE: &str = "Country Code";

/// Keep the rows whose `column` equals any of `values`.
///
/// An empty `values` yields an empty batch with the input schema. Numeric
/// columns compare numerically; a value that is not a number matches nothing.
/// Null cells never match.
#[instrument(level = "debug", skip(data, values), fields(count = values.len()))]
pub fn filter_column(data: &RecordBatch, column: &str, values: &[&str]) -> Result<RecordBatch> {
    if values.is_empty() {
        return Ok(data.slice(0, 0));
    }

    let idx = data
        .schema()
        .index_of(column)
        .map_err(|_| anyhow!("no column named {:?}", column))?;
    let series = data.column(idx);

    let mut mask: Option<BooleanArray> = None;
    for value in values {
        let hits = match series.data_type() {
            DataType::Float64 => match value.trim().parse::<f64>() {
                Ok(n) => eq(series, &Scalar::new(Float64Array::from(vec![n])))?,
                Err(_) => BooleanArray::from(vec![false; series.len()]),
            },
            _ => eq(series, &Scalar::new(StringArray::from(vec![*value])))
                .with_context(|| format!("comparing column {:?}", column))?,
        };
        mask = Some(match mask {
            Some(acc) => or_kleene(&acc, &hits)?,
            None => hits,
        });
    }

    // values is non-empty, so the mask is always built
    let mask = mask.unwrap_or_else(|| BooleanArray::from(vec![false; data.num_rows()]));
    let out = filter_record_batch(data, &mask)?;
    debug!(kept = out.num_rows(), of = data.num_rows(), "filtered");
    Ok(out)
}

/// [`filter_column`] keyed on `"Country Code"`.
pub fn filter_country_code(data: &RecordBatch, country_codes: &[&str]) -> Result<RecordBatch> {
    filter_column(data, COUNTRY_CODE, country_codes)
}
