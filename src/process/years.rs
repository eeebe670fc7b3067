use anyhow::{anyhow, bail, Context, Result};
use arrow::{
    array::{Array, StringArray, UInt32Array},
    compute::{cast, take},
    datatypes::DataType,
    record_batch::RecordBatch,
};
use std::ops::Range;

use crate::process::filter::COUNTRY_CODE;

/// Number of metadata columns in front of the year run.
const LEADING_COLUMNS: usize = 4;

/// Positions of the year columns: everything after the leading metadata up to,
/// but not including, the last column.
fn year_range(data: &RecordBatch) -> Range<usize> {
    let end = data.num_columns().saturating_sub(1);
    LEADING_COLUMNS.min(end)..end
}

/// Labels of the year columns.
pub fn get_years(data: &RecordBatch) -> Vec<String> {
    let schema = data.schema();
    year_range(data)
        .map(|i| schema.field(i).name().clone())
        .collect()
}

/// The year columns with their data.
pub fn get_years_data(data: &RecordBatch) -> Result<RecordBatch> {
    let indices: Vec<usize> = year_range(data).collect();
    data.project(&indices).context("projecting year columns")
}

/// The `"Country Code"` column as strings, for every row or only the given
/// row positions (in the order given).
pub fn get_country_codes(data: &RecordBatch, indices: Option<&[usize]>) -> Result<StringArray> {
    let column = data
        .column_by_name(COUNTRY_CODE)
        .ok_or_else(|| anyhow!("no column named {:?}", COUNTRY_CODE))?;
    let column = cast(column, &DataType::Utf8)?;

    let selected = match indices {
        None => column,
        Some(indices) => {
            if let Some(bad) = indices.iter().find(|&&i| i >= data.num_rows()) {
                bail!("row {} out of range for {} rows", bad, data.num_rows());
            }
            let indices = UInt32Array::from_iter_values(indices.iter().map(|&i| i as u32));
            take(column.as_ref(), &indices, None)?
        }
    };

    selected
        .as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .ok_or_else(|| anyhow!("{:?} did not cast to strings", COUNTRY_CODE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testutil::sample_batch;
    use arrow::{
        array::{ArrayRef, Float64Array},
        datatypes::{Field, Schema},
    };
    use std::sync::Arc;

    fn example_batch() -> Result<RecordBatch> {
        let names = [
            "Country Name",
            "Country Code",
            "Indicator",
            "Indicator Code",
            "1990",
            "1991",
            "2020",
            "Unnamed",
        ];
        let fields: Vec<Field> = names
            .iter()
            .enumerate()
            .map(|(i, n)| {
                let dtype = if (4..7).contains(&i) {
                    DataType::Float64
                } else {
                    DataType::Utf8
                };
                Field::new(*n, dtype, true)
            })
            .collect();
        let text = |a: &str, b: &str| Arc::new(StringArray::from(vec![a, b])) as ArrayRef;
        let num = |a: f64, b: f64| Arc::new(Float64Array::from(vec![a, b])) as ArrayRef;
        Ok(RecordBatch::try_new(
            Arc::new(Schema::new(fields)),
            vec![
                text("United States", "United Kingdom"),
                text("USA", "GBR"),
                text("Population", "Population"),
                text("SP.POP.TOTL", "SP.POP.TOTL"),
                num(1.0, 2.0),
                num(3.0, 4.0),
                num(5.0, 6.0),
                Arc::new(StringArray::from(vec![None::<&str>, None])) as ArrayRef,
            ],
        )?)
    }

    #[test]
    fn years_sit_between_metadata_and_last_column() -> Result<()> {
        let data = example_batch()?;
        assert_eq!(get_years(&data), vec!["1990", "1991", "2020"]);

        let usa = crate::process::filter_country_code(&data, &["USA"])?;
        assert_eq!(usa.num_rows(), 1);
        assert_eq!(get_country_codes(&usa, None)?.value(0), "USA");
        Ok(())
    }

    #[test]
    fn years_data_columns_match_labels() -> Result<()> {
        for data in [example_batch()?, sample_batch()?] {
            let years = get_years_data(&data)?;
            let schema = years.schema();
            let labels: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
            assert_eq!(labels, get_years(&data));
            assert_eq!(years.num_rows(), data.num_rows());
        }
        Ok(())
    }

    #[test]
    fn narrow_tables_have_no_years() -> Result<()> {
        let data = example_batch()?.project(&[0, 1, 2])?;
        assert!(get_years(&data).is_empty());
        assert_eq!(get_years_data(&data)?.num_columns(), 0);
        Ok(())
    }

    #[test]
    fn country_codes_by_position() -> Result<()> {
        let data = sample_batch()?;
        let all = get_country_codes(&data, None)?;
        assert_eq!(all.len(), 3);

        let picked = get_country_codes(&data, Some(&[2, 0]))?;
        assert_eq!(picked.value(0), "DEU");
        assert_eq!(picked.value(1), "USA");

        assert!(get_country_codes(&data, Some(&[3])).is_err());
        Ok(())
    }
}
