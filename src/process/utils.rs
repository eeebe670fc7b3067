use arrow::datatypes::DataType;
use std::collections::HashMap;

/// Cell texts read as missing values.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// 1) Whether a raw cell counts as missing.
pub fn is_missing(raw: &str) -> bool {
    NA_TOKENS.contains(&raw)
}

/// 2) Parse a non-missing cell as a number, tolerating surrounding whitespace.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

/// 3) Infer the Arrow dtype of a whole column: Float64 when every
///    non-missing cell is numeric (or there are none), Utf8 otherwise.
pub fn infer_column_dtype<'a, I>(cells: I) -> DataType
where
    I: IntoIterator<Item = &'a str>,
{
    let all_numeric = cells
        .into_iter()
        .filter(|c| !is_missing(c))
        .all(|c| parse_number(c).is_some());
    if all_numeric {
        DataType::Float64
    } else {
        DataType::Utf8
    }
}

/// Name empty headers `Unnamed: <i>` and suffix repeats with `.1`, `.2`, ...
pub fn clean_headers<'a, I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.into_iter()
        .enumerate()
        .map(|(i, h)| {
            let base = if h.is_empty() {
                format!("Unnamed: {}", i)
            } else {
                h.to_string()
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}

/// Strip trailing `/` then trailing `\` from a directory string.
pub fn trim_dir(dir: &str) -> &str {
    dir.trim_end_matches('/').trim_end_matches('\\')
}
