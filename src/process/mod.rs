// src/process/mod.rs

pub mod extract;
pub mod filter;
pub mod normalize;
pub mod read;
pub mod utils;
pub mod years;

pub use extract::extract_csv_from_zip;
pub use filter::{filter_column, filter_country_code, COUNTRY_CODE};
pub use normalize::{normalize, YearTable};
pub use read::read_csv;
pub use years::{get_country_codes, get_years, get_years_data};
