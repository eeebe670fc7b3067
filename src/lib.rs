//! Download zipped indicator exports, load the CSV inside, and reshape the
//! wide per-year table into a year-indexed one ready for plotting.

pub mod config;
pub mod fetch;
pub mod plot;
pub mod process;

pub use config::PipelineConfig;
pub use fetch::download_file;
pub use plot::{plot, YearPlot};
pub use process::{
    extract_csv_from_zip, filter_column, filter_country_code, get_country_codes, get_years,
    get_years_data, normalize, read_csv, YearTable,
};
