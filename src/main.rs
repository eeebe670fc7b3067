use anyhow::Result;
use arrow::util::pretty::pretty_format_batches;
use std::env;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use wbseries::{
    extract_csv_from_zip, fetch, filter_country_code, normalize, plot, read_csv, PipelineConfig,
};

const DEFAULT_CONFIG: &str = "wbseries.yaml";

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    // ─── 2) load config ──────────────────────────────────────────────
    let config_path = env::args()
        .nth(1)
        .or_else(|| env::var("WBSERIES_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let cfg = PipelineConfig::from_yaml_file(&config_path)?;
    info!(config = %config_path, url = %cfg.url, "startup");

    // ─── 3) download + extract ───────────────────────────────────────
    let zip_path = fetch::download_file(&cfg.url, &cfg.download_dir)?;
    let csv_path = extract_csv_from_zip(&zip_path, &cfg.download_dir, cfg.extract_dir.as_deref())?;

    // ─── 4) load + filter ────────────────────────────────────────────
    let data = read_csv(&csv_path, cfg.ignore_lines, cfg.delimiter)?;
    let data = if cfg.country_codes.is_empty() {
        data
    } else {
        let codes: Vec<&str> = cfg.country_codes.iter().map(String::as_str).collect();
        filter_country_code(&data, &codes)?
    };
    info!(rows = data.num_rows(), "rows selected");

    // ─── 5) reshape + plot ───────────────────────────────────────────
    let table = normalize(&data)?;
    let chart = plot(&table);
    match chart.y_bounds() {
        Some((lo, hi)) => info!(series = chart.series.len(), lo, hi, "plot ready"),
        None => info!("plot has no points"),
    }

    println!("{}", pretty_format_batches(&[table.to_record_batch()?])?);
    Ok(())
}
