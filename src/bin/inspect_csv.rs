use std::{env, process::exit};
use wbseries::{get_country_codes, get_years, read_csv};

fn main() {
    // Expect a CSV path and optionally the number of preamble lines.
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <CSV_FILE> [IGNORE_LINES]", args[0]);
        exit(1);
    }
    let ignore_lines = match args.get(2).map(|s| s.parse::<usize>()) {
        None => 4,
        Some(Ok(n)) => n,
        Some(Err(e)) => {
            eprintln!("Error: bad IGNORE_LINES: {}", e);
            exit(1);
        }
    };
    if let Err(e) = inspect_csv(&args[1], ignore_lines) {
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}

/// Print the column layout, year span and country codes of an indicator CSV.
fn inspect_csv(path: &str, ignore_lines: usize) -> anyhow::Result<()> {
    let data = read_csv(path, ignore_lines, ',')?;
    let schema = data.schema();

    println!("=== CSV File: {} ===", path);
    println!("Rows:    {}", data.num_rows());
    println!("Columns: {}", data.num_columns());
    println!();

    println!("=== Columns ===");
    for field in schema.fields() {
        println!("- {:<30} | {:?}", field.name(), field.data_type());
    }
    println!();

    let years = get_years(&data);
    match (years.first(), years.last()) {
        (Some(first), Some(last)) => println!("Years: {} .. {} ({})", first, last, years.len()),
        _ => println!("Years: none"),
    }

    let codes = get_country_codes(&data, None)?;
    let listed: Vec<&str> = codes.iter().map(|c| c.unwrap_or("<null>")).collect();
    println!("Country codes ({}): {}", listed.len(), listed.join(", "));
    Ok(())
}
