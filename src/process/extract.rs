use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use zip::ZipArchive;

use crate::process::utils::trim_dir;

/// Extract every entry of `zip_filename` into `to_dir` (defaults to `in_dir`)
/// and return the path of the CSV named after the archive.
///
/// The CSV path is `zip_filename` with `.zip` replaced by `.csv`, the `in_dir`
/// prefix and any leading separators removed, joined onto `to_dir`. The archive
/// is expected to hold a CSV with its own base name; that is not checked.
#[instrument(level = "info", skip(zip_filename), fields(zip = %zip_filename.as_ref().display()))]
pub fn extract_csv_from_zip<P: AsRef<Path>>(
    zip_filename: P,
    in_dir: &str,
    to_dir: Option<&str>,
) -> Result<PathBuf> {
    let zip_path = zip_filename.as_ref();
    let to_dir = to_dir.unwrap_or(in_dir);

    let file = File::open(zip_path)
        .with_context(|| format!("Failed to open ZIP file: {:?}", zip_path))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("Failed to read ZIP archive: {:?}", zip_path))?;
    archive
        .extract(to_dir)
        .with_context(|| format!("Failed to extract {:?} into {}", zip_path, to_dir))?;
    info!(entries = archive.len(), to_dir, "extracted");

    let csv_name = csv_name_for(&zip_path.to_string_lossy(), in_dir);
    let csv_path = Path::new(trim_dir(to_dir)).join(csv_name);
    debug!(csv = %csv_path.display(), "derived CSV path");
    Ok(csv_path)
}

/// `.zip` → `.csv`, then drop the `in_dir` prefix and leading separators.
fn csv_name_for(zip_filename: &str, in_dir: &str) -> String {
    let in_dir = trim_dir(in_dir);
    let replaced = zip_filename.replace(".zip", ".csv");
    // only strip whole path segments: "data" is not a prefix of "database/"
    let relative = match replaced.strip_prefix(in_dir) {
        Some(rest) if rest.is_empty() || rest.starts_with(['/', '\\']) => rest,
        _ => replaced.as_str(),
    };
    relative
        .trim_start_matches('/')
        .trim_start_matches('\\')
        .to_string()
}
