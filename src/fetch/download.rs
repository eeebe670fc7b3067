use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_DISPOSITION;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use url::Url;

/// Pull the filename out of a `Content-Disposition` value.
///
/// The name is the text after the first `=` (and before any further `=`),
/// taken literally: no quote stripping, no RFC 5987 decoding.
pub fn filename_from_content_disposition(value: &str) -> Result<&str> {
    value
        .split('=')
        .nth(1)
        .ok_or_else(|| anyhow!("malformed Content-Disposition header: {:?}", value))
}

/// Strip leading separators so the name always lands under the target dir.
fn relative_name(filename: &str) -> Result<&str> {
    let name = filename.trim_start_matches(['/', '\\']);
    if name.is_empty() {
        return Err(anyhow!("empty filename in Content-Disposition: {:?}", filename));
    }
    Ok(name)
}

/// Download `url` and save it under `to`, named after the response's
/// `Content-Disposition` header. The directory is created if missing.
/// Returns the full path of the saved file.
pub fn download_file(url: &str, to: &str) -> Result<PathBuf> {
    download_file_with(&Client::new(), url, to)
}

/// [`download_file`] with a caller-supplied client.
#[instrument(level = "info", skip(client, to), fields(to = %to))]
pub fn download_file_with(client: &Client, url: &str, to: &str) -> Result<PathBuf> {
    let url = Url::parse(url).with_context(|| format!("parsing URL {}", url))?;

    let resp = client
        .get(url.as_str())
        .send()
        .with_context(|| format!("GET {}", url))?
        .error_for_status()
        .with_context(|| format!("non-success status from {}", url))?;

    let disposition = resp
        .headers()
        .get(CONTENT_DISPOSITION)
        .ok_or_else(|| anyhow!("no Content-Disposition header in response from {}", url))?
        .to_str()
        .context("Content-Disposition header is not valid text")?
        .to_string();
    let filename = filename_from_content_disposition(&disposition)?;
    debug!(filename, "resolved filename from Content-Disposition");

    let base = to.trim_end_matches('/').trim_end_matches('\\');
    let dest_path = Path::new(base).join(relative_name(filename)?);

    if let Some(parent) = dest_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }

    let bytes = resp
        .bytes()
        .with_context(|| format!("reading body from {}", url))?;
    fs::write(&dest_path, &bytes)
        .with_context(|| format!("writing {}", dest_path.display()))?;

    info!(path = %dest_path.display(), bytes = bytes.len(), "downloaded");
    Ok(dest_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve exactly one HTTP response on a random localhost port.
    fn serve_once(headers: &'static str, body: &'static [u8]) -> Result<String> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                // drain the request head
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut line = String::new();
                while reader.read_line(&mut line).unwrap_or(0) > 0 {
                    if line == "\r\n" {
                        break;
                    }
                    line.clear();
                }
                let head = format!(
                    "HTTP/1.1 200 OK\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n",
                    headers,
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(body);
            }
        });
        Ok(format!("http://{}/api/v2/en/indicator/SP.POP.TOTL", addr))
    }

    fn local_client() -> Result<Client> {
        Ok(Client::builder().no_proxy().build()?)
    }

    #[test]
    fn filename_is_text_after_equals() -> Result<()> {
        assert_eq!(
            filename_from_content_disposition("attachment; filename=API_SP.POP.TOTL.zip")?,
            "API_SP.POP.TOTL.zip"
        );
        assert!(filename_from_content_disposition("attachment").is_err());
        Ok(())
    }

    #[test]
    fn downloads_into_created_directory() -> Result<()> {
        let url = serve_once(
            "Content-Disposition: attachment; filename=pop.zip\r\n",
            b"PK-not-really",
        )?;
        let dir = tempfile::tempdir()?;
        let target = dir.path().join("nested").join("deeper");
        let to = format!("{}/", target.display());

        let path = download_file_with(&local_client()?, &url, &to)?;

        assert_eq!(path, target.join("pop.zip"));
        assert_eq!(fs::read(&path)?, b"PK-not-really");
        Ok(())
    }

    #[test]
    fn absolute_filename_stays_under_target() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let url = serve_once(
            "Content-Disposition: attachment; filename=/abs/x.zip\r\n",
            b"zip",
        )?;

        let path = download_file_with(&local_client()?, &url, &dir.path().display().to_string())?;

        assert_eq!(path, dir.path().join("abs").join("x.zip"));
        assert!(path.starts_with(dir.path()));
        assert_eq!(fs::read(&path)?, b"zip");
        Ok(())
    }

    #[test]
    fn separator_only_filename_fails() {
        assert!(relative_name("/\\/").is_err());
        assert_eq!(relative_name("\\pop.zip").ok(), Some("pop.zip"));
    }

    #[test]
    fn missing_content_disposition_fails() -> Result<()> {
        let url = serve_once("Content-Type: application/zip\r\n", b"data")?;
        let dir = tempfile::tempdir()?;

        let err = download_file_with(&local_client()?, &url, &dir.path().display().to_string())
            .unwrap_err();
        assert!(err.to_string().contains("Content-Disposition"));
        Ok(())
    }

    #[test]
    fn rejects_unparseable_url() {
        assert!(download_file_with(&Client::new(), "not a url", ".").is_err());
    }
}
