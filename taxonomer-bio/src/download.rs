//! Blocking download of source archives

use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use taxonomer_core::{TaxonomerError, TaxonomerResult};
use tracing::{info, warn};
use url::Url;

/// Local file name for `url`: its last non-empty path segment
pub fn file_name_for(url: &Url) -> TaxonomerResult<String> {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .ok_or_else(|| TaxonomerError::InvalidInput(format!("no file name in URL {}", url)))
}

/// Download `url` into `dest_dir` (created if needed).
///
/// An existing target is reused unless `clobber` is set. Returns the local
/// path and whether a download took place.
pub fn fetch_url(url: &str, dest_dir: &Path, clobber: bool) -> TaxonomerResult<(PathBuf, bool)> {
    let parsed =
        Url::parse(url).map_err(|e| TaxonomerError::InvalidInput(format!("{}: {}", url, e)))?;
    let file_name = file_name_for(&parsed)?;
    let dest = dest_dir.join(&file_name);

    if dest.exists() && !clobber {
        warn!("{} exists; not downloading", dest.display());
        return Ok((dest, false));
    }
    std::fs::create_dir_all(dest_dir)?;

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(300))
        .user_agent(concat!("taxonomer/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(network_error)?;

    info!("Downloading {} to {}", url, dest.display());
    let mut response = client.get(parsed).send().map_err(network_error)?;
    if !response.status().is_success() {
        return Err(TaxonomerError::Network(format!(
            "{} returned status {}",
            url,
            response.status()
        )));
    }

    let pb = match response.content_length() {
        Some(total) => {
            let pb = ProgressBar::new(total);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        }
        None => ProgressBar::new_spinner(),
    };

    // Partial transfers never land at `dest`
    let partial = dest_dir.join(format!("{}.part", file_name));
    let mut writer = pb.wrap_write(BufWriter::new(File::create(&partial)?));
    let copied = response
        .copy_to(&mut writer)
        .map_err(network_error)
        .and_then(|_| writer.flush().map_err(TaxonomerError::from));
    drop(writer);
    pb.finish_and_clear();
    if let Err(e) = copied {
        let _ = std::fs::remove_file(&partial);
        return Err(e);
    }

    std::fs::rename(&partial, &dest)?;
    Ok((dest, true))
}

fn network_error(err: reqwest::Error) -> TaxonomerError {
    TaxonomerError::Network(err.to_string())
}
