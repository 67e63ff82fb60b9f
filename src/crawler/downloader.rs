//! Document persistence
//!
//! Bodies are streamed to the output directory in fixed-size blocks under a
//! sanitized filename derived from the URL. Existing files are never
//! overwritten: a ` (N)` disambiguator is inserted before the extension.

use crate::crawler::HttpClient;
use crate::HarvestError;
use futures_util::StreamExt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use url::Url;

/// Size of the blocks written to storage
const CHUNK_SIZE: usize = 64 * 1024;

/// Longest filename kept, in characters (the tail is kept)
const MAX_FILENAME_CHARS: usize = 180;

/// A document saved to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRecord {
    /// URL the body was fetched from
    pub source_url: Url,
    /// Where the body was written
    pub local_path: PathBuf,
    /// Number of body bytes written
    pub bytes_written: u64,
}

/// Replaces characters outside `[\w\-.()+ ]` with `_` and keeps at most the last 180 characters
///
/// Deterministic and idempotent.
///
/// # Examples
///
/// ```
/// use doc_harvest::crawler::sanitize_filename;
///
/// assert_eq!(sanitize_filename("a:b?.pdf"), "a_b_.pdf");
/// assert_eq!(sanitize_filename("Module (v2)+notes.pdf"), "Module (v2)+notes.pdf");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: Vec<char> = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '(' | ')' | '+' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let start = cleaned.len().saturating_sub(MAX_FILENAME_CHARS);
    cleaned[start..].iter().collect()
}

/// Derives a raw filename from the URL's last path segment
///
/// Falls back to `default_name` when the path ends with `/` or is empty.
pub fn filename_from_url(url: &Url, default_name: &str) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .unwrap_or(default_name)
        .to_string()
}

/// Builds the `N`th disambiguated variant of `filename`: `stem (N).ext`
pub fn disambiguated_name(filename: &str, n: u32) -> String {
    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());

    match path.extension() {
        Some(ext) => format!("{} ({}).{}", stem, n, ext.to_string_lossy()),
        None => format!("{} ({})", stem, n),
    }
}

/// Creates a new file in `dir` named `filename`, or its first free ` (N)` variant
///
/// Uses create-new semantics, so an existing file is never truncated even if
/// another writer races for the same name.
pub async fn create_unique_file(dir: &Path, filename: &str) -> std::io::Result<(PathBuf, File)> {
    let mut candidate = dir.join(filename);
    let mut n = 0u32;

    loop {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await
        {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                n += 1;
                candidate = dir.join(disambiguated_name(filename, n));
            }
            Err(e) => return Err(e),
        }
    }
}

/// Streams documents into the output directory
#[derive(Debug, Clone)]
pub struct Downloader {
    output_dir: PathBuf,
    default_name: String,
}

impl Downloader {
    /// Creates a downloader writing into `output_dir`
    ///
    /// `extension` (e.g. `.pdf`) names the fallback file `document.pdf`.
    pub fn new(output_dir: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            output_dir: output_dir.into(),
            default_name: format!("document{}", extension),
        }
    }

    /// The directory documents are written to
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Downloads one document
    ///
    /// The directory is created on demand. If the transfer breaks after the
    /// file was created, the partial file stays on disk and the error is
    /// returned.
    pub async fn download(
        &self,
        client: &HttpClient,
        url: &Url,
    ) -> Result<DownloadRecord, HarvestError> {
        let filename = sanitize_filename(&filename_from_url(url, &self.default_name));

        let fetched = client.get(url).await?;
        let expected_len = fetched.content_length;

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| HarvestError::OutputDir {
                path: self.output_dir.clone(),
                source,
            })?;

        let (local_path, file) = create_unique_file(&self.output_dir, &filename).await?;
        let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
        let mut stream = fetched.into_response().bytes_stream();
        let mut bytes_written = 0u64;

        let interrupted = loop {
            let chunk = match tokio::time::timeout(client.timeout(), stream.next()).await {
                Ok(Some(Ok(chunk))) => chunk,
                Ok(Some(Err(e))) => break Some(HarvestError::from_reqwest(url.as_str(), e)),
                Ok(None) => break None,
                Err(_) => {
                    break Some(HarvestError::Timeout {
                        url: url.to_string(),
                    })
                }
            };
            writer.write_all(&chunk).await?;
            bytes_written += chunk.len() as u64;
        };
        writer.flush().await?;

        if let Some(err) = interrupted {
            tracing::warn!(
                "{}: transfer interrupted after {} bytes, partial file kept at {}",
                url,
                bytes_written,
                local_path.display()
            );
            return Err(err);
        }

        if let Some(expected) = expected_len {
            if expected != bytes_written {
                tracing::warn!(
                    "{}: Content-Length {} but {} bytes received",
                    url,
                    expected,
                    bytes_written
                );
            }
        }

        Ok(DownloadRecord {
            source_url: url.clone(),
            local_path,
            bytes_written,
        })
    }
}
