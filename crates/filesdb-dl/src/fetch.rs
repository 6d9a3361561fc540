use std::{
    fs::{self, File},
    io::{BufWriter, Read, Write as _},
    path::{Path, PathBuf},
};

use filesdb_utils::fs::safe_remove;
use tracing::{debug, trace};
use ureq::{
    http::{header::CONTENT_LENGTH, Response},
    Body,
};
use url::Url;

use crate::{error::DownloadError, http::Http};

const CHUNK_SIZE: usize = 8192;

/// A single transfer progress report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress<'a> {
    /// Name of the file being written into the cache directory.
    pub filename: &'a str,
    /// Bytes received so far.
    pub current: u64,
    /// Expected size, `0` when the server did not announce one.
    pub total: u64,
}

pub type ProgressCallback = Box<dyn Fn(Progress<'_>) + Send + Sync>;

/// Retrieves a URL into local storage.
pub trait Fetch {
    /// Downloads `url` as `filename` and returns the path of the stored file.
    fn fetch(&self, url: &str, filename: &str) -> Result<PathBuf, DownloadError>;
}

/// Downloads files into a registered cache directory.
///
/// `http(s)://` URLs go through the shared agent, `file://` URLs are copied from the
/// local filesystem. Data is streamed into a `.part` sibling first and only renamed
/// onto the final name once the body has been fully received, so a failed transfer
/// never leaves a file under the final name.
pub struct Fetcher {
    cache_dir: PathBuf,
    on_progress: Option<ProgressCallback>,
}

impl Fetcher {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            on_progress: None,
        }
    }

    /// Registers a callback invoked once before the body is read and after every chunk.
    pub fn progress<F>(mut self, on_progress: F) -> Self
    where
        F: Fn(Progress<'_>) + Send + Sync + 'static,
    {
        self.on_progress = Some(Box::new(on_progress));
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn report(&self, filename: &str, current: u64, total: u64) {
        if let Some(ref cb) = self.on_progress {
            cb(Progress {
                filename,
                current,
                total,
            });
        }
    }

    /// Opens the body of `url` along with its announced size.
    fn open(&self, url: &Url) -> Result<(Box<dyn Read>, u64), DownloadError> {
        if url.scheme() == "file" {
            let path = url
                .to_file_path()
                .map_err(|_| DownloadError::LocalPath(url.to_string()))?;
            let read_err = |source: std::io::Error| {
                DownloadError::Read {
                    path: path.clone(),
                    source,
                }
            };
            let file = File::open(&path).map_err(read_err)?;
            let total = file.metadata().map_err(read_err)?.len();
            return Ok((Box::new(file), total));
        }

        let resp = Http::fetch(url.as_str())?;
        let total = parse_content_length(&resp);
        Ok((Box::new(resp.into_body().into_reader()), total))
    }

    fn download_to(&self, url: &Url, filename: &str, part: &Path) -> Result<u64, DownloadError> {
        let (mut reader, total) = self.open(url)?;

        let write_err = |source: std::io::Error| {
            DownloadError::Write {
                path: part.to_path_buf(),
                source,
            }
        };

        let mut file = BufWriter::new(File::create(part).map_err(write_err)?);
        let mut buffer = [0u8; CHUNK_SIZE];
        let mut downloaded = 0u64;

        self.report(filename, downloaded, total);

        loop {
            let n = reader.read(&mut buffer)?;
            if n == 0 {
                break;
            }

            file.write_all(&buffer[..n]).map_err(write_err)?;
            downloaded += n as u64;
            self.report(filename, downloaded, total);
        }

        file.into_inner()
            .map_err(|err| write_err(err.into_error()))?
            .sync_all()
            .map_err(write_err)?;

        Ok(downloaded)
    }
}

impl Fetch for Fetcher {
    fn fetch(&self, url: &str, filename: &str) -> Result<PathBuf, DownloadError> {
        let parsed = Url::parse(url).map_err(|source| {
            DownloadError::InvalidUrl {
                url: url.to_string(),
                source,
            }
        })?;

        let output = self.cache_dir.join(filename);
        let part = self.cache_dir.join(format!("{filename}.part"));

        debug!("fetching {} into {}", url, output.display());

        match self.download_to(&parsed, filename, &part) {
            Ok(size) => trace!("received {} bytes from {}", size, url),
            Err(err) => {
                if let Err(rm_err) = safe_remove(&part) {
                    debug!("{}", rm_err);
                }
                return Err(err);
            }
        }

        fs::rename(&part, &output).map_err(|source| {
            DownloadError::Write {
                path: output.clone(),
                source,
            }
        })?;

        Ok(output)
    }
}

/// Size announced by `Content-Length`, or `0` when absent.
fn parse_content_length(resp: &Response<Body>) -> u64 {
    resp.headers()
        .get(CONTENT_LENGTH)
        .and_then(|h| h.to_str().ok())
        .and_then(|len| len.parse::<u64>().ok())
        .unwrap_or(0)
}
