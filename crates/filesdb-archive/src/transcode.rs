use std::{
    ffi::OsString,
    fs::{self, File},
    io::{self, BufWriter, Read},
    path::{Path, PathBuf},
};

use filesdb_utils::fs::safe_remove;
use tar::{Builder, EntryType};
use tracing::{debug, trace, warn};

use crate::{
    error::{ArchiveError, Result},
    reader::ArchiveReader,
};

/// Outcome of a successful transcode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TranscodeReport {
    /// Members carrying file content or metadata, excluding PAX and GNU extension records.
    pub entries: usize,
    /// Total payload bytes copied, extension records included.
    pub bytes: u64,
}

/// Sibling path used while rewriting `path`: the same name with `~` appended.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push("~");
    PathBuf::from(name)
}

/// Rewrites the archive at `path` as an uncompressed tar stream.
///
/// Members are copied in order through [`tar::Builder`], each header unchanged and
/// each payload streamed, into [`temp_path`]. Only a complete copy is renamed over
/// `path`; on any read or write failure the partial copy is removed and `path` is left
/// as it was.
///
/// A failing final rename is reported as [`ArchiveError::Rename`] and the completed
/// temporary copy is left behind.
pub fn transcode_in_place<P: AsRef<Path>>(path: P) -> Result<TranscodeReport> {
    let path = path.as_ref();
    let tmp = temp_path(path);

    let report = match copy_archive(path, &tmp) {
        Ok(report) => report,
        Err(err) => {
            if let Err(rm_err) = safe_remove(&tmp) {
                warn!("{}", rm_err);
            }
            return Err(err);
        }
    };

    fs::rename(&tmp, path).map_err(|source| {
        ArchiveError::Rename {
            from: tmp.clone(),
            to: path.to_path_buf(),
            entries: report.entries,
            source,
        }
    })?;

    debug!(
        "rewrote {} ({} entries, {} bytes)",
        path.display(),
        report.entries,
        report.bytes
    );
    Ok(report)
}

/// Counts payload bytes and keeps the first read error apart from write errors.
struct CountingReader<R> {
    inner: R,
    count: u64,
    error: Option<io::Error>,
}

impl<R: Read> CountingReader<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            count: 0,
            error: None,
        }
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.read(buf) {
            Ok(n) => {
                self.count += n as u64;
                Ok(n)
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => Err(err),
            Err(err) => {
                let kind = err.kind();
                self.error = Some(err);
                Err(io::Error::new(kind, "source archive read failed"))
            }
        }
    }
}

fn copy_archive(src: &Path, dest: &Path) -> Result<TranscodeReport> {
    let mut reader = ArchiveReader::open(src)?;

    let write_err = |source: io::Error| {
        ArchiveError::Write {
            path: dest.to_path_buf(),
            source,
        }
    };
    let read_err = |source: io::Error| {
        ArchiveError::Read {
            path: src.to_path_buf(),
            source,
        }
    };

    let file = File::create(dest).map_err(write_err)?;
    let mut builder = Builder::new(BufWriter::new(file));
    let mut report = TranscodeReport::default();

    for entry in reader.entries()? {
        let entry = entry.map_err(read_err)?;
        let header = entry.header().clone();
        trace!("copying {}", String::from_utf8_lossy(&entry.path_bytes()));

        let size = header.entry_size().map_err(read_err)?;
        let mut payload = CountingReader::new(entry);
        let appended = builder.append(&header, &mut payload);

        if let Some(err) = payload.error.take() {
            return Err(read_err(err));
        }
        appended.map_err(write_err)?;

        if payload.count != size {
            return Err(read_err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("entry truncated after {} of {size} bytes", payload.count),
            )));
        }
        report.bytes += payload.count;

        if !is_extension(header.entry_type()) {
            report.entries += 1;
        }
    }

    builder
        .into_inner()
        .and_then(|w| w.into_inner().map_err(|err| err.into_error()))
        .and_then(|file| file.sync_all())
        .map_err(write_err)?;

    Ok(report)
}

fn is_extension(entry_type: EntryType) -> bool {
    matches!(
        entry_type,
        EntryType::XHeader
            | EntryType::XGlobalHeader
            | EntryType::GNULongName
            | EntryType::GNULongLink
    )
}
