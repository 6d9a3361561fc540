use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use filesdb_utils::fs::read_file_signature;
use tar::{Archive, Entries};
use tracing::trace;

use crate::{
    compression::{Compression, SIGNATURE_LEN},
    error::{ArchiveError, Result},
};

/// Sequential reader over a possibly compressed tar file.
///
/// Members are yielded raw: GNU long-name records and PAX extension headers come
/// through as members of their own instead of being folded into the following entry,
/// so copying every member verbatim reproduces the stream exactly.
pub struct ArchiveReader {
    path: PathBuf,
    compression: Compression,
    archive: Archive<Box<dyn Read>>,
}

impl ArchiveReader {
    /// Opens `path`, detecting its compression from the leading bytes.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let signature = read_file_signature(path, SIGNATURE_LEN)?;
        if signature.is_empty() {
            return Err(ArchiveError::Empty {
                path: path.to_path_buf(),
            });
        }
        let compression = Compression::detect(&signature);
        trace!("{} is {} compressed", path.display(), compression);

        let file = File::open(path).map_err(|source| {
            ArchiveError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let decoder = compression
            .decoder(BufReader::new(file))
            .map_err(|source| {
                ArchiveError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            compression,
            archive: Archive::new(decoder),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Iterator over the raw members, in stream order.
    ///
    /// Each member exposes its header and reads as exactly its payload.
    pub fn entries(&mut self) -> Result<Entries<'_, Box<dyn Read>>> {
        let entries = self.archive.entries().map_err(|source| {
            ArchiveError::Read {
                path: self.path.clone(),
                source,
            }
        })?;
        Ok(entries.raw(true))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn tar_bytes(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, data) in members {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap()
    }

    #[test]
    fn test_open_plain_tar() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("core.files");
        fs::write(&path, tar_bytes(&[("bash-5.2-1/desc", b"%NAME%\nbash\n")])).unwrap();

        let mut reader = ArchiveReader::open(&path).unwrap();
        assert_eq!(reader.compression(), Compression::None);
        assert_eq!(reader.path(), path);

        let mut entries = reader.entries().unwrap();
        let mut entry = entries.next().unwrap().unwrap();
        assert_eq!(entry.path().unwrap().to_str(), Some("bash-5.2-1/desc"));

        let mut data = String::new();
        entry.read_to_string(&mut data).unwrap();
        assert_eq!(data, "%NAME%\nbash\n");

        drop(entry);
        assert!(entries.next().is_none());
    }

    #[test]
    fn test_open_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("core.files");
        fs::write(&path, b"").unwrap();

        assert!(matches!(
            ArchiveReader::open(&path),
            Err(ArchiveError::Empty { .. })
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            ArchiveReader::open(dir.path().join("missing.files")),
            Err(ArchiveError::FileSystem(_))
        ));
    }
}
