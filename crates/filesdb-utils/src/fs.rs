use std::{
    fs::{self, File},
    io::Read,
    path::Path,
};

use nix::unistd::{access, AccessFlags};

use crate::error::{FileSystemError, FileSystemResult};

/// Removes the specified file or directory safely.
///
/// If the path does not exist, this function returns `Ok(())` without error. Directories are
/// removed recursively, files with [`std::fs::remove_file`].
///
/// # Errors
///
/// Returns [`FileSystemError::Directory`] or [`FileSystemError::File`] if the removal
/// fails for any reason other than the path not existing.
pub fn safe_remove<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    let path = path.as_ref();

    let is_dir = path.is_dir();
    let result = if is_dir {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) if is_dir => {
            Err(FileSystemError::Directory {
                path: path.to_path_buf(),
                action: "remove",
                source,
            })
        }
        Err(source) => {
            Err(FileSystemError::File {
                path: path.to_path_buf(),
                action: "remove",
                source,
            })
        }
    }
}

/// Checks that the calling process may create files inside `path`.
///
/// Uses `access(2)` with `W_OK`, so the answer reflects the real uid/gid of the
/// process, not just the permission bits.
///
/// # Errors
///
/// * [`FileSystemError::NotADirectory`] if the path exists but is not a directory.
/// * [`FileSystemError::NotWritable`] if the directory is missing or not writable.
pub fn ensure_writable_dir<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    let path = path.as_ref();

    if path.exists() && !path.is_dir() {
        return Err(FileSystemError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    access(path, AccessFlags::W_OK).map_err(|err| {
        FileSystemError::NotWritable {
            path: path.to_path_buf(),
            source: err,
        }
    })
}

/// Reads the first `bytes` bytes of a file.
///
/// Shorter files yield fewer bytes; the result is never padded.
pub fn read_file_signature<P: AsRef<Path>>(path: P, bytes: usize) -> FileSystemResult<Vec<u8>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| {
        FileSystemError::File {
            path: path.to_path_buf(),
            action: "open",
            source: err,
        }
    })?;

    let mut buffer = Vec::with_capacity(bytes);
    file.take(bytes as u64)
        .read_to_end(&mut buffer)
        .map_err(|err| {
            FileSystemError::File {
                path: path.to_path_buf(),
                action: "read",
                source: err,
            }
        })?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_safe_remove_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("core.files");
        fs::write(&file_path, "hello").unwrap();
        safe_remove(&file_path).unwrap();
        assert!(!file_path.exists());
    }

    #[test]
    fn test_safe_remove_dir() {
        let dir = tempdir().unwrap();
        let sub_dir = dir.path().join("sub");
        fs::create_dir(&sub_dir).unwrap();
        fs::write(sub_dir.join("file"), "x").unwrap();
        safe_remove(&sub_dir).unwrap();
        assert!(!sub_dir.exists());
    }

    #[test]
    fn test_safe_remove_non_existent() {
        let dir = tempdir().unwrap();
        safe_remove(dir.path().join("non_existent.files")).unwrap();
    }

    #[test]
    fn test_ensure_writable_dir() {
        let dir = tempdir().unwrap();
        ensure_writable_dir(dir.path()).unwrap();
    }

    #[test]
    fn test_ensure_writable_dir_missing() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert!(matches!(
            ensure_writable_dir(&missing),
            Err(FileSystemError::NotWritable { .. })
        ));
    }

    #[test]
    fn test_ensure_writable_dir_on_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("file.txt");
        fs::write(&file_path, "hello").unwrap();
        assert!(matches!(
            ensure_writable_dir(&file_path),
            Err(FileSystemError::NotADirectory { .. })
        ));
    }

    #[test]
    fn test_read_file_signature() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("sig");
        fs::write(&file_path, [0x1f, 0x8b, 0x08, 0x00, 0xff]).unwrap();
        assert_eq!(
            read_file_signature(&file_path, 4).unwrap(),
            vec![0x1f, 0x8b, 0x08, 0x00]
        );

        fs::write(&file_path, [0x1f]).unwrap();
        assert_eq!(read_file_signature(&file_path, 4).unwrap(), vec![0x1f]);
    }
}
