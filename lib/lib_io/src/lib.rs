use std::{
    fs::File,
    io::{self, ErrorKind, Read, Write},
    path::{Path, PathBuf},
    str::Utf8Error,
};

use thiserror::Error;

/// Bytes requested from the OS per read call.
pub const READ_CHUNK_SIZE: usize = 2 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("cannot open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("error reading {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("short write to {}", path.display())]
    ShortWrite { path: PathBuf },

    #[error("input file too large: {}", path.display())]
    TooLarge { path: PathBuf },

    #[error("not enough memory to read {}", path.display())]
    OutOfMemory { path: PathBuf },
}

/// Owned file contents with an exact length and a trailing NUL byte.
///
/// The terminator sits one past `len` so text-oriented consumers can treat
/// the buffer as a C-style string; `len` itself never counts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBuffer {
    // Always `len + 1` bytes, with `data[len] == 0`.
    data: Box<[u8]>,
    len: usize,
}

impl FileBuffer {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// File contents without the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// File contents including the trailing NUL.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.data
    }

    /// UTF-8 view of the contents, for text assets.
    pub fn as_str(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(self.as_bytes())
    }
}

/// Reads the whole file at `path` into one contiguous buffer.
///
/// The file size is not known up front: the buffer is topped up ahead of
/// each fixed-size chunk read, then shrunk to the exact size at the end.
pub fn read_file(path: impl AsRef<Path>) -> Result<FileBuffer, FileError> {
    let path = path.as_ref();

    let mut fp = File::open(path).map_err(|source| FileError::Open {
        path: path.to_owned(),
        source,
    })?;

    let mut data: Vec<u8> = Vec::new();
    let mut used: usize = 0;

    loop {
        // One chunk plus the terminator must fit before reading. A wrapped
        // size must fail as too-large, not shrink the allocation request.
        let required = used
            .checked_add(READ_CHUNK_SIZE + 1)
            .ok_or_else(|| FileError::TooLarge {
                path: path.to_owned(),
            })?;

        if required > data.len() {
            data.try_reserve_exact(required - data.len())
                .map_err(|_| FileError::OutOfMemory {
                    path: path.to_owned(),
                })?;
            data.resize(required, 0);
        }

        let n = match fp.read(&mut data[used..used + READ_CHUNK_SIZE]) {
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(FileError::Read {
                    path: path.to_owned(),
                    source,
                });
            }
        };

        if n == 0 {
            break;
        }

        used += n;
    }

    data.truncate(used);
    data.push(0);

    // Shrinks the allocation to exactly `used + 1` bytes.
    let data = data.into_boxed_slice();

    log::debug!("read {used} bytes from {}", path.display());

    Ok(FileBuffer { data, len: used })
}

/// Writes `data` to `path`, replacing any existing file. A short write is
/// fatal for the call; nothing is retried or rolled back.
pub fn write_file(data: &[u8], path: impl AsRef<Path>) -> Result<(), FileError> {
    let path = path.as_ref();

    let mut fp = File::create(path).map_err(|source| FileError::Write {
        path: path.to_owned(),
        source,
    })?;

    fp.write_all(data).map_err(|source| match source.kind() {
        ErrorKind::WriteZero => FileError::ShortWrite {
            path: path.to_owned(),
        },
        _ => FileError::Write {
            path: path.to_owned(),
            source,
        },
    })?;

    log::debug!("wrote {} bytes to {}", data.len(), path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        (dir, path)
    }

    #[test]
    fn empty_file_is_terminator_only() {
        let (_dir, path) = temp_file("empty.bin");
        std::fs::write(&path, b"").unwrap();

        let file = read_file(&path).unwrap();

        assert_eq!(file.len(), 0);
        assert!(file.is_empty());
        assert_eq!(file.as_bytes(), b"");
        assert_eq!(file.as_bytes_with_nul(), &[0]);
    }

    #[test]
    fn write_read_roundtrip() {
        let (_dir, path) = temp_file("blob.bin");
        let data: Vec<u8> = (0..=255u8).cycle().take(70_001).collect();

        write_file(&data, &path).unwrap();
        let file = read_file(&path).unwrap();

        assert_eq!(file.len(), data.len());
        assert_eq!(file.as_bytes(), &data[..]);
        assert_eq!(file.as_bytes_with_nul().last(), Some(&0));
    }

    #[test]
    fn chunk_sized_file_reads_back_exactly() {
        let (_dir, path) = temp_file("chunk.bin");
        let data = vec![0xA7u8; READ_CHUNK_SIZE];

        write_file(&data, &path).unwrap();
        let file = read_file(&path).unwrap();

        assert_eq!(file.len(), READ_CHUNK_SIZE);
        assert_eq!(file.as_bytes(), &data[..]);
        assert_eq!(file.as_bytes_with_nul().len(), READ_CHUNK_SIZE + 1);
    }

    #[test]
    fn multi_chunk_file_reads_back_exactly() {
        let (_dir, path) = temp_file("big.bin");
        let mut data = vec![0x3Cu8; READ_CHUNK_SIZE * 2 + 17];
        data[READ_CHUNK_SIZE] = 0x99;

        write_file(&data, &path).unwrap();
        let file = read_file(&path).unwrap();

        assert_eq!(file.len(), data.len());
        assert_eq!(file.as_bytes(), &data[..]);
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let (_dir, path) = temp_file("missing.bin");

        let err = read_file(&path).unwrap_err();

        assert!(matches!(err, FileError::Open { .. }));
    }

    #[test]
    fn rereading_an_unchanged_file_is_idempotent() {
        let (_dir, path) = temp_file("stable.bin");
        write_file(b"same bytes every time", &path).unwrap();

        let first = read_file(&path).unwrap();
        let second = read_file(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn text_contents_read_as_str() {
        let (_dir, path) = temp_file("level.txt");
        write_file("##..\n..##\n".as_bytes(), &path).unwrap();

        let file = read_file(&path).unwrap();

        assert_eq!(file.as_str().unwrap(), "##..\n..##\n");
    }
}
