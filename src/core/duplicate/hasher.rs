//! Streaming content hash used for duplicate detection.

use crate::error::ScanError;
use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read};
use std::path::Path;
use xxhash_rust::xxh3::Xxh3;

const CHUNK_SIZE: usize = 64 * 1024;

/// 128-bit xxh3 of the file's bytes, as 32 lowercase hex digits
pub fn hash_file(path: &Path) -> Result<String, ScanError> {
    let read_error = |source| ScanError::ReadFile {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(read_error)?;
    hash_reader(BufReader::new(file)).map_err(read_error)
}

/// Stream `reader` to its end through xxh3-128
pub(crate) fn hash_reader(mut reader: impl Read) -> io::Result<String> {
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut hasher = Xxh3::default();

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:032x}", hasher.digest128()))
}
