// ABOUTME: Source file reading for the CLI front end and the import system

use std::fs;
use std::io;
use std::path::Path;

/// Reads a source file as bytes and decodes it lossily. `Ok(None)` means
/// the file does not exist; any other I/O failure is returned as-is and
/// treated as fatal by callers.
pub fn read_source(path: &Path) -> io::Result<Option<String>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}
