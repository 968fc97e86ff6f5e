/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Atomic file output.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::trace;

use crate::errors::PixlError;

/// Write `data` to `path` through a temporary sibling file and an
/// atomic rename.
///
/// A failed or interrupted write never leaves a partial file at
/// `path`: either the old contents survive or the new contents land
/// whole. The temporary file is removed on every failure path.
pub fn save_atomic<P: AsRef<Path>>(path: P, data: &[u8]) -> Result<(), PixlError> {
    let path = path.as_ref();
    let tmp = temp_sibling(path);

    // the handle must be closed before the rename
    {
        let mut file = File::create(&tmp)?;
        if let Err(err) = file.write_all(data).and_then(|()| file.sync_all()) {
            drop(file);
            let _ = fs::remove_file(&tmp);
            return Err(PixlError::Io(err));
        }
    }

    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(PixlError::Io(err));
    }
    trace!("wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}

/// `foo.png` becomes `foo.png.pixl-tmp`, staying on the same
/// filesystem so the rename is atomic.
fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".pixl-tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("pixl-fs-test-{}-{name}", std::process::id()));
        path
    }

    #[test]
    fn writes_and_replaces() {
        let path = scratch_path("replace");
        save_atomic(&path, b"first").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"first");

        save_atomic(&path, b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn leaves_no_temp_file_behind() {
        let path = scratch_path("clean");
        save_atomic(&path, b"data").unwrap();
        assert!(!temp_sibling(&path).exists());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let mut path = scratch_path("missing");
        path.push("nested/file.bin");
        assert!(matches!(
            save_atomic(&path, b"data"),
            Err(crate::errors::PixlError::Io(_))
        ));
    }
}
