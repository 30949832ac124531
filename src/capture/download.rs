//! Download trigger - persists a finished artifact under a fixed filename.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::debug;

/// Destination for exported artifacts.
pub trait DownloadSink {
    /// Save `bytes` as `filename`, returning where it ended up.
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf>;
}

/// Saves artifacts into a directory.
///
/// Bytes are written to a temporary `.part` file first and renamed into
/// place, so a partially written file never carries the final name. The
/// temporary file is removed if anything fails.
#[derive(Debug, Clone)]
pub struct FileDownload {
    dir: PathBuf,
}

impl FileDownload {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for FileDownload {
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let name = Path::new(filename);
        if name.file_name() != Some(name.as_os_str()) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Download filename must not contain a path: {filename:?}"),
            ));
        }

        fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(name);
        let part = self.dir.join(format!(".{filename}.part"));

        let written = fs::File::create(&part).and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        });
        let result = written.and_then(|()| fs::rename(&part, &target));
        if result.is_err() {
            let _ = fs::remove_file(&part);
        }
        result?;

        debug!("Saved {} bytes to {}", bytes.len(), target.display());
        Ok(target)
    }
}

/// Keeps artifacts in memory.
#[derive(Debug, Default)]
pub struct MemoryDownload {
    pub files: Vec<(String, Vec<u8>)>,
}

impl DownloadSink for MemoryDownload {
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        self.files.push((filename.to_string(), bytes.to_vec()));
        Ok(PathBuf::from(filename))
    }
}
