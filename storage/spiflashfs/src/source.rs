//! The files to upload.

use std::{
    ffi::{OsStr, OsString},
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

/// Provides the names, lengths and contents of the files to upload.
pub trait FileSource {
    type Reader: io::Read;

    /// All file names, sorted by name.
    fn names(&mut self) -> io::Result<Vec<String>>;

    /// Open a file, returning its length in bytes and a reader positioned at its start.
    fn open(&mut self, name: &str) -> io::Result<(u64, Self::Reader)>;
}

/// The regular files in a single directory, optionally restricted to one extension.
#[derive(Clone, Debug)]
pub struct Directory {
    root: PathBuf,
    extension: Option<OsString>,
}

impl Directory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: None,
        }
    }

    /// Only include files with this extension, e.g. "wav".
    pub fn with_extension(mut self, extension: impl Into<OsString>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_included(&self, path: &Path) -> bool {
        match &self.extension {
            Some(extension) => path.extension() == Some(extension.as_os_str()),
            None => true,
        }
    }
}

impl FileSource for Directory {
    type Reader = File;

    fn names(&mut self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() || !self.is_included(&entry.path()) {
                continue;
            }

            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => warn!("Skipping file with invalid name {:?}", name),
            }
        }

        names.sort();
        Ok(names)
    }

    fn open(&mut self, name: &str) -> io::Result<(u64, File)> {
        let file = File::open(self.root.join(OsStr::new(name)))?;
        let length = file.metadata()?.len();
        Ok((length, file))
    }
}
