//! Dataset location: composing a base directory and a file name into a path.

use crate::error::Error;
use crate::error::Result;
use crate::spreadsheet::SUPPORTED_EXTENSIONS;
use std::fmt;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;

/// A base directory and a file name, composed into a path on demand.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DatasetRef {
    base_dir: PathBuf,
    file_name: PathBuf,
}

impl DatasetRef {
    /// Fails with [`Error::InvalidArgument`] if either part is empty or blank.
    pub fn new(base_dir: impl AsRef<Path>, file_name: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let file_name = file_name.as_ref();
        if is_blank(base_dir) {
            return Err(Error::InvalidArgument("base directory is empty".to_owned()));
        }
        if is_blank(file_name) {
            return Err(Error::InvalidArgument("file name is empty".to_owned()));
        }
        Ok(DatasetRef {
            base_dir: base_dir.to_path_buf(),
            file_name: file_name.to_path_buf(),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn file_name(&self) -> &Path {
        &self.file_name
    }

    /// Joins the parts and normalizes the result lexically: `.` segments are
    /// dropped and `..` cancels the preceding normal segment. The filesystem
    /// is never consulted, so symlinks are not resolved.
    pub fn path(&self) -> PathBuf {
        normalize(&self.base_dir.join(&self.file_name))
    }
}

impl fmt::Display for DatasetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().display())
    }
}

fn is_blank(path: &Path) -> bool {
    path.as_os_str().to_string_lossy().trim().is_empty()
}

fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => (),
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                // `..` at the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => (),
                _ => parts.push(component),
            },
            component => parts.push(component),
        }
    }
    if parts.is_empty() {
        PathBuf::from(".")
    } else {
        parts.iter().collect()
    }
}

/// Lists the workbooks in `dir` with a supported extension, sorted by file name.
pub fn list_workbooks(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::FileNotFound(dir.to_path_buf()));
    }

    let read_error = |source| Error::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    };
    let entries = std::fs::read_dir(dir).map_err(read_error)?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(read_error)?.path();

        if !path.is_file() {
            continue;
        }

        let is_workbook = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| SUPPORTED_EXTENSIONS.iter().any(|supported| ext.eq_ignore_ascii_case(supported)))
            .unwrap_or(false);

        if is_workbook {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!(dir = %dir.display(), count = files.len(), "listed workbooks");
    Ok(files)
}
