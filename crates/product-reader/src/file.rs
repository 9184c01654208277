//! Opening product files and resolving dataset paths.

use std::path::{Path, PathBuf};
use std::sync::Once;

use tracing::debug;

use crate::error::{ReadError, ReadResult};
use crate::format::{detect_format, FileFormat};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose diagnostics to stderr even when errors
/// are handled gracefully by the Rust code (e.g. when probing for optional
/// attributes). This disables that output by calling H5Eset_auto2 with null
/// handlers. Safe to call multiple times; only the first call does work.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and null handlers are a
        // documented way to disable automatic error reporting.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// An open product input file.
///
/// Wraps a `netcdf::File` with the detected container format and the
/// group-path resolution needed for HDF-EOS5 datasets like
/// `/HDFEOS/SWATHS/O3/Data Fields/O3`.
pub struct ScienceFile {
    inner: netcdf::File,
    format: FileFormat,
    path: PathBuf,
}

impl ScienceFile {
    /// Detect the format and open the file.
    pub fn open(path: &Path) -> ReadResult<Self> {
        silence_hdf5_errors();

        let format = detect_format(path)?;
        debug!(path = %path.display(), %format, "Opening product file");

        let inner = netcdf::open(path).map_err(|e| {
            let mut message = e.to_string();
            if format == FileFormat::Hdf4 {
                // The most common cause: libnetcdf built without --enable-hdf4
                message.push_str(" (reading HDF4 requires an HDF4-enabled libnetcdf)");
            }
            ReadError::Open {
                path: path.display().to_string(),
                message,
            }
        })?;

        Ok(Self {
            inner,
            format,
            path: path.to_path_buf(),
        })
    }

    /// Detected container format.
    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a `/`-separated dataset path and run `f` on the variable.
    ///
    /// Flat names look up in the root group; qualified paths walk the
    /// intermediate groups first. Path segments may contain spaces
    /// (HDF-EOS5 uses group names like `Data Fields`). The callback shape
    /// keeps the intermediate `Group` handles alive for the duration of
    /// the access, which their borrows require.
    pub fn with_variable<T>(
        &self,
        path: &str,
        f: impl FnOnce(&netcdf::Variable) -> T,
    ) -> Option<T> {
        let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        let (name, groups) = parts.split_last()?;
        lookup(&Node::File(&self.inner), groups, name, f)
    }

    /// True if the dataset path resolves to a variable.
    pub fn has_variable(&self, path: &str) -> bool {
        self.with_variable(path, |_| ()).is_some()
    }
}

/// A traversal point: the file root or a nested group.
enum Node<'a> {
    File(&'a netcdf::File),
    Group(netcdf::Group<'a>),
}

impl<'a> Node<'a> {
    fn variable(&self, name: &str) -> Option<netcdf::Variable<'_>> {
        match self {
            Node::File(file) => file.variable(name),
            Node::Group(group) => group.variable(name),
        }
    }

    fn child(&self, name: &str) -> Option<netcdf::Group<'_>> {
        match self {
            Node::File(file) => file.group(name).ok().flatten(),
            Node::Group(group) => group.group(name).ok().flatten(),
        }
    }
}

/// Recursive descent; each frame keeps its group handle alive while the
/// deeper frames borrow from it.
fn lookup<T>(
    node: &Node<'_>,
    groups: &[&str],
    name: &str,
    f: impl FnOnce(&netcdf::Variable) -> T,
) -> Option<T> {
    match groups.split_first() {
        None => node.variable(name).map(|v| f(&v)),
        Some((head, rest)) => {
            let child = Node::Group(node.child(head)?);
            lookup(&child, rest, name, f)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_rejects_unknown_format() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write;
        tmp.write_all(b"not a science file at all").unwrap();
        tmp.flush().unwrap();

        assert!(matches!(
            ScienceFile::open(tmp.path()),
            Err(ReadError::UnknownFormat(_))
        ));
    }
}
