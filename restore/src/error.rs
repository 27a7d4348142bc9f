use std::io;
use std::path::PathBuf;

use bindata_assets::AssetError;
use thiserror::Error;

/// Errors returned while restoring assets onto disk.
#[derive(Error, Debug)]
pub enum RestoreError {
    #[error("asset lookup failed: {0}")]
    Asset(#[from] AssetError),

    #[error("failed to {op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        source: io::Error,
    },

    #[error("invalid restore options: {0}")]
    Config(String),
}

impl RestoreError {
    /// Kind of the underlying filesystem error, if this is one.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

/// Attach the failed operation and path to an IO error.
pub(crate) fn io_error(
    op: &'static str,
    path: impl Into<PathBuf>,
) -> impl FnOnce(io::Error) -> RestoreError {
    let path = path.into();
    move |source| RestoreError::Io { op, path, source }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = io_error("create", "/tmp/out/a.txt")(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.to_string(), "failed to create /tmp/out/a.txt: denied");
        assert_eq!(err.io_kind(), Some(io::ErrorKind::PermissionDenied));
    }

    #[test]
    fn asset_error_display() {
        let err = RestoreError::from(AssetError::NotFound("x.txt".into()));
        assert_eq!(err.to_string(), "asset lookup failed: no asset named \"x.txt\" in bundle");
        assert_eq!(err.io_kind(), None);
    }
}
