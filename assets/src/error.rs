use std::fmt;

/// Errors that can occur while looking up assets in a bundle.
#[derive(Debug)]
pub enum AssetError {
    /// No asset with the given name exists in the bundle.
    NotFound(String),
    /// The name refers to a leaf asset, so it has no children to list.
    NotADirectory(String),
    /// The name is invalid (empty, contains `..`, or other normalization failure).
    InvalidPath(String),
    /// An IO error occurred while reading a disk-backed bundle.
    Io(std::io::Error),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::NotFound(name) => write!(f, "no asset named {name:?} in bundle"),
            AssetError::NotADirectory(name) => {
                write!(f, "{name:?} is a leaf asset and has no children")
            }
            AssetError::InvalidPath(reason) => write!(f, "asset name rejected: {reason}"),
            AssetError::Io(err) => write!(f, "failed to read bundle: {err}"),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let AssetError::Io(err) = self {
            Some(err)
        } else {
            None
        }
    }
}

/// An IO error carries no asset name, so it always becomes [`AssetError::Io`].
/// Lookups that know the name map `NotFound` themselves.
impl From<std::io::Error> for AssetError {
    fn from(err: std::io::Error) -> Self {
        AssetError::Io(err)
    }
}
