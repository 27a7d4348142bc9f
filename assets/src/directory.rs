use std::borrow::Cow;
use std::fs::Metadata;
use std::path::PathBuf;

use crate::error::AssetError;
use crate::path::{self, lookup_key};
use crate::source::{AssetInfo, AssetSource};

/// Asset bundle served from a directory on disk.
///
/// This is the development counterpart of an embedded bundle: the same
/// logical names resolve to the source files themselves, so edits show up
/// without rebuilding. Content, mode and modification time are read from
/// the file on every lookup.
///
/// Names containing `..` are rejected before they reach the filesystem.
///
/// # Example
///
/// ```ignore
/// let assets = DirectoryAssets::new("./static");
///
/// // Reads ./static/css/site.css
/// let css = assets.asset("css/site.css")?;
/// ```
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    /// Create a bundle rooted at the given directory.
    ///
    /// The directory does not need to exist yet — it will be checked
    /// at lookup time.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a logical name to a full filesystem path.
    fn resolve(&self, name: &str) -> Result<PathBuf, AssetError> {
        if lookup_key(name).is_empty() {
            return Ok(self.root.clone());
        }
        path::resolve_path_checked(&self.root, name)
    }

    fn metadata(&self, name: &str) -> Result<(PathBuf, Metadata), AssetError> {
        let full_path = self.resolve(name)?;
        let metadata = std::fs::metadata(&full_path).map_err(|e| lookup_error(name, e))?;
        Ok((full_path, metadata))
    }
}

impl AssetSource for DirectoryAssets {
    fn asset(&self, name: &str) -> Result<Cow<'_, [u8]>, AssetError> {
        let (full_path, metadata) = self.metadata(name)?;
        if metadata.is_dir() {
            return Err(AssetError::NotFound(lookup_key(name)));
        }
        let data = std::fs::read(full_path).map_err(|e| lookup_error(name, e))?;
        Ok(Cow::Owned(data))
    }

    fn asset_info(&self, name: &str) -> Result<AssetInfo, AssetError> {
        let (_, metadata) = self.metadata(name)?;
        Ok(AssetInfo {
            name: lookup_key(name),
            size: metadata.len(),
            mode: permission_bits(&metadata),
            modified: metadata.modified().map_err(|e| lookup_error(name, e))?,
            is_dir: metadata.is_dir(),
        })
    }

    fn asset_dir(&self, name: &str) -> Result<Vec<String>, AssetError> {
        let (full_path, metadata) = self.metadata(name)?;
        if !metadata.is_dir() {
            return Err(AssetError::NotADirectory(lookup_key(name)));
        }

        let mut entries = Vec::new();
        let listing = std::fs::read_dir(full_path).map_err(|e| lookup_error(name, e))?;
        for entry in listing {
            let entry = entry.map_err(|e| lookup_error(name, e))?;
            match entry.file_name().into_string() {
                Ok(child) => entries.push(child),
                Err(raw) => log::debug!("Skipping non UTF-8 asset name {raw:?}"),
            }
        }
        entries.sort();
        Ok(entries)
    }

    fn asset_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut pending = vec![String::new()];

        while let Some(dir) = pending.pop() {
            let children = match self.asset_dir(&dir) {
                Ok(children) => children,
                Err(e) => {
                    log::warn!("Cannot list asset directory {dir:?}: {e}");
                    continue;
                }
            };
            for child in children {
                let name = path::join_name(&dir, &child);
                match self.metadata(&name) {
                    Ok((_, metadata)) if metadata.is_dir() => pending.push(name),
                    Ok(_) => names.push(name),
                    Err(e) => log::warn!("Cannot stat asset {name:?}: {e}"),
                }
            }
        }

        names.sort();
        names
    }
}

fn lookup_error(name: &str, err: std::io::Error) -> AssetError {
    if err.kind() == std::io::ErrorKind::NotFound {
        AssetError::NotFound(lookup_key(name))
    } else {
        AssetError::Io(err)
    }
}

#[cfg(unix)]
fn permission_bits(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o666
    }
}
