use std::borrow::Cow;
use std::time::SystemTime;

use crate::AssetError;

/// File metadata recorded for an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInfo {
    /// Logical name of the asset.
    pub name: String,
    /// Content length in bytes.
    pub size: u64,
    /// Permission bits (e.g. `0o644`).
    pub mode: u32,
    /// Modification time to restore onto disk.
    pub modified: SystemTime,
    /// Whether this entry is a container rather than a leaf.
    pub is_dir: bool,
}

impl AssetInfo {
    /// Metadata for a leaf asset.
    pub fn file(name: impl Into<String>, size: u64, mode: u32, modified: SystemTime) -> Self {
        Self {
            name: name.into(),
            size,
            mode,
            modified,
            is_dir: false,
        }
    }
}

/// Read-only lookup into an asset bundle.
///
/// # Containers and Leaves
///
/// A name is a container when [`asset_dir`](AssetSource::asset_dir) can list
/// its children. Any error from `asset_dir` means "not a container": the
/// name is then either a leaf or unknown, and [`asset`](AssetSource::asset)
/// tells the two apart.
///
/// # Name Contract
///
/// Names use `/` as separator. Implementations also accept `\`. The empty
/// name denotes the bundle root.
pub trait AssetSource {
    /// Content of the leaf asset `name`.
    fn asset(&self, name: &str) -> Result<Cow<'_, [u8]>, AssetError>;

    /// Metadata of the leaf asset `name`.
    fn asset_info(&self, name: &str) -> Result<AssetInfo, AssetError>;

    /// Names (not full paths) of the immediate children of `name`.
    ///
    /// Fails for leaves and unknown names.
    fn asset_dir(&self, name: &str) -> Result<Vec<String>, AssetError>;

    /// Full logical names of every leaf in the bundle.
    fn asset_names(&self) -> Vec<String>;

    /// Content of `name`, for bundles whose contents are known at build time.
    ///
    /// # Panics
    ///
    /// Panics if the asset cannot be loaded.
    fn must_asset(&self, name: &str) -> Cow<'_, [u8]> {
        match self.asset(name) {
            Ok(data) => data,
            Err(e) => panic!("asset {name:?} cannot be loaded: {e}"),
        }
    }
}
