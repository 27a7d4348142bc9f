//! Restore options and their TOML representation.

use std::path::Path;

use serde::Deserialize;

use crate::RestoreError;

/// Mode for directories created on the way to a restored file.
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Buffer size used when comparing an existing file against new content.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Tunables for [`Materializer`](crate::Materializer) and
/// [`Restorer`](crate::Restorer).
///
/// Every field has a default, so an options file only lists what it
/// changes:
///
/// ```toml
/// dir_mode = 0o700
/// reject_traversal = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RestoreOptions {
    dir_mode: u32,
    chunk_size: usize,
    recover_permission_denied: bool,
    reject_traversal: bool,
    sync: bool,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        Self {
            dir_mode: DEFAULT_DIR_MODE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            recover_permission_denied: true,
            reject_traversal: false,
            sync: true,
        }
    }
}

impl RestoreOptions {
    /// Load options from a TOML file.
    pub fn load(path: &Path) -> Result<Self, RestoreError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RestoreError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&content).map_err(|e| match e {
            RestoreError::Config(msg) => RestoreError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Parse options from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, RestoreError> {
        let options: Self = toml::from_str(content)
            .map_err(|e| RestoreError::Config(format!("failed to parse options: {e}")))?;
        if options.chunk_size == 0 {
            return Err(RestoreError::Config("chunk_size must be non-zero".into()));
        }
        Ok(options)
    }

    /// Mode for created parent directories.
    pub fn dir_mode(&self) -> u32 {
        self.dir_mode
    }

    /// Comparison buffer size in bytes.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Whether a permission-denied rewrite may remove and recreate the file.
    pub fn recover_permission_denied(&self) -> bool {
        self.recover_permission_denied
    }

    /// Whether asset names containing `..` are refused.
    pub fn reject_traversal(&self) -> bool {
        self.reject_traversal
    }

    /// Whether written files are flushed to storage before returning.
    pub fn sync(&self) -> bool {
        self.sync
    }

    /// Set the mode for created parent directories.
    pub fn with_dir_mode(mut self, mode: u32) -> Self {
        self.dir_mode = mode;
        self
    }

    /// Set the comparison buffer size. Zero is raised to one byte.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Allow or forbid remove-and-recreate on permission-denied rewrites.
    pub fn with_recover_permission_denied(mut self, recover: bool) -> Self {
        self.recover_permission_denied = recover;
        self
    }

    /// Refuse asset names that could escape the target directory.
    pub fn with_reject_traversal(mut self, reject: bool) -> Self {
        self.reject_traversal = reject;
        self
    }

    /// Enable or disable the flush to storage after each write.
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = RestoreOptions::default();
        assert_eq!(options.dir_mode(), 0o755);
        assert_eq!(options.chunk_size(), 65536);
        assert!(options.recover_permission_denied());
        assert!(!options.reject_traversal());
        assert!(options.sync());
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(
            RestoreOptions::from_toml_str("").unwrap(),
            RestoreOptions::default()
        );
    }

    #[test]
    fn partial_toml_overrides() {
        let options = RestoreOptions::from_toml_str(
            "dir_mode = 0o700\nreject_traversal = true\nchunk_size = 4096\n",
        )
        .unwrap();
        assert_eq!(options.dir_mode(), 0o700);
        assert_eq!(options.chunk_size(), 4096);
        assert!(options.reject_traversal());
        assert!(options.recover_permission_denied());
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let err = RestoreOptions::from_toml_str("chunk_size = 0").unwrap_err();
        assert!(matches!(err, RestoreError::Config(_)));
    }

    #[test]
    fn unknown_field_rejected() {
        assert!(RestoreOptions::from_toml_str("dirmode = 0o700").is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("restore.toml");
        std::fs::write(&path, "sync = false\n").unwrap();

        let options = RestoreOptions::load(&path).unwrap();
        assert!(!options.sync());
    }

    #[test]
    fn load_missing_file() {
        let err = RestoreOptions::load(Path::new("/nonexistent/restore.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn builder_clamps_chunk_size() {
        let options = RestoreOptions::default().with_chunk_size(0);
        assert_eq!(options.chunk_size(), 1);
    }
}
