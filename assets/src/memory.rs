use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::time::SystemTime;

use crate::error::AssetError;
use crate::path::lookup_key;
use crate::source::{AssetInfo, AssetSource};

struct Entry {
    data: Cow<'static, [u8]>,
    info: AssetInfo,
}

/// In-memory asset bundle for embedded assets and tests.
///
/// Directories are implicit — a name is a container whenever a stored
/// asset lives beneath it. Children are always listed in sorted order.
///
/// # Example
///
/// ```ignore
/// let mut assets = MemoryAssets::new();
/// assets.insert("web/index.html", include_bytes!("index.html").as_slice(), 0o644, built_at);
/// assets.insert("web/css/site.css", include_bytes!("site.css").as_slice(), 0o644, built_at);
///
/// bindata_restore::restore_assets(&assets, "public", "web")?;
/// ```
#[derive(Default)]
pub struct MemoryAssets {
    entries: BTreeMap<String, Entry>,
}

impl MemoryAssets {
    /// Create an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a leaf asset.
    ///
    /// The name may use either separator. Overwrites any existing asset
    /// with the same name.
    pub fn insert(
        &mut self,
        name: &str,
        data: impl Into<Cow<'static, [u8]>>,
        mode: u32,
        modified: SystemTime,
    ) -> &mut Self {
        let key = lookup_key(name);
        let data = data.into();
        let info = AssetInfo::file(key.clone(), data.len() as u64, mode, modified);
        self.entries.insert(key, Entry { data, info });
        self
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_asset(
        mut self,
        name: &str,
        data: impl Into<Cow<'static, [u8]>>,
        mode: u32,
        modified: SystemTime,
    ) -> Self {
        self.insert(name, data, mode, modified);
        self
    }

    /// Remove an asset, returning its content if it existed.
    pub fn remove(&mut self, name: &str) -> Option<Cow<'static, [u8]>> {
        self.entries.remove(&lookup_key(name)).map(|entry| entry.data)
    }

    /// Number of leaf assets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bundle holds no assets.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AssetSource for MemoryAssets {
    fn asset(&self, name: &str) -> Result<Cow<'_, [u8]>, AssetError> {
        let key = lookup_key(name);
        self.entries
            .get(&key)
            .map(|entry| Cow::Borrowed(entry.data.as_ref()))
            .ok_or(AssetError::NotFound(key))
    }

    fn asset_info(&self, name: &str) -> Result<AssetInfo, AssetError> {
        let key = lookup_key(name);
        self.entries
            .get(&key)
            .map(|entry| entry.info.clone())
            .ok_or(AssetError::NotFound(key))
    }

    fn asset_dir(&self, name: &str) -> Result<Vec<String>, AssetError> {
        let key = lookup_key(name);
        let prefix = if key.is_empty() {
            String::new()
        } else {
            format!("{key}/")
        };

        let mut children = BTreeSet::new();
        for stored in self.entries.keys() {
            if let Some(rest) = stored.strip_prefix(&prefix) {
                // Immediate child is the first segment of the remainder
                let child = match rest.find('/') {
                    Some(pos) => &rest[..pos],
                    None => rest,
                };
                if !child.is_empty() {
                    children.insert(child.to_owned());
                }
            }
        }

        if children.is_empty() && !key.is_empty() {
            return Err(if self.entries.contains_key(&key) {
                AssetError::NotADirectory(key)
            } else {
                AssetError::NotFound(key)
            });
        }

        Ok(children.into_iter().collect())
    }

    fn asset_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle() -> MemoryAssets {
        let t = SystemTime::UNIX_EPOCH;
        MemoryAssets::new()
            .with_asset("a.txt", b"alpha".as_slice(), 0o644, t)
            .with_asset("b/c.txt", b"charlie".as_slice(), 0o600, t)
            .with_asset("b/d/e.txt", b"echo".to_vec(), 0o755, t)
    }

    #[test]
    fn read_existing_asset() {
        let assets = bundle();
        assert_eq!(assets.asset("a.txt").unwrap().as_ref(), b"alpha");
    }

    #[test]
    fn read_with_backslashes() {
        let assets = bundle();
        assert_eq!(assets.asset("b\\d\\e.txt").unwrap().as_ref(), b"echo");
    }

    #[test]
    fn read_missing_asset() {
        let assets = bundle();
        assert!(matches!(assets.asset("nope.txt"), Err(AssetError::NotFound(_))));
    }

    #[test]
    fn read_container_is_not_found() {
        let assets = bundle();
        assert!(matches!(assets.asset("b"), Err(AssetError::NotFound(_))));
    }

    #[test]
    fn info_records_size_and_mode() {
        let assets = bundle();
        let info = assets.asset_info("b/c.txt").unwrap();
        assert_eq!(info.name, "b/c.txt");
        assert_eq!(info.size, 7);
        assert_eq!(info.mode, 0o600);
        assert!(!info.is_dir);
    }

    #[test]
    fn list_root() {
        let assets = bundle();
        assert_eq!(assets.asset_dir("").unwrap(), vec!["a.txt", "b"]);
    }

    #[test]
    fn list_nested() {
        let assets = bundle();
        assert_eq!(assets.asset_dir("b").unwrap(), vec!["c.txt", "d"]);
        assert_eq!(assets.asset_dir("b/d").unwrap(), vec!["e.txt"]);
    }

    #[test]
    fn list_leaf_fails() {
        let assets = bundle();
        assert!(matches!(
            assets.asset_dir("a.txt"),
            Err(AssetError::NotADirectory(_))
        ));
    }

    #[test]
    fn list_unknown_fails() {
        let assets = bundle();
        assert!(matches!(
            assets.asset_dir("nonexistent"),
            Err(AssetError::NotFound(_))
        ));
    }

    #[test]
    fn list_empty_root() {
        let assets = MemoryAssets::new();
        assert!(assets.is_empty());
        assert!(assets.asset_dir("").unwrap().is_empty());
    }

    #[test]
    fn names_are_sorted() {
        let assets = bundle();
        assert_eq!(assets.asset_names(), vec!["a.txt", "b/c.txt", "b/d/e.txt"]);
    }

    #[test]
    fn remove_returns_data() {
        let mut assets = bundle();
        assert_eq!(assets.remove("a.txt").as_deref(), Some(b"alpha".as_slice()));
        assert!(assets.remove("a.txt").is_none());
        assert_eq!(assets.len(), 2);
    }

    #[test]
    fn redundant_segments_stay_reachable() {
        let t = SystemTime::UNIX_EPOCH;
        let assets = MemoryAssets::new()
            .with_asset("web//index.html", b"<html/>".as_slice(), 0o644, t)
            .with_asset("web/ok.txt", b"ok".as_slice(), 0o644, t)
            .with_asset("a/./b.txt", b"bee".as_slice(), 0o644, t);

        assert_eq!(assets.asset_dir("web").unwrap(), vec!["index.html", "ok.txt"]);
        assert_eq!(assets.asset_dir("a").unwrap(), vec!["b.txt"]);
        assert_eq!(assets.asset("web/index.html").unwrap().as_ref(), b"<html/>");
        assert_eq!(assets.asset("a//b.txt").unwrap().as_ref(), b"bee");
        assert_eq!(assets.asset_info("a/b.txt").unwrap().name, "a/b.txt");
        assert_eq!(assets.asset_names(), vec!["a/b.txt", "web/index.html", "web/ok.txt"]);

        let mut assets = assets;
        assert!(assets.remove("web/./index.html").is_some());
        assert_eq!(assets.asset_dir("web").unwrap(), vec!["ok.txt"]);
    }

    #[test]
    #[should_panic(expected = "cannot be loaded")]
    fn must_asset_panics_on_missing() {
        bundle().must_asset("missing.txt");
    }
}
