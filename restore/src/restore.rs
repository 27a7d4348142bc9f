use std::path::{Path, PathBuf};

use bindata_assets::{AssetSource, path};

use crate::{Materialized, Materializer, RestoreError, RestoreOptions};

/// Tally of what a [`Restorer::restore_assets`] walk did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub created: usize,
    pub unchanged: usize,
    pub rewritten: usize,
    pub recreated: usize,
}

impl RestoreReport {
    fn record(&mut self, outcome: Materialized) {
        match outcome {
            Materialized::Created => self.created += 1,
            Materialized::Unchanged => self.unchanged += 1,
            Materialized::Rewritten => self.rewritten += 1,
            Materialized::Recreated => self.recreated += 1,
        }
    }

    /// Number of leaf assets visited.
    pub fn total(&self) -> usize {
        self.created + self.unchanged + self.rewritten + self.recreated
    }

    /// Number of leaf assets whose content had to be written.
    pub fn written(&self) -> usize {
        self.created + self.rewritten + self.recreated
    }
}

/// Restores assets from a bundle into a directory.
///
/// Logical names map onto paths below the target directory one component
/// at a time, so `web/css/site.css` restored into `public` lands at
/// `public/web/css/site.css`.
pub struct Restorer<'a, S: AssetSource + ?Sized> {
    source: &'a S,
    materializer: Materializer,
}

impl<'a, S: AssetSource + ?Sized> Restorer<'a, S> {
    /// Create a restorer with default options.
    pub fn new(source: &'a S) -> Self {
        Self::with_options(source, RestoreOptions::default())
    }

    pub fn with_options(source: &'a S, options: RestoreOptions) -> Self {
        Self {
            source,
            materializer: Materializer::new(options),
        }
    }

    pub fn options(&self) -> &RestoreOptions {
        self.materializer.options()
    }

    /// Restore the single leaf asset `name` under `dir`.
    ///
    /// Fails if the bundle has no such leaf or if any filesystem step fails.
    pub fn restore_asset(
        &self,
        dir: impl AsRef<Path>,
        name: &str,
    ) -> Result<Materialized, RestoreError> {
        let data = self.source.asset(name)?;
        let info = self.source.asset_info(name)?;
        let target = self.target_path(dir.as_ref(), name)?;
        self.materializer
            .materialize(&target, &data, info.mode, info.modified)
    }

    /// Restore `name` and everything beneath it under `dir`.
    ///
    /// A name the bundle cannot list is treated as a leaf and restored as by
    /// [`restore_asset`](Self::restore_asset). Children are visited depth
    /// first in the order the bundle lists them. The first error stops the
    /// walk; files restored before it are left in place.
    pub fn restore_assets(
        &self,
        dir: impl AsRef<Path>,
        name: &str,
    ) -> Result<RestoreReport, RestoreError> {
        let dir = dir.as_ref();
        let mut report = RestoreReport::default();
        let mut pending = vec![name.to_owned()];

        while let Some(current) = pending.pop() {
            match self.source.asset_dir(&current) {
                Ok(children) => {
                    // Reversed so the first child is popped first
                    pending.extend(
                        children
                            .iter()
                            .rev()
                            .map(|child| path::join_name(&current, child)),
                    );
                }
                Err(_) => {
                    log::trace!("Restoring asset {current:?}");
                    report.record(self.restore_asset(dir, &current)?);
                }
            }
        }

        log::info!(
            "Restored {:?} into {}: {} created, {} rewritten, {} recreated, {} unchanged",
            name,
            dir.display(),
            report.created,
            report.rewritten,
            report.recreated,
            report.unchanged
        );
        Ok(report)
    }

    fn target_path(&self, dir: &Path, name: &str) -> Result<PathBuf, RestoreError> {
        if self.options().reject_traversal() {
            Ok(path::resolve_path_checked(dir, name)?)
        } else {
            Ok(path::resolve_path(dir, name))
        }
    }
}

/// Restore one leaf asset with default options.
pub fn restore_asset<S: AssetSource + ?Sized>(
    source: &S,
    dir: impl AsRef<Path>,
    name: &str,
) -> Result<Materialized, RestoreError> {
    Restorer::new(source).restore_asset(dir, name)
}

/// Restore an asset or a whole subtree with default options.
pub fn restore_assets<S: AssetSource + ?Sized>(
    source: &S,
    dir: impl AsRef<Path>,
    name: &str,
) -> Result<RestoreReport, RestoreError> {
    Restorer::new(source).restore_assets(dir, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindata_assets::{AssetError, MemoryAssets};
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn bundle() -> MemoryAssets {
        let t = SystemTime::UNIX_EPOCH;
        MemoryAssets::new()
            .with_asset("web/index.html", b"<html></html>".as_slice(), 0o644, t)
            .with_asset("web/css/site.css", b"body {}".as_slice(), 0o644, t)
            .with_asset("readme.txt", b"read me".as_slice(), 0o600, t)
    }

    fn restorer(assets: &MemoryAssets) -> Restorer<'_, MemoryAssets> {
        Restorer::with_options(assets, RestoreOptions::default().with_sync(false))
    }

    #[test]
    fn report_counts() {
        let mut report = RestoreReport::default();
        report.record(Materialized::Created);
        report.record(Materialized::Unchanged);
        report.record(Materialized::Recreated);
        assert_eq!(report.total(), 3);
        assert_eq!(report.written(), 2);
    }

    #[test]
    fn leaf_restores_like_single_asset() {
        let dir = TempDir::new().unwrap();
        let assets = bundle();

        let report = restorer(&assets).restore_assets(dir.path(), "readme.txt").unwrap();

        assert_eq!(report.created, 1);
        assert_eq!(std::fs::read(dir.path().join("readme.txt")).unwrap(), b"read me");
    }

    #[test]
    fn subtree_keeps_its_prefix() {
        let dir = TempDir::new().unwrap();
        let assets = bundle();

        let report = restorer(&assets).restore_assets(dir.path(), "web").unwrap();

        assert_eq!(report.created, 2);
        assert!(dir.path().join("web/index.html").is_file());
        assert!(dir.path().join("web/css/site.css").is_file());
        assert!(!dir.path().join("readme.txt").exists());
    }

    #[test]
    fn root_name_restores_everything() {
        let dir = TempDir::new().unwrap();
        let assets = bundle();

        let report = restorer(&assets).restore_assets(dir.path(), "").unwrap();

        assert_eq!(report.total(), 3);
        assert!(dir.path().join("readme.txt").is_file());
    }

    #[test]
    fn missing_asset_is_lookup_error() {
        let dir = TempDir::new().unwrap();
        let assets = bundle();

        let err = restorer(&assets).restore_asset(dir.path(), "nope.txt").unwrap_err();

        assert!(matches!(err, RestoreError::Asset(AssetError::NotFound(_))));
        assert!(!dir.path().join("nope.txt").exists());
    }

    #[test]
    fn container_is_not_a_single_asset() {
        let dir = TempDir::new().unwrap();
        let assets = bundle();

        assert!(restorer(&assets).restore_asset(dir.path(), "web").is_err());
    }

    #[test]
    fn backslash_names_land_on_same_path() {
        let dir = TempDir::new().unwrap();
        let assets = bundle();

        restorer(&assets)
            .restore_asset(dir.path(), "web\\css\\site.css")
            .unwrap();

        assert_eq!(
            std::fs::read(dir.path().join("web/css/site.css")).unwrap(),
            b"body {}"
        );
    }

    #[test]
    fn traversal_refused_when_configured() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let assets = MemoryAssets::new().with_asset(
            "../escape.txt",
            b"x".as_slice(),
            0o644,
            SystemTime::UNIX_EPOCH,
        );

        let hardened = Restorer::with_options(
            &assets,
            RestoreOptions::default().with_reject_traversal(true),
        );
        let err = hardened.restore_asset(&out, "../escape.txt").unwrap_err();
        assert!(matches!(err, RestoreError::Asset(AssetError::InvalidPath(_))));
        assert!(!dir.path().join("escape.txt").exists());

        restorer(&assets).restore_asset(&out, "../escape.txt").unwrap();
        assert!(dir.path().join("escape.txt").is_file());
    }

    #[test]
    fn works_through_trait_object() {
        let dir = TempDir::new().unwrap();
        let assets = bundle();
        let source: &dyn AssetSource = &assets;

        let report = restore_assets(source, dir.path(), "web").unwrap();

        assert_eq!(report.created, 2);
    }
}
