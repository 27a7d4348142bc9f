//! Making one file on disk match a desired content, mode and time.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::SystemTime;

use filetime::FileTime;

use crate::error::io_error;
use crate::{DEFAULT_CHUNK_SIZE, RestoreError, RestoreOptions};

/// Which path [`Materializer::materialize`] took to bring a file up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialized {
    /// The file did not exist and was created.
    Created,
    /// The content already matched; only mode and time were reconciled.
    Unchanged,
    /// The content differed and was truncated and rewritten in place.
    Rewritten,
    /// Rewriting was denied, so the file was removed and created again.
    Recreated,
}

/// Writes single files idempotently.
///
/// Stateless apart from its [`RestoreOptions`]; one instance can be reused
/// for any number of paths.
#[derive(Debug, Clone, Default)]
pub struct Materializer {
    options: RestoreOptions,
}

impl Materializer {
    pub fn new(options: RestoreOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RestoreOptions {
        &self.options
    }

    /// Ensure `target` holds exactly `content` with permission bits `mode`
    /// and modification time `modified`.
    ///
    /// Missing parent directories are created first. The file is then
    /// created exclusively; if it already exists its content is compared
    /// byte for byte, and only a mismatch leads to a rewrite.
    ///
    /// A failure part way through leaves `target` in an unspecified state.
    pub fn materialize(
        &self,
        target: &Path,
        content: &[u8],
        mode: u32,
        modified: SystemTime,
    ) -> Result<Materialized, RestoreError> {
        if let Some(parent) = target.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dir_all(parent, self.options.dir_mode())
                .map_err(io_error("create directory", parent))?;
        }

        let outcome = match create_new(target, mode) {
            Ok(file) => {
                self.write_content(file, target, content)?;
                log::debug!("Created {}", target.display());
                Materialized::Created
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                if compare_chunked(target, content, self.options.chunk_size()) {
                    reconcile_mode(target, mode).map_err(io_error("change mode of", target))?;
                    set_mod_time(target, modified)?;
                    log::debug!("Unchanged {}", target.display());
                    return Ok(Materialized::Unchanged);
                }

                let (file, recreated) =
                    open_truncating(target, mode, self.options.recover_permission_denied())
                        .map_err(io_error("open for rewrite", target))?;
                self.write_content(file, target, content)?;
                if recreated {
                    log::debug!("Recreated {}", target.display());
                    Materialized::Recreated
                } else {
                    log::debug!("Rewrote {}", target.display());
                    Materialized::Rewritten
                }
            }
            Err(e) => return Err(io_error("create", target)(e)),
        };

        // Creation is subject to the umask and a truncating open keeps the old mode.
        reconcile_mode(target, mode).map_err(io_error("change mode of", target))?;
        set_mod_time(target, modified)?;
        Ok(outcome)
    }

    fn write_content(
        &self,
        mut file: File,
        target: &Path,
        content: &[u8],
    ) -> Result<(), RestoreError> {
        file.write_all(content).map_err(io_error("write", target))?;
        if self.options.sync() {
            file.sync_all().map_err(io_error("sync", target))?;
        }
        Ok(())
    }
}

/// Materialize a file with default options.
///
/// See [`Materializer::materialize`].
pub fn materialize(
    target: impl AsRef<Path>,
    content: &[u8],
    mode: u32,
    modified: SystemTime,
) -> Result<Materialized, RestoreError> {
    Materializer::default().materialize(target.as_ref(), content, mode, modified)
}

/// Whether the file at `path` holds exactly `content`.
///
/// Any failure to open, stat or read the file counts as a mismatch, so the
/// caller goes on to rewrite it. A size mismatch is detected without
/// reading. Otherwise the file is streamed through one fixed-size buffer.
pub fn content_matches(path: impl AsRef<Path>, content: &[u8]) -> bool {
    compare_chunked(path.as_ref(), content, DEFAULT_CHUNK_SIZE)
}

fn compare_chunked(path: &Path, content: &[u8], chunk_size: usize) -> bool {
    let Ok(mut file) = File::open(path) else {
        return false;
    };
    let Ok(metadata) = file.metadata() else {
        return false;
    };
    if metadata.len() != content.len() as u64 {
        return false;
    }

    let mut buf = vec![0u8; chunk_size.clamp(1, content.len().max(1))];
    let mut offset = 0;
    loop {
        let n = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) => return false,
        };
        let end = offset + n;
        if end > content.len() || buf[..n] != content[offset..end] {
            return false;
        }
        offset = end;
    }
    offset == content.len()
}

/// Open `path` for a truncating rewrite, creating it with `mode` if absent.
///
/// When the open is refused with `PermissionDenied` and
/// `allow_remove_retry` is set, the file is removed and the open is tried
/// once more without retry.
pub fn open_for_rewrite(
    path: impl AsRef<Path>,
    mode: u32,
    allow_remove_retry: bool,
) -> io::Result<File> {
    open_truncating(path.as_ref(), mode, allow_remove_retry).map(|(file, _)| file)
}

/// Returns the handle and whether the file had to be removed first.
fn open_truncating(path: &Path, mode: u32, allow_remove_retry: bool) -> io::Result<(File, bool)> {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create(true).truncate(true);
    set_create_mode(&mut options, mode);

    open_truncating_with(path, allow_remove_retry, |path| options.open(path))
}

/// Remove-and-retry around `open`, which is attempted at most twice.
fn open_truncating_with(
    path: &Path,
    allow_remove_retry: bool,
    mut open: impl FnMut(&Path) -> io::Result<File>,
) -> io::Result<(File, bool)> {
    match open(path) {
        Ok(file) => Ok((file, false)),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied && allow_remove_retry => {
            log::warn!(
                "Permission denied rewriting {}, removing and recreating it",
                path.display()
            );
            std::fs::remove_file(path)?;
            open(path).map(|file| (file, true))
        }
        Err(e) => Err(e),
    }
}

fn create_new(path: &Path, mode: u32) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create_new(true);
    set_create_mode(&mut options, mode);
    options.open(path)
}

/// Set the permission bits of `path` to `mode` unless they already match.
///
/// A failed stat still attempts the change so that the real error
/// surfaces from it.
#[cfg(unix)]
pub fn reconcile_mode(path: impl AsRef<Path>, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let path = path.as_ref();
    let mode = mode & 0o7777;
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.permissions().mode() & 0o7777 == mode => Ok(()),
        _ => std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)),
    }
}

/// Set the read-only flag of `path` from `mode` unless it already matches.
///
/// Only the absence of every write bit is representable here.
#[cfg(not(unix))]
pub fn reconcile_mode(path: impl AsRef<Path>, mode: u32) -> io::Result<()> {
    let path = path.as_ref();
    let readonly = mode & 0o222 == 0;
    let metadata = std::fs::metadata(path)?;
    let mut permissions = metadata.permissions();
    if permissions.readonly() == readonly {
        return Ok(());
    }
    permissions.set_readonly(readonly);
    std::fs::set_permissions(path, permissions)
}

fn set_mod_time(path: &Path, modified: SystemTime) -> Result<(), RestoreError> {
    let time = FileTime::from_system_time(modified);
    filetime::set_file_times(path, time, time).map_err(io_error("set modification time of", path))
}

#[cfg(unix)]
fn set_create_mode(options: &mut OpenOptions, mode: u32) {
    use std::os::unix::fs::OpenOptionsExt;
    options.mode(mode & 0o7777);
}

#[cfg(not(unix))]
fn set_create_mode(_options: &mut OpenOptions, _mode: u32) {}

#[cfg(unix)]
fn create_dir_all(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new().recursive(true).mode(mode).create(path)
}

#[cfg(not(unix))]
fn create_dir_all(path: &Path, _mode: u32) -> io::Result<()> {
    std::fs::create_dir_all(path)
}
