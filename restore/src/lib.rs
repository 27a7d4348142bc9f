//! Idempotent restoration of asset bundles onto the filesystem.
//!
//! Two layers:
//!
//! - [`Materializer`] makes one file on disk match a desired content, mode
//!   and modification time, doing the fewest destructive operations it can.
//!   An identical file is left alone (only its mode and time are fixed); a
//!   differing one is truncated and rewritten; a file left read-only by an
//!   earlier run is removed and recreated.
//! - [`Restorer`] walks an [`AssetSource`] from a logical name downward and
//!   materializes every leaf under a target directory. Directories are
//!   created as a side effect of materializing the files inside them.
//!
//! ```ignore
//! use bindata_assets::MemoryAssets;
//!
//! let assets: MemoryAssets = build_bundle();
//! let report = bindata_restore::restore_assets(&assets, "public", "web")?;
//! log::info!("{} files written", report.written());
//! ```
//!
//! All I/O is blocking and single-threaded. Concurrent restores into
//! overlapping paths must be serialized by the caller.

mod error;
mod materialize;
mod options;
mod restore;

pub use bindata_assets::{AssetError, AssetInfo, AssetSource};
pub use error::RestoreError;
pub use materialize::{
    Materialized, Materializer, content_matches, materialize, open_for_rewrite, reconcile_mode,
};
pub use options::{DEFAULT_CHUNK_SIZE, DEFAULT_DIR_MODE, RestoreOptions};
pub use restore::{RestoreReport, Restorer, restore_asset, restore_assets};
