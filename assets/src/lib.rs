//! Read-only asset bundles consumed by bindata restoration.
//!
//! A bundle maps logical, forward-slash separated names to file content and
//! file metadata. Names that have descendants are containers and can be
//! listed; every other name is a leaf with content.
//!
//! # Sources
//!
//! - [`MemoryAssets`] — In-memory bundle, typically built from `include_bytes!` data
//! - [`DirectoryAssets`] — Bundle served from a directory on disk (native only)
//!
//! Custom bundles (packed archives, generated tables) implement the
//! [`AssetSource`] trait.
//!
//! # Logical Names
//!
//! Lookups accept both `/` and `\` separators. The [`path`] module maps
//! logical names onto real filesystem paths under a target root.

#[cfg(all(feature = "filesystem", not(target_arch = "wasm32")))]
mod directory;
mod error;
mod memory;
pub mod path;
mod source;

#[cfg(all(feature = "filesystem", not(target_arch = "wasm32")))]
pub use directory::DirectoryAssets;
pub use error::AssetError;
pub use memory::MemoryAssets;
pub use source::{AssetInfo, AssetSource};
