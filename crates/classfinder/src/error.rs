//! Error types for type discovery.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the resolver and its package sources.
///
/// Only [`Error::Configuration`] reflects the discovery algorithm itself; the
/// remaining variants come from reading manifests and index files. Stale index
/// entries and unknown namespaces are never errors, they degrade to partial
/// results with a logged diagnostic.
#[derive(Debug, Error)]
pub enum Error {
	/// Neither a precomputed global index nor a directory scanner is available.
	#[error(
		"classfinder requires either a directory scanner (enable the `scanner` feature or supply a \
		 `DirectoryScanner`) or an optimized index (`classfinder dump-index`)"
	)]
	Configuration,

	/// Reading a file or directory failed.
	#[error("failed to read {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// A package manifest could not be parsed.
	#[error("malformed manifest {}: {source}", path.display())]
	Manifest {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	/// A precomputed index blob is corrupt or has an unsupported layout.
	#[error("invalid type index: {0}")]
	Index(String),
}

impl Error {
	pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::Io { path: path.into(), source }
	}
}

/// Result type for discovery operations.
pub type Result<T> = std::result::Result<T, Error>;
