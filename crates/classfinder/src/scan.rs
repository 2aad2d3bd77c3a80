//! Directory scanning capability.
//!
//! Without a precomputed global index the resolver has to build a partial
//! index per namespace by reading the namespace's source roots. That needs a
//! [`DirectoryScanner`]. The bundled [`ClassMapScanner`] walks a directory and
//! reads declarations from every source file statically.

use std::path::Path;

use crate::error::Result;
use crate::index::TypeIndex;

/// Produces a type index for everything statically findable under a directory.
pub trait DirectoryScanner {
	/// Scans `dir` (or a single file) and returns a fresh index. No file is executed.
	fn scan(&self, dir: &Path) -> Result<TypeIndex>;
}

impl<F> DirectoryScanner for F
where
	F: Fn(&Path) -> Result<TypeIndex>,
{
	fn scan(&self, dir: &Path) -> Result<TypeIndex> {
		self(dir)
	}
}

#[cfg(feature = "scanner")]
pub use walk::ClassMapScanner;

#[cfg(feature = "scanner")]
mod walk {
	use std::path::{Path, PathBuf};

	use walkdir::WalkDir;

	use super::DirectoryScanner;
	use crate::error::{Error, Result};
	use crate::index::TypeIndex;
	use crate::php;

	/// Walks a directory tree and indexes the declarations of every source file.
	#[derive(Debug, Clone)]
	pub struct ClassMapScanner {
		extensions: Vec<String>,
		excluded: Vec<PathBuf>,
	}

	impl Default for ClassMapScanner {
		fn default() -> Self {
			Self {
				extensions: vec!["php".into(), "inc".into()],
				excluded: Vec::new(),
			}
		}
	}

	impl ClassMapScanner {
		pub fn new() -> Self {
			Self::default()
		}

		/// Replaces the file extensions considered source files.
		pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
		where
			I: IntoIterator<Item = S>,
			S: Into<String>,
		{
			self.extensions = extensions.into_iter().map(Into::into).collect();
			self
		}

		/// Skips everything below `path`.
		pub fn exclude(mut self, path: impl Into<PathBuf>) -> Self {
			self.excluded.push(path.into());
			self
		}

		fn is_source(&self, path: &Path) -> bool {
			path.extension()
				.and_then(|ext| ext.to_str())
				.is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
		}

		fn collect_files(&self, root: &Path) -> Vec<PathBuf> {
			let mut paths: Vec<PathBuf> = WalkDir::new(root)
				.follow_links(true)
				.into_iter()
				.filter_entry(|e| !self.excluded.iter().any(|x| e.path().starts_with(x)))
				.filter_map(|entry| match entry {
					Ok(entry) => Some(entry),
					Err(error) => {
						tracing::warn!(root = %root.display(), %error, "skipping unreadable entry");
						None
					}
				})
				.filter(|e| e.file_type().is_file() && self.is_source(e.path()))
				.map(|e| e.into_path())
				.collect();
			paths.sort();
			paths
		}
	}

	impl DirectoryScanner for ClassMapScanner {
		fn scan(&self, dir: &Path) -> Result<TypeIndex> {
			let metadata = std::fs::metadata(dir).map_err(|e| Error::io(dir, e))?;
			let files = if metadata.is_file() { vec![dir.to_path_buf()] } else { self.collect_files(dir) };

			let mut index = TypeIndex::new();
			for file in files {
				let declarations = match php::read_declarations(&file) {
					Ok(declarations) => declarations,
					Err(error) => {
						tracing::warn!(file = %file.display(), %error, "skipping unreadable source file");
						continue;
					}
				};
				for declaration in declarations {
					if let Some(previous) = index.insert(declaration.name.clone(), file.clone())
						&& previous != file
					{
						tracing::warn!(
							name = %declaration.name,
							kept = %file.display(),
							shadowed = %previous.display(),
							"type declared in more than one file",
						);
					}
				}
			}

			tracing::debug!(dir = %dir.display(), types = index.len(), "scanned directory");
			Ok(index)
		}
	}
}
