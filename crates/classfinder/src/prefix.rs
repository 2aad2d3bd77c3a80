//! Namespace prefix table and routing.
//!
//! A [`PrefixTable`] maps PSR-4 style namespace prefixes (trailing separator
//! included) to the source roots that hold them. Routing picks the longest
//! registered prefix of a namespace; namespaces with no registered prefix are
//! searched in every root rather than yielding nothing.

use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};

use crate::namespace;

/// Ordered namespace-prefix to directories table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixTable {
	prefixes: IndexMap<String, Vec<PathBuf>>,
}

impl PrefixTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends `dirs` to the roots registered for `prefix`.
	///
	/// A prefix that already exists keeps its position and gains the new
	/// directories after its existing ones.
	pub fn insert<I, P>(&mut self, prefix: impl Into<String>, dirs: I)
	where
		I: IntoIterator<Item = P>,
		P: Into<PathBuf>,
	{
		self.prefixes
			.entry(prefix.into())
			.or_default()
			.extend(dirs.into_iter().map(Into::into));
	}

	/// Builder-style [`PrefixTable::insert`].
	pub fn with<I, P>(mut self, prefix: impl Into<String>, dirs: I) -> Self
	where
		I: IntoIterator<Item = P>,
		P: Into<PathBuf>,
	{
		self.insert(prefix, dirs);
		self
	}

	pub fn get(&self, prefix: &str) -> Option<&[PathBuf]> {
		self.prefixes.get(prefix).map(Vec::as_slice)
	}

	pub fn len(&self) -> usize {
		self.prefixes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.prefixes.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
		self.prefixes.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
	}

	/// Every registered directory in table order, duplicates removed.
	pub fn all_directories(&self) -> Vec<PathBuf> {
		let unique: IndexSet<&Path> = self.prefixes.values().flatten().map(PathBuf::as_path).collect();
		unique.into_iter().map(Path::to_path_buf).collect()
	}

	/// Returns the directories that may define types in `namespace`.
	///
	/// Uses the longest registered prefix of `namespace`. Falls back to
	/// [`PrefixTable::all_directories`] when nothing matches, and for the empty
	/// namespace.
	pub fn directories_for(&self, namespace: &str) -> Vec<PathBuf> {
		let namespace = namespace::normalize(namespace);
		for candidate in namespace::prefix_candidates(namespace) {
			if let Some(dirs) = self.prefixes.get(&candidate) {
				tracing::debug!(namespace, prefix = %candidate, dirs = dirs.len(), "routed namespace");
				return dirs.clone();
			}
		}

		tracing::debug!(namespace, "no registered prefix; searching every root");
		self.all_directories()
	}
}

impl<S: Into<String>, P: Into<PathBuf>> FromIterator<(S, Vec<P>)> for PrefixTable {
	fn from_iter<T: IntoIterator<Item = (S, Vec<P>)>>(iter: T) -> Self {
		let mut table = Self::new();
		for (prefix, dirs) in iter {
			table.insert(prefix, dirs);
		}
		table
	}
}
