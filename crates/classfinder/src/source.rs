//! Package index sources.
//!
//! A [`PackageIndexSource`] describes a project to the resolver: its prefix
//! table, its optional precomputed global index, any explicitly listed
//! types, and where third-party code lives.

use std::path::PathBuf;

use crate::error::Result;
use crate::index::TypeIndex;
use crate::prefix::PrefixTable;

pub trait PackageIndexSource {
	/// The precomputed whole-project index, or `None` when the project has not
	/// generated one. A present index is trusted as complete.
	fn global_index(&self) -> Result<Option<TypeIndex>>;

	/// Registered namespace prefixes and their source roots.
	fn prefix_table(&self) -> Result<PrefixTable>;

	/// Types the project maps to files explicitly, outside any prefix.
	/// Seeds every partial index.
	fn class_map(&self) -> Result<TypeIndex> {
		Ok(TypeIndex::new())
	}

	/// Directory holding third-party packages, if the project has one.
	fn vendor_dir(&self) -> Option<PathBuf>;
}

/// A source assembled in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
	pub prefixes: PrefixTable,
	pub global: Option<TypeIndex>,
	pub class_map: TypeIndex,
	pub vendor_dir: Option<PathBuf>,
}

impl StaticSource {
	pub fn new(prefixes: PrefixTable) -> Self {
		Self { prefixes, ..Self::default() }
	}

	pub fn with_global_index(mut self, index: TypeIndex) -> Self {
		self.global = Some(index);
		self
	}

	pub fn with_class_map(mut self, index: TypeIndex) -> Self {
		self.class_map = index;
		self
	}

	pub fn with_vendor_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.vendor_dir = Some(dir.into());
		self
	}
}

impl PackageIndexSource for StaticSource {
	fn global_index(&self) -> Result<Option<TypeIndex>> {
		Ok(self.global.clone())
	}

	fn prefix_table(&self) -> Result<PrefixTable> {
		Ok(self.prefixes.clone())
	}

	fn class_map(&self) -> Result<TypeIndex> {
		Ok(self.class_map.clone())
	}

	fn vendor_dir(&self) -> Option<PathBuf> {
		self.vendor_dir.clone()
	}
}
