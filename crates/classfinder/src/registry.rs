//! Live type registry.
//!
//! The registry is the set of types materialized so far, in materialization
//! order. Discovery only ever grows it. [`ManifestRegistry`] materializes a
//! type by reading the declarations of its defining file; every type the
//! file declares becomes visible at once, as when the file is included.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::php::{self, Declaration, TypeKind};

/// A materialized type and the file that defines it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedType {
	pub declaration: Declaration,
	pub file: PathBuf,
}

impl LoadedType {
	pub fn name(&self) -> &str {
		&self.declaration.name
	}

	pub fn kind(&self) -> TypeKind {
		self.declaration.kind
	}

	pub fn is_abstract(&self) -> bool {
		self.declaration.is_abstract()
	}

	pub fn is_concrete(&self) -> bool {
		self.declaration.is_concrete()
	}

	pub fn file(&self) -> &Path {
		&self.file
	}
}

/// Registry of materialized types.
pub trait TypeRegistry {
	fn is_materialized(&self, name: &str) -> bool;

	/// Makes `name` visible by materializing `file`.
	///
	/// Returns whether `name` is materialized afterwards; `false` means the
	/// file exists but does not declare it. Already-materialized names are
	/// left untouched.
	fn materialize(&mut self, name: &str, file: &Path) -> Result<bool>;

	/// Every materialized type, in materialization order.
	fn loaded(&self) -> impl Iterator<Item = &LoadedType>;

	fn defining_file(&self, name: &str) -> Option<&Path>;
}

/// Registry backed by an in-memory manifest of declarations.
#[derive(Debug, Clone, Default)]
pub struct ManifestRegistry {
	types: IndexMap<String, LoadedType>,
}

impl ManifestRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a type directly, as if something else had already loaded it.
	///
	/// Returns `false` if a type of that name is already registered.
	pub fn declare(&mut self, declaration: Declaration, file: impl Into<PathBuf>) -> bool {
		if self.types.contains_key(&declaration.name) {
			return false;
		}
		let file = file.into();
		self.types.insert(declaration.name.clone(), LoadedType { declaration, file });
		true
	}

	pub fn get(&self, name: &str) -> Option<&LoadedType> {
		self.types.get(name)
	}

	pub fn len(&self) -> usize {
		self.types.len()
	}

	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}
}

impl TypeRegistry for ManifestRegistry {
	fn is_materialized(&self, name: &str) -> bool {
		self.types.contains_key(name)
	}

	fn materialize(&mut self, name: &str, file: &Path) -> Result<bool> {
		if self.is_materialized(name) {
			return Ok(true);
		}

		let declarations = php::read_declarations(file).map_err(|e| Error::io(file, e))?;
		let mut added = 0usize;
		for declaration in declarations {
			if self.declare(declaration, file) {
				added += 1;
			}
		}
		tracing::trace!(file = %file.display(), added, "materialized file");

		Ok(self.is_materialized(name))
	}

	fn loaded(&self) -> impl Iterator<Item = &LoadedType> {
		self.types.values()
	}

	fn defining_file(&self, name: &str) -> Option<&Path> {
		self.types.get(name).map(LoadedType::file)
	}
}
