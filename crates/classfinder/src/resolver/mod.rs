//! Namespace-scoped type discovery.
//!
//! The [`Resolver`] answers "which types live in this namespace" for types
//! that may not have been materialized yet. A request runs through three
//! stages:
//!
//! 1. **Index**: find candidate `(type, file)` pairs. A precomputed global
//!    index is used as-is when the source provides one; otherwise the
//!    namespace's source roots are scanned, which requires a
//!    [`DirectoryScanner`].
//! 2. **Load**: materialize every candidate inside the namespace into the
//!    registry. Each namespace is loaded at most once per resolver.
//! 3. **Collect**: filter the registry's full snapshot by namespace prefix,
//!    vendor location and the caller's predicate.
//!
//! # Example
//!
//! ```ignore
//! let mut resolver = Resolver::composer("/path/to/project")?;
//! let concrete = resolver.get_classes("App\\Models\\", LoadedType::is_concrete, false)?;
//! ```

#[cfg(test)]
mod tests;

use std::borrow::Cow;
use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;

use crate::composer::ComposerProject;
use crate::error::{Error, Result};
use crate::index::TypeIndex;
use crate::namespace;
use crate::prefix::PrefixTable;
use crate::registry::{LoadedType, ManifestRegistry, TypeRegistry};
use crate::scan::DirectoryScanner;
use crate::source::PackageIndexSource;

/// Where type indexes come from, decided on first use.
#[derive(Debug, Default)]
enum CacheState {
	#[default]
	Uninitialized,
	/// The source supplied a complete index; it serves every namespace.
	GlobalIndex(TypeIndex),
	/// No global index; each namespace scans its own roots.
	Scanning,
}

/// Finds the types of a namespace, materializing them into `R` on first request.
pub struct Resolver<R = ManifestRegistry> {
	source: Box<dyn PackageIndexSource>,
	scanner: Option<Box<dyn DirectoryScanner>>,
	registry: R,
	state: CacheState,
	prefixes: OnceCell<PrefixTable>,
	vendor_root: OnceCell<Option<PathBuf>>,
	loaded_namespaces: IndexSet<String>,
}

impl Resolver<ManifestRegistry> {
	/// Creates a resolver over `source` with the default scanner and an empty registry.
	pub fn new(source: impl PackageIndexSource + 'static) -> Self {
		Self::builder(source).build()
	}

	pub fn builder(source: impl PackageIndexSource + 'static) -> ResolverBuilder<ManifestRegistry> {
		ResolverBuilder {
			source: Box::new(source),
			scanner: default_scanner(),
			registry: ManifestRegistry::new(),
		}
	}

	/// Creates a resolver over the Composer project at `root`.
	pub fn composer(root: impl Into<PathBuf>) -> Result<Self> {
		Ok(Self::new(ComposerProject::open(root)?))
	}
}

impl<R: TypeRegistry> Resolver<R> {
	/// Returns the names of all types in `namespace` accepted by `predicate`.
	///
	/// The empty namespace matches every type. With `include_vendor` false,
	/// types defined below the vendor root are dropped. Names come back in
	/// materialization order.
	///
	/// Fails with [`Error::Configuration`] when the source has no global
	/// index and no scanner is installed.
	pub fn get_classes<F>(&mut self, namespace: &str, predicate: F, include_vendor: bool) -> Result<Vec<String>>
	where
		F: Fn(&LoadedType) -> bool,
	{
		let namespace = namespace::normalize(namespace);
		self.ensure_loaded(namespace)?;

		let classes: Vec<String> = self
			.registry
			.loaded()
			.filter(|ty| namespace::has_prefix(namespace, ty.name()))
			.filter(|ty| include_vendor || !self.is_vendor(ty.name()))
			.filter(|ty| predicate(*ty))
			.map(|ty| ty.name().to_string())
			.collect();

		tracing::debug!(namespace, include_vendor, found = classes.len(), "collected types");
		Ok(classes)
	}

	/// Every type in `namespace`, vendor included.
	pub fn classes(&mut self, namespace: &str) -> Result<Vec<String>> {
		self.get_classes(namespace, |_| true, true)
	}

	/// Runs a [`Query`].
	pub fn query(&mut self, query: &Query<'_>) -> Result<Vec<String>> {
		match &query.filter {
			Some(filter) => self.get_classes(query.namespace, filter, query.include_vendor),
			None => self.get_classes(query.namespace, |_| true, query.include_vendor),
		}
	}

	/// Materializes every indexed type in `namespace`, once.
	///
	/// Index entries whose file is missing or no longer declares the type
	/// are logged and skipped.
	pub fn ensure_loaded(&mut self, namespace: &str) -> Result<()> {
		let namespace = namespace::normalize(namespace);
		if self.loaded_namespaces.contains(namespace) {
			return Ok(());
		}
		self.init_state()?;

		let partial;
		let index = match &self.state {
			CacheState::GlobalIndex(index) => index,
			_ => {
				partial = self.scan_namespace(namespace)?;
				&partial
			}
		};

		let mut materialized = 0usize;
		for (name, file) in index.with_prefix(namespace) {
			if self.registry.is_materialized(name) {
				continue;
			}
			match self.registry.materialize(name, file) {
				Ok(true) => materialized += 1,
				Ok(false) => tracing::warn!(name, file = %file.display(), "indexed file does not declare type"),
				Err(error) => tracing::warn!(name, %error, "skipping stale index entry"),
			}
		}

		tracing::debug!(namespace, materialized, "namespace loaded");
		self.loaded_namespaces.insert(namespace.to_string());
		Ok(())
	}

	/// Returns the type index covering `namespace`.
	///
	/// Borrows the global index when there is one; otherwise scans the
	/// namespace's roots into a fresh partial index.
	pub fn resolve_index(&mut self, namespace: &str) -> Result<Cow<'_, TypeIndex>> {
		self.init_state()?;
		match &self.state {
			CacheState::GlobalIndex(index) => Ok(Cow::Borrowed(index)),
			_ => self.scan_namespace(namespace::normalize(namespace)).map(Cow::Owned),
		}
	}

	/// Source roots that may define types in `namespace`.
	pub fn directories_for(&self, namespace: &str) -> Result<Vec<PathBuf>> {
		Ok(self.prefixes()?.directories_for(namespace))
	}

	/// Whether the defining file of `name` lies below the vendor root.
	pub fn is_vendor(&self, name: &str) -> bool {
		match (self.vendor_root(), self.registry.defining_file(name)) {
			(Some(root), Some(file)) => file.starts_with(root),
			_ => false,
		}
	}

	/// The vendor root, computed on first use.
	pub fn vendor_root(&self) -> Option<&Path> {
		self.vendor_root.get_or_init(|| self.source.vendor_dir()).as_deref()
	}

	pub fn is_loaded(&self, namespace: &str) -> bool {
		self.loaded_namespaces.contains(namespace::normalize(namespace))
	}

	/// True once the source has supplied a global index.
	pub fn has_global_index(&self) -> bool {
		matches!(self.state, CacheState::GlobalIndex(_))
	}

	pub fn registry(&self) -> &R {
		&self.registry
	}

	/// Mutable access, e.g. to declare types loaded by other means.
	pub fn registry_mut(&mut self) -> &mut R {
		&mut self.registry
	}

	fn init_state(&mut self) -> Result<()> {
		if matches!(self.state, CacheState::Uninitialized) {
			self.state = match self.source.global_index()? {
				Some(index) => {
					tracing::debug!(types = index.len(), "global index available");
					CacheState::GlobalIndex(index)
				}
				None => {
					tracing::debug!("no global index; scanning per namespace");
					CacheState::Scanning
				}
			};
		}
		if matches!(self.state, CacheState::Scanning) && self.scanner.is_none() {
			return Err(Error::Configuration);
		}
		Ok(())
	}

	fn prefixes(&self) -> Result<&PrefixTable> {
		if let Some(table) = self.prefixes.get() {
			return Ok(table);
		}
		let table = self.source.prefix_table()?;
		Ok(self.prefixes.get_or_init(|| table))
	}

	fn scan_namespace(&self, namespace: &str) -> Result<TypeIndex> {
		let scanner = self.scanner.as_deref().ok_or(Error::Configuration)?;
		let mut index = self.source.class_map()?;
		for dir in self.prefixes()?.directories_for(namespace) {
			match scanner.scan(&dir) {
				Ok(found) => index.merge(found),
				Err(error) => tracing::warn!(dir = %dir.display(), %error, "skipping unscannable root"),
			}
		}
		Ok(index)
	}
}

/// Builder for [`Resolver`].
pub struct ResolverBuilder<R> {
	source: Box<dyn PackageIndexSource>,
	scanner: Option<Box<dyn DirectoryScanner>>,
	registry: R,
}

impl<R: TypeRegistry> ResolverBuilder<R> {
	/// Installs the scanner used when no global index is available.
	pub fn scanner(mut self, scanner: impl DirectoryScanner + 'static) -> Self {
		self.scanner = Some(Box::new(scanner));
		self
	}

	/// Removes the scanner; the source must then provide a global index.
	pub fn without_scanner(mut self) -> Self {
		self.scanner = None;
		self
	}

	/// Replaces the registry types are materialized into.
	pub fn registry<R2: TypeRegistry>(self, registry: R2) -> ResolverBuilder<R2> {
		ResolverBuilder { source: self.source, scanner: self.scanner, registry }
	}

	pub fn build(self) -> Resolver<R> {
		Resolver {
			source: self.source,
			scanner: self.scanner,
			registry: self.registry,
			state: CacheState::Uninitialized,
			prefixes: OnceCell::new(),
			vendor_root: OnceCell::new(),
			loaded_namespaces: IndexSet::new(),
		}
	}
}

#[cfg(feature = "scanner")]
fn default_scanner() -> Option<Box<dyn DirectoryScanner>> {
	Some(Box::new(crate::scan::ClassMapScanner::new()))
}

#[cfg(not(feature = "scanner"))]
fn default_scanner() -> Option<Box<dyn DirectoryScanner>> {
	None
}

/// Parameters for [`Resolver::query`].
///
/// Defaults to every type in every namespace, vendor included.
pub struct Query<'a> {
	namespace: &'a str,
	filter: Option<Box<dyn Fn(&LoadedType) -> bool + 'a>>,
	include_vendor: bool,
}

impl Default for Query<'_> {
	fn default() -> Self {
		Self { namespace: "", filter: None, include_vendor: true }
	}
}

impl<'a> Query<'a> {
	pub fn new(namespace: &'a str) -> Self {
		Self { namespace, ..Self::default() }
	}

	/// Adds a predicate; all predicates must accept a type.
	pub fn filter(mut self, predicate: impl Fn(&LoadedType) -> bool + 'a) -> Self {
		let combined: Box<dyn Fn(&LoadedType) -> bool + 'a> = match self.filter.take() {
			Some(existing) => Box::new(move |ty: &LoadedType| existing(ty) && predicate(ty)),
			None => Box::new(predicate),
		};
		self.filter = Some(combined);
		self
	}

	pub fn exclude_vendor(mut self) -> Self {
		self.include_vendor = false;
		self
	}
}
