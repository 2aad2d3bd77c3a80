//! Composer project source.
//!
//! Reads a project the way Composer's autoloader sees it. When
//! `composer dump-autoload` has run, the generated `autoload_psr4.php` and
//! `autoload_classmap.php` maps under `<vendor>/composer/` are authoritative.
//! Otherwise the prefix table is rebuilt from `composer.json` and
//! `<vendor>/composer/installed.json`.
//!
//! The global index is either the blob written by
//! [`ComposerProject::dump_index`], or the generated class map when the
//! autoloader was dumped with `--classmap-authoritative`.

mod generated;
mod manifest;

use std::path::{Component, Path, PathBuf};

use generated::Bases;
use manifest::{Autoload, ComposerJson, Installed};

use crate::error::{Error, Result};
use crate::index::TypeIndex;
use crate::namespace;
use crate::prefix::PrefixTable;
use crate::scan::DirectoryScanner;
use crate::source::PackageIndexSource;

/// File name of the precomputed index inside `<vendor>/composer/`.
pub const INDEX_FILE: &str = "classfinder.idx";

/// Environment variable overriding the vendor directory, as Composer honours it.
pub const VENDOR_DIR_ENV: &str = "COMPOSER_VENDOR_DIR";

#[derive(Debug, Clone)]
pub struct ComposerProject {
	root: PathBuf,
	vendor_dir: PathBuf,
	manifest_prefixes: PrefixTable,
	index_path: PathBuf,
}

impl ComposerProject {
	/// Opens the project rooted at `root`.
	///
	/// A missing `composer.json` is treated as an empty manifest, so a bare
	/// `vendor/` tree is still usable.
	pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
		let root = clean_path(&root.into());
		let composer_json: ComposerJson = manifest::read_json(&root.join("composer.json"))?.unwrap_or_default();

		let vendor_dir = std::env::var_os(VENDOR_DIR_ENV)
			.map(PathBuf::from)
			.or_else(|| composer_json.config.vendor_dir.as_ref().map(PathBuf::from))
			.map_or_else(|| root.join("vendor"), |dir| clean_path(&root.join(dir)));

		let mut manifest_prefixes = PrefixTable::new();
		for autoload in [&composer_json.autoload, &composer_json.autoload_dev] {
			add_autoload(&mut manifest_prefixes, autoload, &root);
		}

		let installed_path = vendor_dir.join("composer").join("installed.json");
		if let Some(installed) = manifest::read_json::<Installed>(&installed_path)? {
			for package in installed.into_packages() {
				let install_dir = match &package.install_path {
					Some(rel) => clean_path(&vendor_dir.join("composer").join(rel)),
					None => vendor_dir.join(&package.name),
				};
				add_autoload(&mut manifest_prefixes, &package.autoload, &install_dir);
			}
		}

		let index_path = vendor_dir.join("composer").join(INDEX_FILE);
		tracing::debug!(
			root = %root.display(),
			vendor = %vendor_dir.display(),
			prefixes = manifest_prefixes.len(),
			"opened composer project",
		);

		Ok(Self { root, vendor_dir, manifest_prefixes, index_path })
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	pub fn index_path(&self) -> &Path {
		&self.index_path
	}

	/// Stores the precomputed index somewhere other than `<vendor>/composer/`.
	pub fn with_index_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.index_path = path.into();
		self
	}

	/// Scans every source root and writes the global index blob.
	///
	/// Once written, resolvers over this project never scan again. Roots
	/// that cannot be scanned are skipped with a warning.
	pub fn dump_index(&self, scanner: &dyn DirectoryScanner) -> Result<TypeIndex> {
		let mut index = self.class_map()?;
		for dir in self.prefix_table()?.all_directories() {
			match scanner.scan(&dir) {
				Ok(found) => index.merge(found),
				Err(error) => tracing::warn!(dir = %dir.display(), %error, "skipping unscannable root"),
			}
		}
		index.write_to(&self.index_path)?;
		tracing::info!(path = %self.index_path.display(), types = index.len(), "wrote type index");
		Ok(index)
	}

	fn composer_dir(&self) -> PathBuf {
		self.vendor_dir.join("composer")
	}

	fn bases(&self) -> Bases<'_> {
		Bases { vendor: &self.vendor_dir, root: &self.root }
	}

	/// Reads a generated autoload map, `None` if it was never generated.
	fn read_generated(&self, file: &str) -> Result<Option<Vec<(String, Vec<PathBuf>)>>> {
		let path = self.composer_dir().join(file);
		match std::fs::read_to_string(&path) {
			Ok(src) => Ok(Some(generated::parse_entries(&src, self.bases()))),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(Error::io(path, e)),
		}
	}

	/// Whether `dump-autoload --optimize` folded the PSR-4 roots into the class map.
	///
	/// An unoptimized map only holds `classmap` entries and Composer's own
	/// helpers, never a type below a registered PSR-4 prefix.
	fn is_optimized(&self, class_map: &TypeIndex) -> Result<bool> {
		if class_map.is_empty() {
			return Ok(false);
		}
		let table = self.prefix_table()?;
		Ok(class_map.iter().any(|(name, _)| {
			table.iter().any(|(prefix, _)| !prefix.is_empty() && namespace::has_prefix(prefix, name))
		}))
	}

	fn is_classmap_authoritative(&self) -> Result<bool> {
		let path = self.composer_dir().join("autoload_real.php");
		match std::fs::read_to_string(&path) {
			Ok(src) => Ok(src.contains("setClassMapAuthoritative(true)")),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
			Err(e) => Err(Error::io(path, e)),
		}
	}
}

/// Registers an autoload section's roots.
///
/// `classmap` directories have no namespace of their own. They go under the
/// empty prefix, which Composer treats as a fallback root, so they are
/// searched for unregistered namespaces and the whole-project listing.
fn add_autoload(table: &mut PrefixTable, autoload: &Autoload, base: &Path) {
	for (prefix, paths) in &autoload.psr4 {
		table.insert(prefix.clone(), paths.resolve(base));
	}
	if !autoload.classmap.is_empty() {
		table.insert("", autoload.classmap.iter().map(|p| base.join(p)));
	}
}

/// Resolves `.` and `..` lexically so vendor containment checks see real ancestry.
///
/// A leading `.` is kept, so every path derived from a relative root keeps
/// the same first component.
fn clean_path(path: &Path) -> PathBuf {
	let mut out = PathBuf::new();
	for component in path.components() {
		match component {
			Component::CurDir => {
				if out.as_os_str().is_empty() {
					out.push(component);
				}
			}
			Component::ParentDir => match out.components().next_back() {
				Some(Component::Normal(_)) => {
					out.pop();
				}
				Some(Component::RootDir | Component::Prefix(_)) => {}
				_ => out.push(component),
			},
			other => out.push(other),
		}
	}
	out
}

impl PackageIndexSource for ComposerProject {
	fn global_index(&self) -> Result<Option<TypeIndex>> {
		if let Some(index) = TypeIndex::read_from(&self.index_path)? {
			tracing::debug!(path = %self.index_path.display(), types = index.len(), "using precomputed index");
			return Ok(Some(index));
		}
		let class_map = self.class_map()?;
		if self.is_classmap_authoritative()? {
			tracing::debug!("using authoritative composer class map");
			return Ok(Some(class_map));
		}
		if self.is_optimized(&class_map)? {
			tracing::debug!(types = class_map.len(), "using optimized composer class map");
			return Ok(Some(class_map));
		}
		Ok(None)
	}

	fn prefix_table(&self) -> Result<PrefixTable> {
		match self.read_generated("autoload_psr4.php")? {
			Some(entries) => Ok(entries.into_iter().collect()),
			None => Ok(self.manifest_prefixes.clone()),
		}
	}

	fn class_map(&self) -> Result<TypeIndex> {
		let entries = self.read_generated("autoload_classmap.php")?.unwrap_or_default();
		Ok(entries
			.into_iter()
			.filter_map(|(name, mut paths)| paths.pop().map(|path| (name, path)))
			.collect())
	}

	fn vendor_dir(&self) -> Option<PathBuf> {
		Some(self.vendor_dir.clone())
	}
}
