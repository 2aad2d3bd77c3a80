//! Type name to defining file index.
//!
//! A [`TypeIndex`] is either the precomputed global index of a whole project
//! or a partial index built by scanning the roots of one namespace. The
//! global flavor is persisted as a postcard blob with a magic header so a
//! stale or foreign file is rejected instead of misread.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const MAGIC: &[u8; 8] = b"CLSFNDIX";
pub const SCHEMA_VERSION: u32 = 1;

/// Ordered mapping from fully-qualified type name to defining file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeIndex {
	entries: IndexMap<String, PathBuf>,
}

impl TypeIndex {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records `file` as the definition of `name`, returning the previous file if any.
	pub fn insert(&mut self, name: impl Into<String>, file: impl Into<PathBuf>) -> Option<PathBuf> {
		self.entries.insert(name.into(), file.into())
	}

	pub fn get(&self, name: &str) -> Option<&Path> {
		self.entries.get(name).map(PathBuf::as_path)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.entries.contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v.as_path()))
	}

	/// Entries whose type name starts with `prefix`.
	pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a Path)> {
		self.iter().filter(move |(name, _)| crate::namespace::has_prefix(prefix, name))
	}

	/// Merges `other` into `self`; entries from `other` win.
	///
	/// Same-name types defined in two different files are a project
	/// misconfiguration. They are kept last-writer-wins and reported.
	pub fn merge(&mut self, other: TypeIndex) {
		for (name, file) in other.entries {
			if let Some(previous) = self.entries.get(&name)
				&& previous != &file
			{
				tracing::warn!(
					name = %name,
					kept = %file.display(),
					shadowed = %previous.display(),
					"type defined in more than one file",
				);
			}
			self.entries.insert(name, file);
		}
	}

	/// Decodes an index blob produced by [`TypeIndex::encode`].
	pub fn decode(bytes: &[u8]) -> Result<Self> {
		let body = bytes
			.strip_prefix(MAGIC.as_slice())
			.ok_or_else(|| Error::Index("missing magic header".into()))?;
		let (version, payload) = body
			.split_first_chunk::<4>()
			.ok_or_else(|| Error::Index("truncated header".into()))?;
		let version = u32::from_le_bytes(*version);
		if version != SCHEMA_VERSION {
			return Err(Error::Index(format!("unsupported schema version {version}, expected {SCHEMA_VERSION}")));
		}
		postcard::from_bytes(payload).map_err(|e| Error::Index(e.to_string()))
	}

	/// Encodes the index as magic, little-endian schema version, then postcard payload.
	pub fn encode(&self) -> Result<Vec<u8>> {
		let payload = postcard::to_stdvec(self).map_err(|e| Error::Index(e.to_string()))?;
		let mut out = Vec::with_capacity(MAGIC.len() + 4 + payload.len());
		out.extend_from_slice(MAGIC);
		out.extend_from_slice(&SCHEMA_VERSION.to_le_bytes());
		out.extend_from_slice(&payload);
		Ok(out)
	}

	/// Reads an index blob from disk. A missing file yields `Ok(None)`.
	pub fn read_from(path: &Path) -> Result<Option<Self>> {
		match fs::read(path) {
			Ok(bytes) => Self::decode(&bytes).map(Some),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(Error::io(path, e)),
		}
	}

	/// Writes the index blob to `path`, creating parent directories.
	pub fn write_to(&self, path: &Path) -> Result<()> {
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
		}
		let bytes = self.encode()?;
		let mut file = fs::File::create(path).map_err(|e| Error::io(path, e))?;
		file.write_all(&bytes).map_err(|e| Error::io(path, e))
	}
}

impl<S: Into<String>, P: Into<PathBuf>> FromIterator<(S, P)> for TypeIndex {
	fn from_iter<T: IntoIterator<Item = (S, P)>>(iter: T) -> Self {
		Self {
			entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
		}
	}
}

impl IntoIterator for TypeIndex {
	type Item = (String, PathBuf);
	type IntoIter = indexmap::map::IntoIter<String, PathBuf>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.into_iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn merge_is_last_writer_wins() {
		let mut base: TypeIndex = [("App\\Foo", "/a/Foo.php"), ("App\\Bar", "/a/Bar.php")].into_iter().collect();
		let other: TypeIndex = [("App\\Foo", "/b/Foo.php"), ("App\\Baz", "/b/Baz.php")].into_iter().collect();
		base.merge(other);

		assert_eq!(base.len(), 3);
		assert_eq!(base.get("App\\Foo"), Some(Path::new("/b/Foo.php")));
		let names: Vec<_> = base.iter().map(|(n, _)| n).collect();
		assert_eq!(names, ["App\\Foo", "App\\Bar", "App\\Baz"]);
	}

	#[test]
	fn with_prefix_filters_names() {
		let index: TypeIndex = [("App\\Foo", "/a"), ("Vendor\\Foo", "/b"), ("Application", "/c")].into_iter().collect();
		let names: Vec<_> = index.with_prefix("App\\").map(|(n, _)| n).collect();
		assert_eq!(names, ["App\\Foo"]);
		assert_eq!(index.with_prefix("").count(), 3);
	}

	#[test]
	fn blob_roundtrip_preserves_order() {
		let index: TypeIndex = [("Z\\Last", "/z.php"), ("A\\First", "/a.php")].into_iter().collect();
		let decoded = TypeIndex::decode(&index.encode().unwrap()).unwrap();
		assert_eq!(decoded, index);
		assert_eq!(decoded.iter().next().map(|(n, _)| n), Some("Z\\Last"));
	}

	#[test]
	fn decode_rejects_foreign_bytes() {
		assert!(matches!(TypeIndex::decode(b"not an index"), Err(Error::Index(_))));
		assert!(matches!(TypeIndex::decode(MAGIC), Err(Error::Index(_))));

		let mut wrong_version = MAGIC.to_vec();
		wrong_version.extend_from_slice(&99u32.to_le_bytes());
		let err = TypeIndex::decode(&wrong_version).unwrap_err();
		assert!(err.to_string().contains("schema version 99"));
	}

	#[test]
	fn read_missing_file_is_none() {
		let dir = tempfile::tempdir().unwrap();
		assert!(TypeIndex::read_from(&dir.path().join("absent.idx")).unwrap().is_none());
	}

	#[test]
	fn write_then_read() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("nested/classfinder.idx");
		let index: TypeIndex = [("App\\Foo", "/src/Foo.php")].into_iter().collect();
		index.write_to(&path).unwrap();
		assert_eq!(TypeIndex::read_from(&path).unwrap(), Some(index));
	}
}
