//! `composer.json` and `installed.json` schemas.
//!
//! Only the autoload-related fields are modelled. Composer writes empty maps
//! as `[]` in some files, so map-typed fields accept an empty list too.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};

#[derive(Debug, Default, Deserialize)]
pub(super) struct ComposerJson {
	#[serde(default)]
	pub autoload: Autoload,
	#[serde(default, rename = "autoload-dev")]
	pub autoload_dev: Autoload,
	#[serde(default)]
	pub config: Config,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct Config {
	#[serde(default, rename = "vendor-dir")]
	pub vendor_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct Autoload {
	#[serde(default, rename = "psr-4", deserialize_with = "lenient_map")]
	pub psr4: IndexMap<String, Paths>,
	#[serde(default)]
	pub classmap: Vec<String>,
}

/// A PSR-4 entry maps to one directory or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum Paths {
	One(String),
	Many(Vec<String>),
}

impl Paths {
	pub fn resolve(&self, base: &Path) -> Vec<PathBuf> {
		match self {
			Self::One(p) => vec![base.join(p)],
			Self::Many(ps) => ps.iter().map(|p| base.join(p)).collect(),
		}
	}
}

#[derive(Debug, Deserialize)]
pub(super) struct Package {
	pub name: String,
	#[serde(default, rename = "install-path")]
	pub install_path: Option<String>,
	#[serde(default)]
	pub autoload: Autoload,
}

/// Composer 2 wraps packages in an object; Composer 1 writes a bare list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum Installed {
	V2 { packages: Vec<Package> },
	V1(Vec<Package>),
}

impl Installed {
	pub fn into_packages(self) -> Vec<Package> {
		match self {
			Self::V2 { packages } | Self::V1(packages) => packages,
		}
	}
}

/// Reads and deserializes a JSON manifest. A missing file yields `Ok(None)`.
pub(super) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
	let content = match std::fs::read_to_string(path) {
		Ok(content) => content,
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
		Err(e) => return Err(Error::io(path, e)),
	};
	serde_json::from_str(&content)
		.map(Some)
		.map_err(|source| Error::Manifest { path: path.to_path_buf(), source })
}

fn lenient_map<'de, D>(deserializer: D) -> std::result::Result<IndexMap<String, Paths>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum MapOrList {
		Map(IndexMap<String, Paths>),
		List(Vec<serde::de::IgnoredAny>),
	}

	Ok(match MapOrList::deserialize(deserializer)? {
		MapOrList::Map(map) => map,
		MapOrList::List(_) => IndexMap::new(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn psr4_accepts_string_and_list_values() {
		let json = r#"{
			"autoload": { "psr-4": { "App\\": "src/", "Lib\\": ["lib/", "extra/"] } },
			"autoload-dev": { "psr-4": [] },
			"config": { "vendor-dir": "deps" }
		}"#;
		let manifest: ComposerJson = serde_json::from_str(json).unwrap();
		assert_eq!(manifest.autoload.psr4.len(), 2);
		assert_eq!(manifest.autoload.psr4["Lib\\"].resolve(Path::new("/p")), vec![
			PathBuf::from("/p/lib/"),
			PathBuf::from("/p/extra/")
		]);
		assert!(manifest.autoload_dev.psr4.is_empty());
		assert_eq!(manifest.config.vendor_dir.as_deref(), Some("deps"));
	}

	#[test]
	fn empty_list_stands_for_empty_map() {
		let manifest: ComposerJson = serde_json::from_str(r#"{ "autoload": { "psr-4": [] } }"#).unwrap();
		assert!(manifest.autoload.psr4.is_empty());
		assert!(serde_json::from_str::<ComposerJson>(r#"{ "autoload": { "psr-4": 3 } }"#).is_err());
	}

	#[test]
	fn installed_json_both_layouts() {
		let v2 = r#"{ "packages": [ { "name": "psr/log", "install-path": "../psr/log" } ] }"#;
		let v1 = r#"[ { "name": "psr/log" } ]"#;
		let v2: Installed = serde_json::from_str(v2).unwrap();
		let v1: Installed = serde_json::from_str(v1).unwrap();
		assert_eq!(v2.into_packages()[0].install_path.as_deref(), Some("../psr/log"));
		assert_eq!(v1.into_packages()[0].name, "psr/log");
	}
}
