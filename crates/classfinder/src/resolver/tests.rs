use std::cell::Cell;
use std::fs;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::*;
use crate::php::{Declaration, Modifiers, TypeKind};
use crate::source::StaticSource;

fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
	let path = root.join(rel);
	fs::create_dir_all(path.parent().unwrap()).unwrap();
	fs::write(&path, content).unwrap();
	path
}

/// Scanner that ignores its directory and always returns `index`, counting calls.
fn counting(index: TypeIndex) -> (Rc<Cell<usize>>, impl Fn(&Path) -> Result<TypeIndex> + 'static) {
	let calls = Rc::new(Cell::new(0));
	let counter = Rc::clone(&calls);
	let scanner = move |_: &Path| -> Result<TypeIndex> {
		counter.set(counter.get() + 1);
		Ok(index.clone())
	};
	(calls, scanner)
}

fn never_scan(dir: &Path) -> Result<TypeIndex> {
	panic!("scanner invoked for {}", dir.display());
}

/// `App\Foo` and abstract `App\Bar` under `/src`, indexed in that order.
fn app_fixture() -> (tempfile::TempDir, StaticSource, TypeIndex) {
	let dir = tempfile::tempdir().unwrap();
	let src = dir.path().join("src");
	let foo = write(&src, "Foo.php", "<?php namespace App; class Foo {}");
	let bar = write(&src, "Bar.php", "<?php namespace App; abstract class Bar {}");
	let source = StaticSource::new(PrefixTable::new().with("App\\", [src]));
	let index = TypeIndex::from_iter([("App\\Foo", foo), ("App\\Bar", bar)]);
	(dir, source, index)
}

#[test]
fn test_end_to_end_namespace_and_predicate() {
	let (_dir, source, index) = app_fixture();
	let (_, scanner) = counting(index);
	let mut resolver = Resolver::builder(source).scanner(scanner).build();

	assert_eq!(resolver.get_classes("App\\", |_| true, true).unwrap(), ["App\\Foo", "App\\Bar"]);
	assert_eq!(resolver.get_classes("App\\", LoadedType::is_abstract, true).unwrap(), ["App\\Bar"]);
	assert_eq!(resolver.classes("\\App\\").unwrap(), ["App\\Foo", "App\\Bar"]);
}

#[test]
fn test_loaded_namespace_is_not_rescanned() {
	let (_dir, source, index) = app_fixture();
	let (calls, scanner) = counting(index);
	let mut resolver = Resolver::builder(source).scanner(scanner).build();

	let first = resolver.classes("App\\").unwrap();
	let second = resolver.classes("App\\").unwrap();
	assert_eq!(first, second);
	assert_eq!(calls.get(), 1);
	assert!(resolver.is_loaded("App\\"));
	assert!(!resolver.is_loaded("Other\\"));
}

#[test]
fn test_results_stay_inside_namespace() {
	let dir = tempfile::tempdir().unwrap();
	let foo = write(dir.path(), "Foo.php", "<?php namespace App; class Foo {}");
	let user = write(dir.path(), "User.php", "<?php namespace App\\Models; class User {}");
	let index = TypeIndex::from_iter([("App\\Foo", foo), ("App\\Models\\User", user)]);
	let mut resolver = Resolver::builder(StaticSource::default().with_global_index(index))
		.scanner(never_scan)
		.build();

	resolver.classes("App\\").unwrap();
	let models = resolver.classes("App\\Models\\").unwrap();
	assert_eq!(models, ["App\\Models\\User"]);
	for name in resolver.classes("App\\").unwrap() {
		assert!(name.starts_with("App\\"));
	}
}

#[test]
fn test_rejecting_predicate_yields_nothing() {
	let (_dir, source, index) = app_fixture();
	let (_, scanner) = counting(index);
	let mut resolver = Resolver::builder(source).scanner(scanner).build();

	assert!(resolver.get_classes("App\\", |_| false, true).unwrap().is_empty());
	// The namespace was still loaded.
	assert_eq!(resolver.registry().len(), 2);
}

#[test]
fn test_global_index_never_scans() {
	let (_dir, source, index) = app_fixture();
	let mut resolver = Resolver::builder(source.with_global_index(index)).scanner(never_scan).build();

	assert_eq!(resolver.classes("").unwrap(), ["App\\Foo", "App\\Bar"]);
	assert!(resolver.has_global_index());
	assert!(matches!(resolver.resolve_index("Anything\\").unwrap(), Cow::Borrowed(_)));
}

#[test]
fn test_global_index_does_not_need_scanner() {
	let (_dir, source, index) = app_fixture();
	let mut resolver = Resolver::builder(source.with_global_index(index)).without_scanner().build();
	assert_eq!(resolver.classes("App\\").unwrap().len(), 2);
}

#[test]
fn test_no_index_and_no_scanner_is_a_configuration_error() {
	let (_dir, source, _) = app_fixture();
	let mut resolver = Resolver::builder(source).without_scanner().build();

	let err = resolver.classes("App\\").unwrap_err();
	assert!(matches!(err, Error::Configuration));
	let message = err.to_string();
	assert!(message.contains("scanner"));
	assert!(message.contains("dump-index"));
	assert!(!resolver.is_loaded("App\\"));
}

#[test]
fn test_stale_index_entries_are_skipped() {
	let dir = tempfile::tempdir().unwrap();
	let live = write(dir.path(), "Live.php", "<?php namespace App; class Live {}");
	let moved = write(dir.path(), "Moved.php", "<?php namespace App; class Renamed {}");
	let index = TypeIndex::from_iter([
		("App\\Gone", dir.path().join("Gone.php")),
		("App\\Live", live),
		("App\\Moved", moved),
	]);
	let mut resolver = Resolver::builder(StaticSource::default().with_global_index(index))
		.without_scanner()
		.build();

	let mut found = resolver.classes("App\\").unwrap();
	found.sort();
	// `Renamed` is declared alongside the stale `Moved` entry, so it becomes visible too.
	assert_eq!(found, ["App\\Live", "App\\Renamed"]);
}

#[test]
fn test_previously_loaded_types_are_reported() {
	let (calls, scanner) = counting(TypeIndex::new());
	let table = PrefixTable::new().with("Legacy\\", ["/legacy"]);
	let mut resolver = Resolver::builder(StaticSource::new(table)).scanner(scanner).build();
	resolver.registry_mut().declare(
		Declaration { name: "Legacy\\Widget".into(), kind: TypeKind::Interface, modifiers: Modifiers::empty() },
		"/legacy/Widget.php",
	);

	assert_eq!(resolver.classes("Legacy\\").unwrap(), ["Legacy\\Widget"]);
	assert_eq!(calls.get(), 1);
}

#[test]
fn test_unscannable_root_is_skipped() {
	let dir = tempfile::tempdir().unwrap();
	let good = dir.path().join("good");
	let foo = write(&good, "Foo.php", "<?php namespace App; class Foo {}");
	let broken = dir.path().join("broken");
	let table = PrefixTable::new().with("App\\", [broken.clone(), good]);

	let scanner = move |d: &Path| -> Result<TypeIndex> {
		if d == broken {
			return Err(Error::io(d, std::io::ErrorKind::PermissionDenied.into()));
		}
		Ok(TypeIndex::from_iter([("App\\Foo", foo.clone())]))
	};
	let mut resolver = Resolver::builder(StaticSource::new(table)).scanner(scanner).build();
	assert_eq!(resolver.classes("App\\").unwrap(), ["App\\Foo"]);
}

#[test]
fn test_class_map_seeds_partial_index() {
	let dir = tempfile::tempdir().unwrap();
	let helper = write(dir.path(), "lib/helpers.php", "<?php namespace App\\Support; final class Str {}");
	let source = StaticSource::default().with_class_map(TypeIndex::from_iter([("App\\Support\\Str", helper)]));
	let (_, scanner) = counting(TypeIndex::new());

	let mut resolver = Resolver::builder(source).scanner(scanner).build();
	assert_eq!(resolver.classes("App\\Support\\").unwrap(), ["App\\Support\\Str"]);
	assert!(resolver.registry().get("App\\Support\\Str").unwrap().is_concrete());
}

#[test]
fn test_routes_namespace_to_longest_prefix() {
	let table = PrefixTable::new().with("A\\", ["/dirA"]).with("A\\B\\", ["/dirAB"]);
	let resolver = Resolver::builder(StaticSource::new(table)).without_scanner().build();

	assert_eq!(resolver.directories_for("A\\B\\C\\").unwrap(), [PathBuf::from("/dirAB")]);
	assert_eq!(
		resolver.directories_for("Unregistered\\").unwrap(),
		[PathBuf::from("/dirA"), PathBuf::from("/dirAB")]
	);
}

#[test]
fn test_query_combines_filters() {
	let dir = tempfile::tempdir().unwrap();
	let file = write(
		dir.path(),
		"Shapes.php",
		"<?php namespace Geo; interface Shape {} abstract class Base implements Shape {} final class Circle extends Base {} class Square extends Base {}",
	);
	let index = TypeIndex::from_iter([("Geo\\Circle", file)]);
	let mut resolver = Resolver::builder(StaticSource::default().with_global_index(index))
		.without_scanner()
		.build();

	let query = Query::new("Geo\\")
		.filter(|ty| ty.kind() == TypeKind::Class)
		.filter(|ty| !ty.declaration.modifiers.contains(Modifiers::FINAL));
	assert_eq!(resolver.query(&query).unwrap(), ["Geo\\Base", "Geo\\Square"]);
	assert_eq!(resolver.query(&Query::default()).unwrap().len(), 4);
}

#[test]
fn test_vendor_root_comes_from_source() {
	let source = StaticSource::default().with_vendor_dir("/project/vendor");
	let resolver = Resolver::builder(source).without_scanner().build();
	assert_eq!(resolver.vendor_root(), Some(Path::new("/project/vendor")));

	let bare = Resolver::builder(StaticSource::default()).without_scanner().build();
	assert_eq!(bare.vendor_root(), None);
	assert!(!bare.is_vendor("Anything"));
}

#[cfg(feature = "scanner")]
mod scanning {
	use pretty_assertions::assert_eq;

	use super::*;

	/// An app root and a vendor package both contributing to `App\`.
	fn vendor_fixture() -> (tempfile::TempDir, Resolver) {
		let dir = tempfile::tempdir().unwrap();
		let root = dir.path();
		write(root, "src/Foo.php", "<?php namespace App; class Foo {}");
		write(root, "src/Contracts/Runs.php", "<?php namespace App\\Contracts; interface Runs {}");
		write(root, "vendor/acme/bridge/src/Plugin.php", "<?php namespace App; class Plugin {}");
		write(root, "vendor/acme/util/src/Helper.php", "<?php namespace Acme; class Helper {}");

		let table = PrefixTable::new()
			.with("App\\", [root.join("src"), root.join("vendor/acme/bridge/src")])
			.with("Acme\\", [root.join("vendor/acme/util/src")]);
		let source = StaticSource::new(table).with_vendor_dir(root.join("vendor"));
		(dir, Resolver::new(source))
	}

	#[test]
	fn test_excluding_vendor_returns_subset() {
		let (_dir, mut resolver) = vendor_fixture();

		let all = resolver.get_classes("App\\", |_| true, true).unwrap();
		let own = resolver.get_classes("App\\", |_| true, false).unwrap();
		assert_eq!(all, ["App\\Contracts\\Runs", "App\\Foo", "App\\Plugin"]);
		assert_eq!(own, ["App\\Contracts\\Runs", "App\\Foo"]);
		assert!(own.iter().all(|name| all.contains(name)));
		assert!(resolver.is_vendor("App\\Plugin"));
	}

	#[test]
	fn test_only_routed_roots_are_scanned() {
		let (_dir, mut resolver) = vendor_fixture();

		resolver.classes("App\\").unwrap();
		assert!(!resolver.registry().is_materialized("Acme\\Helper"));

		assert_eq!(resolver.classes("Acme\\").unwrap(), ["Acme\\Helper"]);
		assert_eq!(resolver.classes("").unwrap().len(), 4);
	}

	#[test]
	fn test_resolve_index_scans_partially() {
		let (_dir, mut resolver) = vendor_fixture();
		let index = resolver.resolve_index("Acme\\").unwrap();
		assert!(matches!(index, Cow::Owned(_)));
		assert_eq!(index.len(), 1);
		assert!(index.contains("Acme\\Helper"));
	}
}
