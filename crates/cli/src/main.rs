//! `classfinder` command-line tool.
//!
//! Lists the types below a namespace of a Composer project, shows how a
//! namespace is routed to source roots, and writes the precomputed index
//! that lets later runs skip directory scanning.

mod cli;

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use classfinder::{ClassMapScanner, ComposerProject, LoadedType, Query, Resolver, TypeKind};
use cli::{Cli, Command};

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "CLASSFINDER_LOG";

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	match cli.command {
		Command::List { namespace, no_vendor, kind, concrete, abstract_only, json } => {
			let filters = ListFilters { no_vendor, kind, concrete, abstract_only };
			let names = list(&cli.root, &namespace, &filters)?;
			if json {
				println!("{}", serde_json::to_string_pretty(&names)?);
			} else {
				names.iter().for_each(|name| println!("{name}"));
			}
		}
		Command::Dirs { namespace } => {
			let resolver = open(&cli.root)?;
			for dir in resolver.directories_for(&namespace)? {
				println!("{}", dir.display());
			}
		}
		Command::DumpIndex { output } => {
			let mut project = ComposerProject::open(&cli.root)
				.with_context(|| format!("failed to open project at {}", cli.root.display()))?;
			if let Some(output) = output {
				project = project.with_index_path(output);
			}
			let index = project.dump_index(&ClassMapScanner::new())?;
			println!("wrote {} types to {}", index.len(), project.index_path().display());
		}
	}

	Ok(())
}

/// Filters accepted by `classfinder list`.
#[derive(Debug, Default)]
struct ListFilters {
	no_vendor: bool,
	kind: Option<TypeKind>,
	concrete: bool,
	abstract_only: bool,
}

impl ListFilters {
	fn query<'a>(&self, namespace: &'a str) -> Query<'a> {
		let mut query = Query::new(namespace);
		if self.no_vendor {
			query = query.exclude_vendor();
		}
		if let Some(kind) = self.kind {
			query = query.filter(move |ty| ty.kind() == kind);
		}
		if self.concrete {
			query = query.filter(LoadedType::is_concrete);
		}
		if self.abstract_only {
			query = query.filter(LoadedType::is_abstract);
		}
		query
	}
}

fn list(root: &Path, namespace: &str, filters: &ListFilters) -> anyhow::Result<Vec<String>> {
	let mut resolver = open(root)?;
	let names = resolver.query(&filters.query(namespace))?;
	tracing::info!(namespace, found = names.len(), "listed types");
	Ok(names)
}

fn open(root: &Path) -> anyhow::Result<Resolver> {
	Resolver::composer(root).with_context(|| format!("failed to open project at {}", root.display()))
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("classfinder=debug,info")
		} else {
			EnvFilter::new("warn")
		}
	});

	// Results go to stdout; diagnostics stay on stderr.
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(verbose)
		.init();
}
