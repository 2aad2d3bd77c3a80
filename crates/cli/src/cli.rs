use std::path::PathBuf;

use clap::{Parser, Subcommand};
use classfinder::TypeKind;

#[derive(Parser, Debug)]
#[command(name = "classfinder")]
#[command(about = "Discover the types a PHP project defines, by namespace")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Project root containing composer.json
	#[arg(long, short = 'r', global = true, default_value = ".", value_name = "PATH")]
	pub root: PathBuf,

	/// Verbose logging
	#[arg(long, short = 'v', global = true)]
	pub verbose: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// List the types defined below a namespace
	List {
		/// Namespace prefix, e.g. `App\Models\` (all types if omitted)
		#[arg(default_value = "")]
		namespace: String,

		/// Leave out types installed under the vendor directory
		#[arg(long)]
		no_vendor: bool,

		/// Only types of this kind (class, interface, trait, enum)
		#[arg(long, short = 'k')]
		kind: Option<TypeKind>,

		/// Only classes that can be instantiated
		#[arg(long, conflicts_with = "abstract_only")]
		concrete: bool,

		/// Only abstract classes
		#[arg(long = "abstract")]
		abstract_only: bool,

		/// Print a JSON array instead of one name per line
		#[arg(long)]
		json: bool,
	},
	/// Show the source roots searched for a namespace
	Dirs {
		/// Namespace prefix
		#[arg(default_value = "")]
		namespace: String,
	},
	/// Scan every source root and write the precomputed index
	DumpIndex {
		/// Write the index here instead of `<vendor>/composer/classfinder.idx`
		#[arg(long, short = 'o', value_name = "PATH")]
		output: Option<PathBuf>,
	},
}
