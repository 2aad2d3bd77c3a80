//! Readers for the autoload maps `composer dump-autoload` generates.
//!
//! The files are PHP but follow a fixed shape, one entry per line:
//!
//! ```php
//! return array(
//!     'Psr\\Log\\' => array($vendorDir . '/psr/log/src'),
//!     'App\\Kernel' => $baseDir . '/app/Kernel.php',
//! );
//! ```
//!
//! `$vendorDir` and `$baseDir` are substituted with the project's vendor and
//! root directories. Lines that do not match the shape are ignored.

use std::path::{Path, PathBuf};

/// Directories that `$vendorDir` and `$baseDir` expand to.
#[derive(Debug, Clone, Copy)]
pub(super) struct Bases<'a> {
	pub vendor: &'a Path,
	pub root: &'a Path,
}

/// Parses every `'key' => paths` entry of a generated autoload map.
pub(super) fn parse_entries(src: &str, bases: Bases<'_>) -> Vec<(String, Vec<PathBuf>)> {
	src.lines().filter_map(|line| parse_line(line.trim(), bases)).collect()
}

fn parse_line(line: &str, bases: Bases<'_>) -> Option<(String, Vec<PathBuf>)> {
	let mut cursor = Cursor { rest: line };
	let key = cursor.quoted()?;
	cursor.expect("=>")?;

	let mut paths = Vec::new();
	if cursor.eat("array(") {
		while !cursor.eat(")") {
			paths.push(cursor.path_expr(bases)?);
			cursor.eat(",");
		}
	} else {
		paths.push(cursor.path_expr(bases)?);
	}
	Some((key, paths))
}

struct Cursor<'a> {
	rest: &'a str,
}

impl Cursor<'_> {
	fn skip_ws(&mut self) {
		self.rest = self.rest.trim_start();
	}

	fn eat(&mut self, token: &str) -> bool {
		self.skip_ws();
		match self.rest.strip_prefix(token) {
			Some(rest) => {
				self.rest = rest;
				true
			}
			None => false,
		}
	}

	fn expect(&mut self, token: &str) -> Option<()> {
		self.eat(token).then_some(())
	}

	/// A single-quoted PHP string; only `\\` and `\'` are escapes.
	fn quoted(&mut self) -> Option<String> {
		self.skip_ws();
		let body = self.rest.strip_prefix('\'')?;
		let mut out = String::new();
		let mut chars = body.char_indices();
		while let Some((i, c)) = chars.next() {
			match c {
				'\\' => match chars.next() {
					Some((_, e @ ('\\' | '\''))) => out.push(e),
					Some((_, other)) => {
						out.push('\\');
						out.push(other);
					}
					None => return None,
				},
				'\'' => {
					self.rest = &body[i + 1..];
					return Some(out);
				}
				c => out.push(c),
			}
		}
		None
	}

	/// `$vendorDir . '/x'`, `$baseDir . '/x'` or a plain quoted path.
	fn path_expr(&mut self, bases: Bases<'_>) -> Option<PathBuf> {
		let base = if self.eat("$vendorDir") {
			Some(bases.vendor)
		} else if self.eat("$baseDir") {
			Some(bases.root)
		} else {
			None
		};

		match base {
			Some(base) => {
				if !self.eat(".") {
					return Some(base.to_path_buf());
				}
				let suffix = self.quoted()?;
				Some(base.join(suffix.trim_start_matches('/')))
			}
			None => self.quoted().map(PathBuf::from),
		}
	}
}
