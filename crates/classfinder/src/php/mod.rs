//! Static reading of PHP type declarations.
//!
//! Files are never evaluated. The tokenizer strips everything that cannot hold
//! a declaration, then declarations are recognised from `namespace`, `class`,
//! `interface`, `trait` and `enum` keywords in code position.

mod lexer;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use bitflags::bitflags;
use lexer::Token;
use serde::{Deserialize, Serialize};

use crate::namespace;

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
	Class,
	Interface,
	Trait,
	Enum,
}

impl TypeKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Class => "class",
			Self::Interface => "interface",
			Self::Trait => "trait",
			Self::Enum => "enum",
		}
	}

	fn from_keyword(word: &str) -> Option<Self> {
		[Self::Class, Self::Interface, Self::Trait, Self::Enum]
			.into_iter()
			.find(|kind| word.eq_ignore_ascii_case(kind.as_str()))
	}
}

impl fmt::Display for TypeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Error returned when parsing an unknown [`TypeKind`] name.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown type kind `{0}` (expected class, interface, trait or enum)")]
pub struct UnknownTypeKind(String);

impl FromStr for TypeKind {
	type Err = UnknownTypeKind;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::from_keyword(s).ok_or_else(|| UnknownTypeKind(s.to_string()))
	}
}

bitflags! {
	/// Declaration modifiers written before the kind keyword.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct Modifiers: u8 {
		const ABSTRACT = 1 << 0;
		const FINAL = 1 << 1;
		const READONLY = 1 << 2;
	}
}

impl Modifiers {
	fn from_keyword(word: &str) -> Option<Self> {
		[("abstract", Self::ABSTRACT), ("final", Self::FINAL), ("readonly", Self::READONLY)]
			.into_iter()
			.find_map(|(kw, flag)| word.eq_ignore_ascii_case(kw).then_some(flag))
	}
}

/// A type declaration found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
	/// Fully-qualified name without a leading separator.
	pub name: String,
	pub kind: TypeKind,
	pub modifiers: Modifiers,
}

impl Declaration {
	/// True for classes declared `abstract`.
	pub fn is_abstract(&self) -> bool {
		self.kind == TypeKind::Class && self.modifiers.contains(Modifiers::ABSTRACT)
	}

	/// True for classes that can be instantiated directly.
	pub fn is_concrete(&self) -> bool {
		self.kind == TypeKind::Class && !self.modifiers.contains(Modifiers::ABSTRACT)
	}
}

/// Reads and parses the declarations of the file at `path`.
///
/// Invalid UTF-8 is replaced rather than rejected; legacy sources in other
/// encodings still have ASCII keywords and names.
pub fn read_declarations(path: &Path) -> std::io::Result<Vec<Declaration>> {
	let bytes = std::fs::read(path)?;
	Ok(parse_declarations(&String::from_utf8_lossy(&bytes)))
}

/// Extracts every type declaration from PHP source text, in source order.
pub fn parse_declarations(src: &str) -> Vec<Declaration> {
	let tokens = lexer::tokenize(src);
	let mut declarations = Vec::new();
	let mut current_ns = String::new();
	let mut depth = 0usize;
	// Brace depth outside a `namespace Foo { ... }` block while inside it.
	let mut ns_block: Option<usize> = None;

	let mut i = 0;
	while i < tokens.len() {
		match &tokens[i] {
			Token::OpenBrace => depth += 1,
			Token::CloseBrace => {
				depth = depth.saturating_sub(1);
				if ns_block == Some(depth) {
					current_ns.clear();
					ns_block = None;
				}
			}
			Token::Name(word) if word.eq_ignore_ascii_case("namespace") && !is_member_access(&tokens, i) => {
				match (tokens.get(i + 1), tokens.get(i + 2)) {
					(Some(Token::Name(name)), Some(Token::Semicolon)) => {
						current_ns = namespace::normalize(name).to_string();
						i += 1;
					}
					(Some(Token::Name(name)), Some(Token::OpenBrace)) => {
						current_ns = namespace::normalize(name).to_string();
						ns_block = Some(depth);
						i += 1;
					}
					(Some(Token::OpenBrace), _) => {
						current_ns.clear();
						ns_block = Some(depth);
					}
					_ => {}
				}
			}
			Token::Name(word) => {
				if let Some(kind) = TypeKind::from_keyword(word)
					&& let Some(short) = declared_name(&tokens, i, kind)
				{
					declarations.push(Declaration {
						name: namespace::qualify(&current_ns, short),
						kind,
						modifiers: leading_modifiers(&tokens, i),
					});
					i += 1;
				}
			}
			_ => {}
		}
		i += 1;
	}

	declarations
}

/// Returns the short name declared by the kind keyword at `i`, if it is a declaration.
fn declared_name<'a>(tokens: &[Token<'a>], i: usize, kind: TypeKind) -> Option<&'a str> {
	if is_member_access(tokens, i) {
		return None;
	}
	if i > 0 && matches!(&tokens[i - 1], Token::Name(prev) if prev.eq_ignore_ascii_case("new") || prev.eq_ignore_ascii_case("function")) {
		return None;
	}

	let Some(&Token::Name(short)) = tokens.get(i + 1) else {
		return None;
	};
	if short.contains(namespace::SEPARATOR) || short.eq_ignore_ascii_case("extends") || short.eq_ignore_ascii_case("implements") {
		return None;
	}

	// `enum` is only reserved in declaration position.
	if kind == TypeKind::Enum {
		let opens_body = match tokens.get(i + 2) {
			Some(Token::OpenBrace) | Some(Token::Punct(':')) => true,
			Some(Token::Name(next)) => next.eq_ignore_ascii_case("implements"),
			_ => false,
		};
		if !opens_body {
			return None;
		}
	}

	Some(short)
}

fn is_member_access(tokens: &[Token<'_>], i: usize) -> bool {
	i > 0 && matches!(tokens[i - 1], Token::DoubleColon | Token::Arrow)
}

fn leading_modifiers(tokens: &[Token<'_>], i: usize) -> Modifiers {
	tokens[..i]
		.iter()
		.rev()
		.map_while(|token| match token {
			Token::Name(word) => Modifiers::from_keyword(word),
			_ => None,
		})
		.fold(Modifiers::empty(), |acc, flag| acc | flag)
}
