//! Minimal PHP tokenizer.
//!
//! Produces just enough structure to find type declarations: names,
//! braces and a few operators. Comments, string literals, heredocs and
//! inline HTML are skipped entirely so their contents can never look like a
//! declaration.

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token<'a> {
	/// Identifier or (possibly qualified) name, e.g. `class`, `App\Foo`.
	Name(&'a str),
	OpenBrace,
	CloseBrace,
	Semicolon,
	/// `::`
	DoubleColon,
	/// `->` or `?->`
	Arrow,
	/// Any other punctuation.
	Punct(char),
}

pub(crate) fn tokenize(src: &str) -> Vec<Token<'_>> {
	Lexer { src, bytes: src.as_bytes(), pos: 0, tokens: Vec::new() }.run()
}

struct Lexer<'a> {
	src: &'a str,
	bytes: &'a [u8],
	pos: usize,
	tokens: Vec<Token<'a>>,
}

impl<'a> Lexer<'a> {
	fn run(mut self) -> Vec<Token<'a>> {
		self.skip_inline_html();
		while self.pos < self.bytes.len() {
			self.step();
		}
		self.tokens
	}

	fn peek(&self, offset: usize) -> Option<u8> {
		self.bytes.get(self.pos + offset).copied()
	}

	fn rest(&self) -> &'a str {
		&self.src[self.pos..]
	}

	/// Advances past text outside `<?php ... ?>` tags.
	fn skip_inline_html(&mut self) {
		match self.rest().find("<?") {
			Some(offset) => {
				self.pos += offset + 2;
				let rest = self.rest();
				if rest.as_bytes().get(..3).is_some_and(|tag| tag.eq_ignore_ascii_case(b"php")) {
					self.pos += 3;
				} else if rest.starts_with('=') {
					self.pos += 1;
				}
			}
			None => self.pos = self.bytes.len(),
		}
	}

	fn step(&mut self) {
		let b = self.bytes[self.pos];
		match b {
			b'?' if self.peek(1) == Some(b'>') => {
				self.pos += 2;
				self.skip_inline_html();
			}
			b'?' if self.peek(1) == Some(b'-') && self.peek(2) == Some(b'>') => {
				self.pos += 3;
				self.tokens.push(Token::Arrow);
			}
			b'-' if self.peek(1) == Some(b'>') => {
				self.pos += 2;
				self.tokens.push(Token::Arrow);
			}
			b':' if self.peek(1) == Some(b':') => {
				self.pos += 2;
				self.tokens.push(Token::DoubleColon);
			}
			b'#' if self.peek(1) == Some(b'[') => self.skip_attribute(),
			b'#' => self.skip_line_comment(),
			b'/' if self.peek(1) == Some(b'/') => self.skip_line_comment(),
			b'/' if self.peek(1) == Some(b'*') => self.skip_block_comment(),
			b'\'' | b'"' | b'`' => self.skip_quoted(b),
			b'<' if self.rest().starts_with("<<<") => self.skip_heredoc(),
			b'$' => self.skip_variable(),
			b'{' => {
				self.pos += 1;
				self.tokens.push(Token::OpenBrace);
			}
			b'}' => {
				self.pos += 1;
				self.tokens.push(Token::CloseBrace);
			}
			b';' => {
				self.pos += 1;
				self.tokens.push(Token::Semicolon);
			}
			b if is_name_start(b) => self.lex_name(),
			b if b.is_ascii_whitespace() => self.pos += 1,
			_ => {
				let ch = self.rest().chars().next().unwrap_or('\0');
				self.pos += ch.len_utf8().max(1);
				self.tokens.push(Token::Punct(ch));
			}
		}
	}

	fn lex_name(&mut self) {
		let start = self.pos;
		while let Some(b) = self.peek(0)
			&& (is_name_continue(b) || (b == b'\\' && self.peek(1).is_some_and(is_name_start)))
		{
			self.pos += 1;
		}
		if self.pos == start {
			// Lone backslash.
			self.pos += 1;
			self.tokens.push(Token::Punct('\\'));
			return;
		}
		self.tokens.push(Token::Name(&self.src[start..self.pos]));
	}

	fn skip_variable(&mut self) {
		self.pos += 1;
		while self.peek(0).is_some_and(is_name_continue) {
			self.pos += 1;
		}
	}

	fn skip_line_comment(&mut self) {
		while let Some(b) = self.peek(0) {
			if b == b'\n' {
				break;
			}
			// `?>` ends a line comment as well as the code block.
			if b == b'?' && self.peek(1) == Some(b'>') {
				break;
			}
			self.pos += 1;
		}
	}

	fn skip_block_comment(&mut self) {
		match self.src[self.pos + 2..].find("*/") {
			Some(end) => self.pos += 2 + end + 2,
			None => self.pos = self.bytes.len(),
		}
	}

	fn skip_attribute(&mut self) {
		self.pos += 2;
		let mut depth = 1usize;
		while depth > 0 && self.pos < self.bytes.len() {
			match self.bytes[self.pos] {
				b'[' => depth += 1,
				b']' => depth -= 1,
				q @ (b'\'' | b'"') => {
					self.skip_quoted(q);
					continue;
				}
				_ => {}
			}
			self.pos += 1;
		}
	}

	fn skip_quoted(&mut self, quote: u8) {
		self.pos += 1;
		while let Some(b) = self.peek(0) {
			self.pos += 1;
			if b == b'\\' {
				self.pos += 1;
			} else if b == quote {
				return;
			}
		}
		self.pos = self.pos.min(self.bytes.len());
	}

	fn skip_heredoc(&mut self) {
		let header_start = self.pos + 3;
		let line_end = self.src[header_start..]
			.find('\n')
			.map_or(self.bytes.len(), |i| header_start + i);
		let label = self.src[header_start..line_end]
			.trim()
			.trim_matches(|c| c == '"' || c == '\'');
		if label.is_empty() || !label.bytes().all(is_name_continue) {
			// Not a heredoc after all (e.g. a shift operator); consume `<<<` as punctuation.
			self.pos += 3;
			self.tokens.push(Token::Punct('<'));
			return;
		}

		let mut cursor = line_end;
		while cursor < self.bytes.len() {
			let next_line = self.src[cursor + 1..]
				.find('\n')
				.map_or(self.bytes.len(), |i| cursor + 1 + i);
			let line = self.src.get(cursor + 1..next_line).unwrap_or("");
			let trimmed = line.trim_start();
			if let Some(after) = trimmed.strip_prefix(label)
				&& !after.bytes().next().is_some_and(is_name_continue)
			{
				self.pos = next_line - after.len();
				return;
			}
			cursor = next_line;
		}
		self.pos = self.bytes.len();
	}
}

fn is_name_start(b: u8) -> bool {
	b.is_ascii_alphabetic() || b == b'_' || b >= 0x80 || b == b'\\'
}

fn is_name_continue(b: u8) -> bool {
	b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

#[cfg(test)]
mod tests {
	use super::*;

	fn names(src: &str) -> Vec<&str> {
		tokenize(src)
			.into_iter()
			.filter_map(|t| match t {
				Token::Name(n) => Some(n),
				_ => None,
			})
			.collect()
	}

	#[test]
	fn skips_inline_html_and_comments() {
		let src = "<html>class Nope</html><?php // class A\n# class B\n/* class C */ class D {}";
		assert_eq!(names(src), ["class", "D"]);
	}

	#[test]
	fn skips_strings() {
		let src = r#"<?php $a = 'class X'; $b = "class \"Y\""; class Z {}"#;
		assert_eq!(names(src), ["class", "Z"]);
	}

	#[test]
	fn skips_heredoc_and_nowdoc() {
		let src = "<?php\n$a = <<<EOT\nclass Hidden {}\nEOT;\n$b = <<<'RAW'\n  interface Also {}\n  RAW;\ntrait Visible {}\n";
		assert_eq!(names(src), ["trait", "Visible"]);
	}

	#[test]
	fn closing_tag_returns_to_html() {
		let src = "<?php class A {} ?>\nclass B {}\n<?= 'x' ?><?php class C {}";
		assert_eq!(names(src), ["class", "A", "class", "C"]);
	}

	#[test]
	fn attributes_are_skipped() {
		let src = "<?php #[Attr(name: 'class Q', items: [1, 2])]\nfinal class R {}";
		assert_eq!(names(src), ["final", "class", "R"]);
	}

	#[test]
	fn qualified_names_are_single_tokens() {
		let src = "<?php namespace App\\Models; use \\Foo\\Bar; echo Baz::class;";
		assert_eq!(names(src), ["namespace", "App\\Models", "use", "\\Foo\\Bar", "echo", "Baz", "class"]);
		assert!(tokenize(src).contains(&Token::DoubleColon));
	}
}
