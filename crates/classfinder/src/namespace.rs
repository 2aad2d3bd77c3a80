//! Namespace string helpers.
//!
//! Namespaces are backslash-delimited. Prefix matching is plain string prefix
//! matching, so `App\` matches `App\Foo` but `App` also matches `Application`.
//! Callers that want segment-exact matching pass the trailing separator.

/// Namespace segment separator.
pub const SEPARATOR: char = '\\';

/// Returns true if `name` starts with `prefix`. The empty prefix matches everything.
pub fn has_prefix(prefix: &str, name: &str) -> bool {
	name.starts_with(prefix)
}

/// Strips a leading separator, so `\App\Foo` and `App\Foo` compare equal.
pub fn normalize(name: &str) -> &str {
	name.strip_prefix(SEPARATOR).unwrap_or(name)
}

/// Joins a namespace and a short name into a fully-qualified name.
pub fn qualify(namespace: &str, short: &str) -> String {
	let namespace = normalize(namespace).trim_end_matches(SEPARATOR);
	if namespace.is_empty() {
		short.to_string()
	} else {
		format!("{namespace}{SEPARATOR}{short}")
	}
}

/// Candidate lookup keys for `namespace`, most specific first.
///
/// The namespace itself comes first, then each shorter run of leading
/// segments rejoined with a trailing separator: `A\B\C` yields `A\B\C`,
/// `A\B\C\`, `A\B\`, `A\`. The empty prefix is never a candidate.
pub(crate) fn prefix_candidates(namespace: &str) -> Vec<String> {
	let mut candidates = Vec::new();
	if !namespace.is_empty() {
		candidates.push(namespace.to_string());
	}
	let mut parts: Vec<&str> = namespace.split(SEPARATOR).filter(|p| !p.is_empty()).collect();
	while !parts.is_empty() {
		let candidate = format!("{}{SEPARATOR}", parts.join("\\"));
		if candidates.last() != Some(&candidate) {
			candidates.push(candidate);
		}
		parts.pop();
	}
	candidates
}
