//! Normalizes a raw user query into the two shapes the fetchers consume: a
//! prefix-match tsquery expression for the full-text sources and an escaped
//! containment pattern for the name-matched sources.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPlan {
	raw: String,
	tokens: Vec<String>,
}

impl QueryPlan {
	pub fn new(raw: &str) -> Self {
		let raw = raw.trim().to_string();
		let tokens = raw
			.split_whitespace()
			.map(sanitize_token)
			.filter(|token| !token.is_empty())
			.collect();

		Self { raw, tokens }
	}

	/// True when nothing searchable survived tokenization. Callers reject such
	/// queries before any source is touched.
	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}

	pub fn raw(&self) -> &str {
		&self.raw
	}

	pub fn terms(&self) -> &[String] {
		&self.tokens
	}

	/// `to_tsquery` expression: every token is a quoted prefix term, all terms
	/// ANDed. Prefix matching keeps partial words (typeahead) matching; AND
	/// semantics require every term to appear.
	pub fn tsquery(&self) -> String {
		self.tokens
			.iter()
			.map(|token| format!("'{}':*", token.replace('\'', "''")))
			.collect::<Vec<_>>()
			.join(" & ")
	}

	/// `%query%` containment pattern for ILIKE, with the pattern
	/// metacharacters escaped. Pair with `ESCAPE '\'`.
	pub fn like_pattern(&self) -> String {
		format!("%{}%", escape_like(&self.raw))
	}
}

fn sanitize_token(token: &str) -> String {
	// tsquery operators and grouping characters are stripped so user input
	// cannot alter the expression structure.
	token.chars().filter(|ch| !matches!(ch, '&' | '|' | '!' | ':' | '(' | ')' | '<' | '>' | '*' | '\\')).collect()
}

pub fn escape_like(input: &str) -> String {
	let mut out = String::with_capacity(input.len());

	for ch in input.chars() {
		if matches!(ch, '%' | '_' | '\\') {
			out.push('\\');
		}

		out.push(ch);
	}

	out
}
