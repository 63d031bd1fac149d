//! Contextual excerpt and highlight markup generation.
//!
//! Both functions are pure and deterministic. `highlight_matches` is not
//! idempotent: a second pass would match terms inside the inserted `<mark>`
//! tags, so callers invoke it exactly once per field.

use regex::Regex;

/// How far past the computed window start we look for a space before giving
/// up and cutting mid-word.
const SNAP_WINDOW: usize = 20;
const ELLIPSIS: &str = "...";

/// Produces a window of at most `max_len` characters centered on the first
/// case-insensitive occurrence of `query` in `content`, with ellipsis markers
/// on the clipped side(s). Falls back to the head of the string when the
/// query does not occur verbatim. All arithmetic is in characters, so
/// multi-byte input never splits a code point.
pub fn generate_excerpt(content: &str, query: &str, max_len: usize) -> String {
	let chars: Vec<char> = content.chars().collect();
	let Some(match_index) = find_ci(&chars, query.trim()) else {
		if chars.len() <= max_len {
			return content.trim().to_string();
		}

		let head: String = chars[..max_len].iter().collect();

		return format!("{}{ELLIPSIS}", head.trim());
	};

	let mut start = match_index.saturating_sub(max_len / 2);

	// Snap forward to the next word boundary so the excerpt does not open
	// mid-token, but only when a space is close by.
	if start > 0 {
		let snap_end = (start + SNAP_WINDOW).min(chars.len());

		if let Some(offset) = chars[start..snap_end].iter().position(|ch| *ch == ' ') {
			start += offset + 1;
		}
	}

	let end = (start + max_len).min(chars.len());
	let window: String = chars[start..end].iter().collect();
	let mut excerpt = window.trim().to_string();

	if start > 0 {
		excerpt = format!("{ELLIPSIS}{excerpt}");
	}
	if end < chars.len() {
		excerpt = format!("{excerpt}{ELLIPSIS}");
	}

	excerpt
}

/// Wraps every case-insensitive occurrence of each whitespace-delimited query
/// term in `<mark>...</mark>`. Terms are applied sequentially; pathological
/// overlapping terms can nest markup, which is accepted rather than guarded.
pub fn highlight_matches(text: &str, query: &str) -> String {
	let mut out = text.to_string();

	for term in query.split_whitespace() {
		let Ok(pattern) = Regex::new(&format!("(?i){}", regex::escape(term))) else {
			continue;
		};

		out = pattern.replace_all(&out, "<mark>$0</mark>").into_owned();
	}

	out
}

/// Case-insensitive substring search over characters, returning the character
/// index of the first match. Per-character lowercasing keeps the haystack and
/// the original content aligned one to one.
fn find_ci(haystack: &[char], needle: &str) -> Option<usize> {
	if needle.is_empty() {
		return None;
	}

	let needle: Vec<char> = needle.chars().map(lower_first).collect();

	if needle.len() > haystack.len() {
		return None;
	}

	let lowered: Vec<char> = haystack.iter().copied().map(lower_first).collect();

	lowered.windows(needle.len()).position(|window| window == needle.as_slice())
}

fn lower_first(ch: char) -> char {
	ch.to_lowercase().next().unwrap_or(ch)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn short_content_is_returned_trimmed() {
		let excerpt = generate_excerpt("  Emma took her first steps today!  ", "first steps", 200);

		assert_eq!(excerpt, "Emma took her first steps today!");
	}

	#[test]
	fn missing_match_truncates_head_with_ellipsis() {
		let content = "a".repeat(500);
		let excerpt = generate_excerpt(&content, "zebra", 200);

		assert_eq!(excerpt.chars().count(), 203);
		assert!(excerpt.ends_with("..."));
	}

	#[test]
	fn window_centers_on_match_with_both_ellipses() {
		let content = format!("{} first steps {}", "x".repeat(300), "y".repeat(300));
		let excerpt = generate_excerpt(&content, "first steps", 200);

		assert!(excerpt.starts_with("..."));
		assert!(excerpt.ends_with("..."));
		assert!(excerpt.contains("first steps"));
		assert!(excerpt.chars().count() <= 206);
	}

	#[test]
	fn window_snaps_to_word_boundary() {
		// "first steps" sits at character 175, so the raw window start (75)
		// lands mid-run with a space 15 characters ahead to snap to.
		let content = format!("{} {}first steps {}", "x".repeat(90), "z".repeat(84), "y".repeat(300));
		let excerpt = generate_excerpt(&content, "first steps", 200);
		let body = excerpt.trim_start_matches("...");

		assert!(body.starts_with('z'));
	}

	#[test]
	fn excerpt_bound_holds_for_varied_lengths() {
		for len in [0usize, 10, 199, 200, 201, 350, 1_000] {
			let content: String = "word ".repeat(len / 5 + 1).chars().take(len).collect();
			let excerpt = generate_excerpt(&content, "word", 200);

			assert!(
				excerpt.chars().count() <= 206,
				"excerpt too long for content length {len}"
			);
		}
	}

	#[test]
	fn multibyte_content_never_panics() {
		let content = "célébration 🎉 ".repeat(40);
		let excerpt = generate_excerpt(&content, "🎉", 200);

		assert!(excerpt.chars().count() <= 206);
	}

	#[test]
	fn highlight_wraps_every_occurrence_once() {
		let marked = highlight_matches("Steps, steps, STEPS", "steps");

		assert_eq!(marked, "<mark>Steps</mark>, <mark>steps</mark>, <mark>STEPS</mark>");
	}

	#[test]
	fn highlight_applies_terms_sequentially() {
		let marked = highlight_matches("Emma took her first steps today!", "first steps");

		assert!(marked.contains("<mark>first</mark> <mark>steps</mark>"));
	}

	#[test]
	fn highlight_escapes_regex_metacharacters() {
		let marked = highlight_matches("cost is $5 (approx)", "$5 (approx)");

		assert!(marked.contains("<mark>$5</mark>"));
		assert!(marked.contains("<mark>(approx)</mark>"));
	}

	#[test]
	fn highlight_preserves_original_casing() {
		let marked = highlight_matches("Grandma Joy", "grandma");

		assert_eq!(marked, "<mark>Grandma</mark> Joy");
	}
}
