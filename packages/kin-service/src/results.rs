//! Maps raw per-source rows into the unified `SearchResult` shape.
//!
//! Ranks are deliberately heterogeneous, matching the behavior this engine
//! replaces: memory and comment hits carry the oracle's `ts_rank` score
//! (positive, unbounded, comparable only within one source), while structured
//! entities are pinned at [`STRUCTURED_RANK`] regardless of match quality.
//! The merge sort therefore mixes scales; see DESIGN.md before "fixing" this.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use kin_domain::{
	excerpt::{generate_excerpt, highlight_matches},
	query::QueryPlan,
};
use kin_storage::models::{ChildRow, CommentHit, GroupRow, MemoryHit, RecipientRow};

use crate::error::Error;

/// Rank assigned to every substring-matched structured entity.
pub const STRUCTURED_RANK: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
	Memory,
	Comment,
	Child,
	Recipient,
	Group,
}
impl SourceKind {
	pub const ALL: [Self; 5] = [Self::Memory, Self::Comment, Self::Child, Self::Recipient, Self::Group];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Memory => "memory",
			Self::Comment => "comment",
			Self::Child => "child",
			Self::Recipient => "recipient",
			Self::Group => "group",
		}
	}
}
impl FromStr for SourceKind {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw {
			"memory" => Ok(Self::Memory),
			"comment" => Ok(Self::Comment),
			"child" => Ok(Self::Child),
			"recipient" => Ok(Self::Recipient),
			"group" => Ok(Self::Group),
			other => Err(Error::invalid(format!("Unknown search type: {other}."))),
		}
	}
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
	/// Unique within `type` only; `(type, id)` is the real key.
	pub id: Uuid,
	#[serde(rename = "type")]
	pub kind: SourceKind,
	pub title: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub content: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub excerpt: Option<String>,
	pub url: String,
	pub rank: f32,
	pub metadata: ResultMetadata,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub highlights: Option<Highlights>,
}

/// Per-type metadata, discriminated by the sibling `type` field rather than
/// carried as an untyped map.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResultMetadata {
	#[serde(rename_all = "camelCase")]
	Memory {
		#[serde(with = "crate::time_serde")]
		created_at: OffsetDateTime,
		#[serde(skip_serializing_if = "Option::is_none")]
		child_id: Option<Uuid>,
		status: String,
	},
	#[serde(rename_all = "camelCase")]
	Comment {
		#[serde(with = "crate::time_serde")]
		created_at: OffsetDateTime,
		memory_id: Uuid,
	},
	#[serde(rename_all = "camelCase")]
	Child {
		#[serde(with = "crate::time_serde")]
		created_at: OffsetDateTime,
		#[serde(with = "crate::time_serde::date_option")]
		#[serde(skip_serializing_if = "Option::is_none")]
		birth_date: Option<Date>,
	},
	#[serde(rename_all = "camelCase")]
	Recipient {
		#[serde(with = "crate::time_serde")]
		created_at: OffsetDateTime,
		#[serde(skip_serializing_if = "Option::is_none")]
		relationship: Option<String>,
		email: String,
	},
	#[serde(rename_all = "camelCase")]
	Group {
		#[serde(with = "crate::time_serde")]
		created_at: OffsetDateTime,
		member_count: i64,
	},
}
impl ResultMetadata {
	/// Every variant carries `created_at` so cursor construction always has
	/// its input, whichever type ends a page.
	pub fn created_at(&self) -> OffsetDateTime {
		match self {
			Self::Memory { created_at, .. }
			| Self::Comment { created_at, .. }
			| Self::Child { created_at, .. }
			| Self::Recipient { created_at, .. }
			| Self::Group { created_at, .. } => *created_at,
		}
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct Highlights {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub content: Option<String>,
}

pub fn from_memory(
	hit: MemoryHit,
	plan: &QueryPlan,
	include_highlights: bool,
	excerpt_max: usize,
) -> SearchResult {
	let excerpt = generate_excerpt(&hit.content, plan.raw(), excerpt_max);
	// Drafts deep-link into the editor, everything else into the reader view.
	let url = if hit.status == "draft" {
		format!("/memories/{}/edit", hit.id)
	} else {
		format!("/memories/{}", hit.id)
	};
	let highlights =
		include_highlights.then(|| build_highlights(&hit.title, Some(&excerpt), plan)).flatten();

	SearchResult {
		id: hit.id,
		kind: SourceKind::Memory,
		title: hit.title,
		content: Some(hit.content),
		excerpt: Some(excerpt),
		url,
		rank: hit.rank,
		metadata: ResultMetadata::Memory {
			created_at: hit.created_at,
			child_id: hit.child_id,
			status: hit.status,
		},
		highlights,
	}
}

pub fn from_comment(
	hit: CommentHit,
	plan: &QueryPlan,
	include_highlights: bool,
	excerpt_max: usize,
) -> SearchResult {
	let title = format!("Comment on {}", hit.memory_title);
	let excerpt = generate_excerpt(&hit.content, plan.raw(), excerpt_max);
	let url = format!("/memories/{}#comment-{}", hit.memory_id, hit.id);
	let highlights =
		include_highlights.then(|| build_highlights(&title, Some(&excerpt), plan)).flatten();

	SearchResult {
		id: hit.id,
		kind: SourceKind::Comment,
		title,
		content: Some(hit.content),
		excerpt: Some(excerpt),
		url,
		rank: hit.rank,
		metadata: ResultMetadata::Comment {
			created_at: hit.created_at,
			memory_id: hit.memory_id,
		},
		highlights,
	}
}

pub fn from_child(row: ChildRow, plan: &QueryPlan, include_highlights: bool) -> SearchResult {
	let highlights = include_highlights.then(|| build_highlights(&row.name, None, plan)).flatten();

	SearchResult {
		id: row.id,
		kind: SourceKind::Child,
		title: row.name,
		content: None,
		excerpt: None,
		url: format!("/children/{}", row.id),
		rank: STRUCTURED_RANK,
		metadata: ResultMetadata::Child {
			created_at: row.created_at,
			birth_date: row.birth_date,
		},
		highlights,
	}
}

pub fn from_recipient(
	row: RecipientRow,
	plan: &QueryPlan,
	include_highlights: bool,
) -> SearchResult {
	let highlights = include_highlights.then(|| build_highlights(&row.name, None, plan)).flatten();

	SearchResult {
		id: row.id,
		kind: SourceKind::Recipient,
		title: row.name,
		content: None,
		excerpt: None,
		url: format!("/recipients/{}", row.id),
		rank: STRUCTURED_RANK,
		metadata: ResultMetadata::Recipient {
			created_at: row.created_at,
			relationship: row.relationship,
			email: row.email,
		},
		highlights,
	}
}

pub fn from_group(row: GroupRow, plan: &QueryPlan, include_highlights: bool) -> SearchResult {
	let highlights = include_highlights.then(|| build_highlights(&row.name, None, plan)).flatten();

	SearchResult {
		id: row.id,
		kind: SourceKind::Group,
		title: row.name,
		content: None,
		excerpt: None,
		url: format!("/groups/{}", row.id),
		rank: STRUCTURED_RANK,
		metadata: ResultMetadata::Group {
			created_at: row.created_at,
			member_count: row.member_count,
		},
		highlights,
	}
}

/// `Some` only when at least one field actually matched; a highlight block
/// with no marks is omitted entirely.
fn build_highlights(title: &str, content: Option<&str>, plan: &QueryPlan) -> Option<Highlights> {
	let title = highlight_field(title, plan.raw());
	let content = content.and_then(|text| highlight_field(text, plan.raw()));

	if title.is_none() && content.is_none() {
		return None;
	}

	Some(Highlights { title, content })
}

fn highlight_field(text: &str, query: &str) -> Option<String> {
	let marked = highlight_matches(text, query);

	(marked != text).then_some(marked)
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	fn memory_hit(status: &str) -> MemoryHit {
		MemoryHit {
			id: Uuid::new_v4(),
			child_id: None,
			title: "First steps".to_string(),
			content: "Emma took her first steps today!".to_string(),
			status: status.to_string(),
			created_at: datetime!(2026-03-14 12:00 UTC),
			rank: 0.62,
		}
	}

	#[test]
	fn memory_url_depends_on_status() {
		let plan = QueryPlan::new("first steps");
		let draft = from_memory(memory_hit("draft"), &plan, false, 200);
		let sent = from_memory(memory_hit("sent"), &plan, false, 200);

		assert!(draft.url.ends_with("/edit"));
		assert!(!sent.url.ends_with("/edit"));
	}

	#[test]
	fn memory_highlights_wrap_each_term() {
		let plan = QueryPlan::new("first steps");
		let result = from_memory(memory_hit("sent"), &plan, true, 200);
		let highlights = result.highlights.expect("Expected highlights.");
		let content = highlights.content.expect("Expected content highlight.");

		assert!(content.contains("<mark>first</mark> <mark>steps</mark>"));
	}

	#[test]
	fn highlights_omitted_when_nothing_matches() {
		let plan = QueryPlan::new("zebra");
		let result = from_memory(memory_hit("sent"), &plan, true, 200);

		assert!(result.highlights.is_none());
	}

	#[test]
	fn comment_title_is_synthesized() {
		let plan = QueryPlan::new("steps");
		let hit = CommentHit {
			id: Uuid::new_v4(),
			memory_id: Uuid::new_v4(),
			memory_title: "First steps".to_string(),
			content: "So proud of those steps!".to_string(),
			created_at: datetime!(2026-03-15 09:00 UTC),
			rank: 0.4,
		};
		let result = from_comment(hit, &plan, false, 200);

		assert_eq!(result.title, "Comment on First steps");
	}

	#[test]
	fn structured_entities_get_the_fixed_rank() {
		let plan = QueryPlan::new("grandma");
		let row = RecipientRow {
			id: Uuid::new_v4(),
			name: "Grandma Joy".to_string(),
			email: "joy@example.com".to_string(),
			relationship: Some("grandmother".to_string()),
			created_at: datetime!(2026-01-02 08:00 UTC),
		};
		let result = from_recipient(row, &plan, true);

		assert_eq!(result.rank, STRUCTURED_RANK);
		assert_eq!(result.highlights.unwrap().title.unwrap(), "<mark>Grandma</mark> Joy");
	}

	#[test]
	fn source_kind_parses_and_rejects() {
		assert_eq!("child".parse::<SourceKind>().unwrap(), SourceKind::Child);
		assert!("chili".parse::<SourceKind>().is_err());
	}
}
