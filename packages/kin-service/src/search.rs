//! The federated search orchestration: validate, fan the per-source fetches
//! out concurrently, normalize, merge by rank, window, assemble.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kin_domain::query::QueryPlan;
use kin_storage::search::{self as queries, FetchWindow};

use crate::{
	KinService,
	error::{Error, Result},
	pagination::{Cursor, Page},
	results::{self, SearchResult, SourceKind},
};

/// Raw request parameters as they arrive on the query string. Parsing and
/// defaulting happen here and in the pagination codec, not at the HTTP layer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
	#[serde(default)]
	pub q: Option<String>,
	#[serde(default)]
	pub types: Option<String>,
	#[serde(default)]
	pub limit: Option<String>,
	#[serde(default)]
	pub offset: Option<String>,
	#[serde(default)]
	pub cursor: Option<String>,
	#[serde(default, rename = "includeHighlights")]
	pub include_highlights: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
	pub results: Vec<SearchResult>,
	/// Count of fetched (pre-window) results, not a true total.
	pub total: usize,
	pub query: String,
	/// Milliseconds, request receipt to response assembly.
	pub execution_time: u64,
	pub pagination: PageInfo,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
	pub has_more: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub next_cursor: Option<String>,
}

impl KinService {
	pub async fn search(&self, user_id: Uuid, req: SearchRequest) -> Result<SearchResponse> {
		let started = Instant::now();
		let plan = QueryPlan::new(req.q.as_deref().unwrap_or(""));

		if plan.is_empty() {
			return Err(Error::invalid("Search query is required"));
		}

		let kinds = parse_types(req.types.as_deref())?;
		let page = Page::from_params(
			req.limit.as_deref(),
			req.offset.as_deref(),
			req.cursor.as_deref(),
			&self.cfg.search,
		)?;
		// Anything other than the literal string "false" means highlights on.
		let include_highlights = req.include_highlights.as_deref() != Some("false");
		let excerpt_max = self.cfg.search.excerpt_max_chars as usize;
		let window = fetch_window(&page)?;
		let (structured_limit, structured_offset) = match page {
			Page::Cursor { limit, .. } => (limit, 0),
			Page::Offset { offset, limit } => (limit, offset),
		};

		// Fan-out/fan-in: the five fetches are independent, so they run
		// concurrently and each absorbs its own failure.
		let (memories, comments, children, recipients, groups) = tokio::join!(
			self.fetch_memories(
				&plan,
				user_id,
				window,
				kinds.contains(&SourceKind::Memory),
				include_highlights,
				excerpt_max,
			),
			self.fetch_comments(
				&plan,
				user_id,
				window,
				kinds.contains(&SourceKind::Comment),
				include_highlights,
				excerpt_max,
			),
			self.fetch_children(
				&plan,
				user_id,
				structured_limit,
				structured_offset,
				kinds.contains(&SourceKind::Child),
				include_highlights,
			),
			self.fetch_recipients(
				&plan,
				user_id,
				structured_limit,
				structured_offset,
				kinds.contains(&SourceKind::Recipient),
				include_highlights,
			),
			self.fetch_groups(
				&plan,
				user_id,
				structured_limit,
				structured_offset,
				kinds.contains(&SourceKind::Group),
				include_highlights,
			),
		);

		let merged = merge_by_rank(vec![memories, comments, children, recipients, groups]);
		let total = merged.len();
		let (results, pagination) = window_results(merged, &page)?;

		Ok(SearchResponse {
			results,
			total,
			query: plan.raw().to_string(),
			execution_time: started.elapsed().as_millis() as u64,
			pagination,
		})
	}

	async fn fetch_memories(
		&self,
		plan: &QueryPlan,
		user_id: Uuid,
		window: FetchWindow,
		wanted: bool,
		include_highlights: bool,
		excerpt_max: usize,
	) -> Vec<SearchResult> {
		if !wanted {
			return Vec::new();
		}

		match queries::memories_by_query(&self.db, &plan.tsquery(), user_id, window).await {
			Ok(rows) => rows
				.into_iter()
				.map(|hit| results::from_memory(hit, plan, include_highlights, excerpt_max))
				.collect(),
			Err(err) => {
				tracing::warn!(source = "memory", "Search source failed: {err}.");

				Vec::new()
			},
		}
	}

	async fn fetch_comments(
		&self,
		plan: &QueryPlan,
		user_id: Uuid,
		window: FetchWindow,
		wanted: bool,
		include_highlights: bool,
		excerpt_max: usize,
	) -> Vec<SearchResult> {
		if !wanted {
			return Vec::new();
		}

		match queries::comments_by_query(&self.db, &plan.tsquery(), user_id, window).await {
			Ok(rows) => rows
				.into_iter()
				.map(|hit| results::from_comment(hit, plan, include_highlights, excerpt_max))
				.collect(),
			Err(err) => {
				tracing::warn!(source = "comment", "Search source failed: {err}.");

				Vec::new()
			},
		}
	}

	async fn fetch_children(
		&self,
		plan: &QueryPlan,
		user_id: Uuid,
		limit: i64,
		offset: i64,
		wanted: bool,
		include_highlights: bool,
	) -> Vec<SearchResult> {
		if !wanted {
			return Vec::new();
		}

		match queries::children_by_name(&self.db, &plan.like_pattern(), user_id, limit, offset)
			.await
		{
			Ok(rows) => rows
				.into_iter()
				.map(|row| results::from_child(row, plan, include_highlights))
				.collect(),
			Err(err) => {
				tracing::warn!(source = "child", "Search source failed: {err}.");

				Vec::new()
			},
		}
	}

	async fn fetch_recipients(
		&self,
		plan: &QueryPlan,
		user_id: Uuid,
		limit: i64,
		offset: i64,
		wanted: bool,
		include_highlights: bool,
	) -> Vec<SearchResult> {
		if !wanted {
			return Vec::new();
		}

		match queries::recipients_by_name_or_email(
			&self.db,
			&plan.like_pattern(),
			user_id,
			limit,
			offset,
		)
		.await
		{
			Ok(rows) => rows
				.into_iter()
				.map(|row| results::from_recipient(row, plan, include_highlights))
				.collect(),
			Err(err) => {
				tracing::warn!(source = "recipient", "Search source failed: {err}.");

				Vec::new()
			},
		}
	}

	async fn fetch_groups(
		&self,
		plan: &QueryPlan,
		user_id: Uuid,
		limit: i64,
		offset: i64,
		wanted: bool,
		include_highlights: bool,
	) -> Vec<SearchResult> {
		if !wanted {
			return Vec::new();
		}

		match queries::groups_by_name(&self.db, &plan.like_pattern(), user_id, limit, offset).await
		{
			Ok(rows) => rows
				.into_iter()
				.map(|row| results::from_group(row, plan, include_highlights))
				.collect(),
			Err(err) => {
				tracing::warn!(source = "group", "Search source failed: {err}.");

				Vec::new()
			},
		}
	}
}

fn fetch_window(page: &Page) -> Result<FetchWindow> {
	match page {
		Page::Cursor { after, limit } => {
			let after = after
				.as_ref()
				.map(|cursor| -> Result<_> {
					let id = Uuid::parse_str(&cursor.id)
						.map_err(|_| Error::invalid("Invalid pagination cursor."))?;

					Ok((cursor.created_at, id))
				})
				.transpose()?;

			// One extra row so the assembler can tell whether another page
			// exists without a second round trip.
			Ok(FetchWindow::Cursor { after, fetch: limit + 1 })
		},
		Page::Offset { offset, limit } => Ok(FetchWindow::Offset { offset: *offset, limit: *limit }),
	}
}

/// Concatenates the per-source buckets in their fixed order and sorts by rank
/// descending. The sort is stable, so equal ranks keep the source order
/// (memory, comment, child, recipient, group) as the tie-break.
fn merge_by_rank(buckets: Vec<Vec<SearchResult>>) -> Vec<SearchResult> {
	let mut merged: Vec<SearchResult> = buckets.into_iter().flatten().collect();

	merged.sort_by(|a, b| b.rank.partial_cmp(&a.rank).unwrap_or(std::cmp::Ordering::Equal));

	merged
}

/// Applies the page window and derives `has_more`/`next_cursor`. Offset mode
/// never reports another page; that is a documented limitation of the legacy
/// mode, not a guarantee that none exists.
fn window_results(
	mut merged: Vec<SearchResult>,
	page: &Page,
) -> Result<(Vec<SearchResult>, PageInfo)> {
	let limit = page.limit() as usize;
	let has_more = page.is_cursor() && merged.len() > limit;

	merged.truncate(limit);

	let next_cursor = if has_more {
		match merged.last() {
			Some(last) => Some(
				Cursor { created_at: last.metadata.created_at(), id: last.id.to_string() }
					.encode()?,
			),
			None => None,
		}
	} else {
		None
	};

	Ok((merged, PageInfo { has_more, next_cursor }))
}

fn parse_types(raw: Option<&str>) -> Result<Vec<SourceKind>> {
	let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
		return Ok(SourceKind::ALL.to_vec());
	};
	let mut kinds = Vec::new();

	for part in raw.split(',') {
		let kind = part.trim().parse::<SourceKind>()?;

		if !kinds.contains(&kind) {
			kinds.push(kind);
		}
	}

	Ok(kinds)
}
