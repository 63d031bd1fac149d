//! Per-source fetch queries. Every query is scoped to the owning user; that
//! filter is a security invariant, not an optimization.
//!
//! The memory and comment sources are ranked by Postgres full-text search
//! (`ts_rank` over a stored tsvector) and ordered by recency so a
//! `(created_at, id)` cursor can bound the next page. The structured sources
//! (children, recipients, groups) are matched by ILIKE containment and only
//! support LIMIT/OFFSET.

use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Result,
	db::Db,
	models::{ChildRow, CommentHit, GroupRow, MemoryHit, RecipientRow},
};

/// Row window for the cursor-capable sources.
#[derive(Debug, Clone, Copy)]
pub enum FetchWindow {
	/// Fetch `fetch` rows in recency order, strictly before `after` when set.
	/// Callers pass one row more than the page size to detect `has_more`.
	Cursor { after: Option<(OffsetDateTime, Uuid)>, fetch: i64 },
	/// Legacy window.
	Offset { offset: i64, limit: i64 },
}

pub async fn memories_by_query(
	db: &Db,
	tsquery: &str,
	user_id: Uuid,
	window: FetchWindow,
) -> Result<Vec<MemoryHit>> {
	let mut builder = sqlx::QueryBuilder::new(
		"SELECT id, child_id, title, content, status, created_at, \
		 ts_rank(search_vector, to_tsquery('english', ",
	);

	builder.push_bind(tsquery);
	builder.push(")) AS rank FROM memories WHERE user_id = ");
	builder.push_bind(user_id);
	builder.push(" AND search_vector @@ to_tsquery('english', ");
	builder.push_bind(tsquery);
	builder.push(")");

	push_recency_window(&mut builder, "created_at", "id", window);

	Ok(builder.build_query_as().fetch_all(&db.pool).await?)
}

pub async fn comments_by_query(
	db: &Db,
	tsquery: &str,
	user_id: Uuid,
	window: FetchWindow,
) -> Result<Vec<CommentHit>> {
	// Ownership of a comment follows the parent memory.
	let mut builder = sqlx::QueryBuilder::new(
		"SELECT c.id, c.memory_id, m.title AS memory_title, c.content, c.created_at, \
		 ts_rank(c.search_vector, to_tsquery('english', ",
	);

	builder.push_bind(tsquery);
	builder.push(")) AS rank FROM comments c JOIN memories m ON m.id = c.memory_id WHERE m.user_id = ");
	builder.push_bind(user_id);
	builder.push(" AND c.search_vector @@ to_tsquery('english', ");
	builder.push_bind(tsquery);
	builder.push(")");

	push_recency_window(&mut builder, "c.created_at", "c.id", window);

	Ok(builder.build_query_as().fetch_all(&db.pool).await?)
}

pub async fn children_by_name(
	db: &Db,
	pattern: &str,
	user_id: Uuid,
	limit: i64,
	offset: i64,
) -> Result<Vec<ChildRow>> {
	let rows = sqlx::query_as(
		"\
SELECT id, name, birth_date, created_at
FROM children
WHERE user_id = $1
	AND name ILIKE $2 ESCAPE '\\'
ORDER BY name
LIMIT $3 OFFSET $4",
	)
	.bind(user_id)
	.bind(pattern)
	.bind(limit)
	.bind(offset)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn recipients_by_name_or_email(
	db: &Db,
	pattern: &str,
	user_id: Uuid,
	limit: i64,
	offset: i64,
) -> Result<Vec<RecipientRow>> {
	let rows = sqlx::query_as(
		"\
SELECT id, name, email, relationship, created_at
FROM recipients
WHERE user_id = $1
	AND (name ILIKE $2 ESCAPE '\\' OR email ILIKE $2 ESCAPE '\\')
ORDER BY name
LIMIT $3 OFFSET $4",
	)
	.bind(user_id)
	.bind(pattern)
	.bind(limit)
	.bind(offset)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn groups_by_name(
	db: &Db,
	pattern: &str,
	user_id: Uuid,
	limit: i64,
	offset: i64,
) -> Result<Vec<GroupRow>> {
	let rows = sqlx::query_as(
		"\
SELECT g.id, g.name, count(gm.recipient_id) AS member_count, g.created_at
FROM recipient_groups g
LEFT JOIN group_members gm ON gm.group_id = g.id
WHERE g.user_id = $1
	AND g.name ILIKE $2 ESCAPE '\\'
GROUP BY g.id, g.name, g.created_at
ORDER BY g.name
LIMIT $3 OFFSET $4",
	)
	.bind(user_id)
	.bind(pattern)
	.bind(limit)
	.bind(offset)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

fn push_recency_window(
	builder: &mut sqlx::QueryBuilder<'_, sqlx::Postgres>,
	created_col: &str,
	id_col: &str,
	window: FetchWindow,
) {
	match window {
		FetchWindow::Cursor { after, fetch } => {
			if let Some((created_at, id)) = after {
				builder.push(format!(" AND ({created_col}, {id_col}) < ("));
				builder.push_bind(created_at);
				builder.push(", ");
				builder.push_bind(id);
				builder.push(")");
			}

			builder.push(format!(" ORDER BY {created_col} DESC, {id_col} DESC LIMIT "));
			builder.push_bind(fetch);
		},
		FetchWindow::Offset { offset, limit } => {
			builder.push(format!(" ORDER BY {created_col} DESC, {id_col} DESC LIMIT "));
			builder.push_bind(limit);
			builder.push(" OFFSET ");
			builder.push_bind(offset);
		},
	}
}
