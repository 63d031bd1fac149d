use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Full-text hit from the memories table. `rank` is the `ts_rank` score for
/// the request's tsquery; it is only comparable within this source.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MemoryHit {
	pub id: Uuid,
	pub child_id: Option<Uuid>,
	pub title: String,
	pub content: String,
	pub status: String,
	pub created_at: OffsetDateTime,
	pub rank: f32,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentHit {
	pub id: Uuid,
	pub memory_id: Uuid,
	pub memory_title: String,
	pub content: String,
	pub created_at: OffsetDateTime,
	pub rank: f32,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChildRow {
	pub id: Uuid,
	pub name: String,
	pub birth_date: Option<Date>,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipientRow {
	pub id: Uuid,
	pub name: String,
	pub email: String,
	pub relationship: Option<String>,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GroupRow {
	pub id: Uuid,
	pub name: String,
	pub member_count: i64,
	pub created_at: OffsetDateTime,
}

/// One recorded search (or click) event, persisted out of band of the search
/// request itself.
#[derive(Debug, Clone)]
pub struct SearchEvent {
	pub user_id: Uuid,
	pub query: String,
	pub results_count: i32,
	pub execution_time_ms: i32,
	pub search_types: Vec<String>,
	pub clicked_result_id: Option<String>,
	pub clicked_result_type: Option<String>,
}
