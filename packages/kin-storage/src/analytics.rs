use uuid::Uuid;

use crate::{Result, db::Db, models::SearchEvent};

pub async fn insert_search_event(db: &Db, event: &SearchEvent) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO search_analytics (
	id,
	user_id,
	query,
	results_count,
	execution_time_ms,
	search_types,
	clicked_result_id,
	clicked_result_type
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
	)
	.bind(Uuid::new_v4())
	.bind(event.user_id)
	.bind(event.query.as_str())
	.bind(event.results_count)
	.bind(event.execution_time_ms)
	.bind(&event.search_types)
	.bind(event.clicked_result_id.as_deref())
	.bind(event.clicked_result_type.as_deref())
	.execute(&db.pool)
	.await?;

	Ok(())
}
