use uuid::Uuid;

use crate::{Result, db::Db};

/// Maps a bearer token to its user, ignoring expired sessions.
pub async fn resolve_session(db: &Db, token: &str) -> Result<Option<Uuid>> {
	let user_id = sqlx::query_scalar(
		"\
SELECT user_id
FROM sessions
WHERE token = $1
	AND expires_at > now()",
	)
	.bind(token)
	.fetch_optional(&db.pool)
	.await?;

	Ok(user_id)
}
