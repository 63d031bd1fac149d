use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use kin_config::Postgres;
use kin_storage::{
	db::Db,
	search::{self, FetchWindow},
};

async fn connect(dsn: &str) -> Db {
	let cfg = Postgres { dsn: dsn.to_string(), pool_max_conns: 2 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	db
}

async fn seed_user(db: &Db, email: &str) -> Uuid {
	let id = Uuid::new_v4();

	sqlx::query("INSERT INTO users (id, email, name) VALUES ($1, $2, $3)")
		.bind(id)
		.bind(email)
		.bind("Test User")
		.execute(&db.pool)
		.await
		.expect("Failed to insert user.");

	id
}

async fn seed_memory(
	db: &Db,
	user_id: Uuid,
	title: &str,
	content: &str,
	created_at: OffsetDateTime,
) -> Uuid {
	let id = Uuid::new_v4();

	sqlx::query(
		"\
INSERT INTO memories (id, user_id, title, content, status, created_at)
VALUES ($1, $2, $3, $4, 'sent', $5)",
	)
	.bind(id)
	.bind(user_id)
	.bind(title)
	.bind(content)
	.bind(created_at)
	.execute(&db.pool)
	.await
	.expect("Failed to insert memory.");

	id
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set KIN_PG_DSN to run."]
async fn schema_bootstrap_is_idempotent() {
	let Some(base_dsn) = kin_testkit::env_dsn() else {
		eprintln!("Skipping schema_bootstrap_is_idempotent; set KIN_PG_DSN to run this test.");

		return;
	};
	let test_db =
		kin_testkit::TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = connect(test_db.dsn()).await;

	db.ensure_schema().await.expect("Failed to re-run schema bootstrap.");

	let count: i64 = sqlx::query_scalar(
		"SELECT count(*) FROM information_schema.tables WHERE table_name = 'memories'",
	)
	.fetch_one(&db.pool)
	.await
	.expect("Failed to query schema tables.");

	assert_eq!(count, 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set KIN_PG_DSN to run."]
async fn memory_query_is_scoped_to_owner() {
	let Some(base_dsn) = kin_testkit::env_dsn() else {
		eprintln!("Skipping memory_query_is_scoped_to_owner; set KIN_PG_DSN to run this test.");

		return;
	};
	let test_db =
		kin_testkit::TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = connect(test_db.dsn()).await;
	let now = OffsetDateTime::now_utc();
	let owner = seed_user(&db, "owner@example.com").await;
	let other = seed_user(&db, "other@example.com").await;
	let owned = seed_memory(&db, owner, "Zoo trip", "We saw a zebra today", now).await;

	seed_memory(&db, other, "Zoo trip", "We saw a zebra today", now).await;

	let hits = search::memories_by_query(
		&db,
		"'zebra':*",
		owner,
		FetchWindow::Cursor { after: None, fetch: 10 },
	)
	.await
	.expect("Failed to query memories.");

	assert_eq!(hits.len(), 1);
	assert_eq!(hits[0].id, owned);
	assert!(hits[0].rank > 0.0);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set KIN_PG_DSN to run."]
async fn comment_ownership_follows_parent_memory() {
	let Some(base_dsn) = kin_testkit::env_dsn() else {
		eprintln!(
			"Skipping comment_ownership_follows_parent_memory; set KIN_PG_DSN to run this test."
		);

		return;
	};
	let test_db =
		kin_testkit::TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = connect(test_db.dsn()).await;
	let now = OffsetDateTime::now_utc();
	let owner = seed_user(&db, "owner@example.com").await;
	let other = seed_user(&db, "other@example.com").await;
	let memory = seed_memory(&db, owner, "First steps", "Emma took her first steps", now).await;

	sqlx::query(
		"\
INSERT INTO comments (id, memory_id, author_name, content)
VALUES ($1, $2, $3, $4)",
	)
	.bind(Uuid::new_v4())
	.bind(memory)
	.bind("Grandma Joy")
	.bind("What wonderful steps!")
	.execute(&db.pool)
	.await
	.expect("Failed to insert comment.");

	let window = FetchWindow::Cursor { after: None, fetch: 10 };
	let for_owner = search::comments_by_query(&db, "'steps':*", owner, window)
		.await
		.expect("Failed to query comments.");
	let for_other = search::comments_by_query(&db, "'steps':*", other, window)
		.await
		.expect("Failed to query comments.");

	assert_eq!(for_owner.len(), 1);
	assert_eq!(for_owner[0].memory_title, "First steps");
	assert!(for_other.is_empty());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set KIN_PG_DSN to run."]
async fn cursor_window_returns_strictly_older_rows() {
	let Some(base_dsn) = kin_testkit::env_dsn() else {
		eprintln!(
			"Skipping cursor_window_returns_strictly_older_rows; set KIN_PG_DSN to run this test."
		);

		return;
	};
	let test_db =
		kin_testkit::TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = connect(test_db.dsn()).await;
	let base = OffsetDateTime::now_utc();
	let owner = seed_user(&db, "owner@example.com").await;
	let oldest = seed_memory(&db, owner, "Picnic", "Family picnic", base - Duration::days(2)).await;
	let middle = seed_memory(&db, owner, "Picnic", "Family picnic", base - Duration::days(1)).await;
	let newest = seed_memory(&db, owner, "Picnic", "Family picnic", base).await;

	let first_page = search::memories_by_query(
		&db,
		"'picnic':*",
		owner,
		FetchWindow::Cursor { after: None, fetch: 2 },
	)
	.await
	.expect("Failed to query memories.");

	assert_eq!(first_page.iter().map(|hit| hit.id).collect::<Vec<_>>(), vec![newest, middle]);

	let second_page = search::memories_by_query(
		&db,
		"'picnic':*",
		owner,
		FetchWindow::Cursor {
			after: Some((first_page[1].created_at, first_page[1].id)),
			fetch: 2,
		},
	)
	.await
	.expect("Failed to query memories.");

	assert_eq!(second_page.iter().map(|hit| hit.id).collect::<Vec<_>>(), vec![oldest]);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set KIN_PG_DSN to run."]
async fn structured_sources_match_substrings_case_insensitively() {
	let Some(base_dsn) = kin_testkit::env_dsn() else {
		eprintln!(
			"Skipping structured_sources_match_substrings_case_insensitively; set KIN_PG_DSN to run this test."
		);

		return;
	};
	let test_db =
		kin_testkit::TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = connect(test_db.dsn()).await;
	let owner = seed_user(&db, "owner@example.com").await;
	let recipient_id = Uuid::new_v4();
	let group_id = Uuid::new_v4();

	sqlx::query(
		"\
INSERT INTO recipients (id, user_id, name, email, relationship)
VALUES ($1, $2, $3, $4, $5)",
	)
	.bind(recipient_id)
	.bind(owner)
	.bind("Grandma Joy")
	.bind("joy@example.com")
	.bind("grandmother")
	.execute(&db.pool)
	.await
	.expect("Failed to insert recipient.");

	sqlx::query("INSERT INTO recipient_groups (id, user_id, name) VALUES ($1, $2, $3)")
		.bind(group_id)
		.bind(owner)
		.bind("Grandparents")
		.execute(&db.pool)
		.await
		.expect("Failed to insert group.");

	sqlx::query("INSERT INTO group_members (group_id, recipient_id) VALUES ($1, $2)")
		.bind(group_id)
		.bind(recipient_id)
		.execute(&db.pool)
		.await
		.expect("Failed to insert group member.");

	let recipients = search::recipients_by_name_or_email(&db, "%grandma%", owner, 10, 0)
		.await
		.expect("Failed to query recipients.");
	let by_email = search::recipients_by_name_or_email(&db, "%joy@example%", owner, 10, 0)
		.await
		.expect("Failed to query recipients.");
	let groups = search::groups_by_name(&db, "%grand%", owner, 10, 0)
		.await
		.expect("Failed to query groups.");

	assert_eq!(recipients.len(), 1);
	assert_eq!(recipients[0].name, "Grandma Joy");
	assert_eq!(by_email.len(), 1);
	assert_eq!(groups.len(), 1);
	assert_eq!(groups[0].member_count, 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
