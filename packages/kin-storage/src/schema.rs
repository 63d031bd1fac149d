//! Inline schema for the search-facing tables. Statements are
//! semicolon-separated and executed one by one by [`crate::db::Db::ensure_schema`].

pub fn render_schema() -> String {
	SCHEMA.to_string()
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
	id UUID PRIMARY KEY,
	email TEXT NOT NULL UNIQUE,
	name TEXT NOT NULL,
	created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS sessions (
	token TEXT PRIMARY KEY,
	user_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
	created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
	expires_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS children (
	id UUID PRIMARY KEY,
	user_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
	name TEXT NOT NULL,
	birth_date DATE,
	created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS idx_children_user_name ON children (user_id, name);

CREATE TABLE IF NOT EXISTS recipients (
	id UUID PRIMARY KEY,
	user_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
	name TEXT NOT NULL,
	email TEXT NOT NULL,
	relationship TEXT,
	created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS idx_recipients_user_name ON recipients (user_id, name);

CREATE TABLE IF NOT EXISTS recipient_groups (
	id UUID PRIMARY KEY,
	user_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
	name TEXT NOT NULL,
	created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS idx_recipient_groups_user_name ON recipient_groups (user_id, name);

CREATE TABLE IF NOT EXISTS group_members (
	group_id UUID NOT NULL REFERENCES recipient_groups (id) ON DELETE CASCADE,
	recipient_id UUID NOT NULL REFERENCES recipients (id) ON DELETE CASCADE,
	PRIMARY KEY (group_id, recipient_id)
);

CREATE TABLE IF NOT EXISTS memories (
	id UUID PRIMARY KEY,
	user_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
	child_id UUID REFERENCES children (id) ON DELETE SET NULL,
	title TEXT NOT NULL,
	content TEXT NOT NULL,
	status TEXT NOT NULL DEFAULT 'draft',
	created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
	search_vector TSVECTOR GENERATED ALWAYS AS (
		to_tsvector('english', coalesce(title, '') || ' ' || coalesce(content, ''))
	) STORED
);

CREATE INDEX IF NOT EXISTS idx_memories_search ON memories USING GIN (search_vector);

CREATE INDEX IF NOT EXISTS idx_memories_user_recency ON memories (user_id, created_at DESC, id DESC);

CREATE TABLE IF NOT EXISTS comments (
	id UUID PRIMARY KEY,
	memory_id UUID NOT NULL REFERENCES memories (id) ON DELETE CASCADE,
	author_name TEXT NOT NULL,
	content TEXT NOT NULL,
	created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
	search_vector TSVECTOR GENERATED ALWAYS AS (to_tsvector('english', coalesce(content, ''))) STORED
);

CREATE INDEX IF NOT EXISTS idx_comments_search ON comments USING GIN (search_vector);

CREATE TABLE IF NOT EXISTS search_analytics (
	id UUID PRIMARY KEY,
	user_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
	query TEXT NOT NULL,
	results_count INTEGER NOT NULL,
	execution_time_ms INTEGER NOT NULL,
	search_types TEXT[] NOT NULL,
	clicked_result_id TEXT,
	clicked_result_type TEXT,
	created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS idx_search_analytics_user ON search_analytics (user_id, created_at DESC);
"#;
