use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub search: Search,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Search {
	/// Page size applied when the request carries no usable `limit`.
	#[serde(default = "default_limit")]
	pub default_limit: u32,
	/// Hard ceiling for the requested page size.
	#[serde(default = "max_limit")]
	pub max_limit: u32,
	/// Excerpts are clipped to this many characters before ellipses.
	#[serde(default = "excerpt_max_chars")]
	pub excerpt_max_chars: u32,
}

fn default_limit() -> u32 {
	50
}

fn max_limit() -> u32 {
	100
}

fn excerpt_max_chars() -> u32 {
	200
}
