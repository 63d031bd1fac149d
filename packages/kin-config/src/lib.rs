mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Postgres, Search, Service, Storage};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.search.default_limit == 0 {
		return Err(Error::Validation {
			message: "search.default_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_limit < cfg.search.default_limit {
		return Err(Error::Validation {
			message: "search.max_limit must be at least search.default_limit.".to_string(),
		});
	}
	if cfg.search.excerpt_max_chars < 20 {
		return Err(Error::Validation {
			message: "search.excerpt_max_chars must be at least 20.".to_string(),
		});
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn base_toml() -> &'static str {
		r#"
[service]
http_bind = "127.0.0.1:8080"
log_level = "info"

[storage.postgres]
dsn = "postgres://localhost/kin"
pool_max_conns = 4

[search]
"#
	}

	#[test]
	fn defaults_applied_for_search_section() {
		let cfg: Config = toml::from_str(base_toml()).expect("Failed to parse config.");

		assert_eq!(cfg.search.default_limit, 50);
		assert_eq!(cfg.search.max_limit, 100);
		assert_eq!(cfg.search.excerpt_max_chars, 200);
		assert!(validate(&cfg).is_ok());
	}

	#[test]
	fn rejects_max_limit_below_default() {
		let raw = format!("{}default_limit = 50\nmax_limit = 10\n", base_toml());
		let cfg: Config = toml::from_str(&raw).expect("Failed to parse config.");

		assert!(validate(&cfg).is_err());
	}

	#[test]
	fn rejects_empty_dsn() {
		let raw = base_toml().replace("postgres://localhost/kin", "");
		let cfg: Config = toml::from_str(&raw).expect("Failed to parse config.");

		assert!(validate(&cfg).is_err());
	}
}
