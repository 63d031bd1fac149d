//! Pagination directive and the opaque continuation cursor.
//!
//! A cursor is base64(JSON `{createdAt, id}`) naming the last visible result
//! when ordered by recency. Tokens are stateless, forward-only continuation
//! markers; resending one replays the same page modulo concurrent writes.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	pub id: String,
}
impl Cursor {
	pub fn encode(&self) -> Result<String> {
		let json = serde_json::to_vec(self)
			.map_err(|err| Error::Storage { message: format!("Failed to encode cursor: {err}.") })?;

		Ok(STANDARD.encode(json))
	}

	/// Strict decode. A malformed token is a validation error, never a silent
	/// fallback to the first page: the client asked for a specific
	/// continuation point and silently returning page one would hide the bug.
	pub fn decode(token: &str) -> Result<Self> {
		let bytes = STANDARD
			.decode(token)
			.map_err(|_| Error::invalid("Invalid pagination cursor."))?;

		serde_json::from_slice(&bytes).map_err(|_| Error::invalid("Invalid pagination cursor."))
	}
}

/// Normalized pagination directive consumed by the fetchers.
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
	/// Continuation-token mode. `after` is absent on the first page of a
	/// cursor-driven listing.
	Cursor { after: Option<Cursor>, limit: i64 },
	/// Legacy offset mode, kept for old clients. `has_more` is never computed
	/// in this mode.
	Offset { offset: i64, limit: i64 },
}
impl Page {
	/// `cursor` wins over `offset` when both are supplied. An absent or
	/// unparseable `limit` falls back to the configured default; an
	/// unparseable `offset` falls back to zero. Only a malformed cursor is a
	/// hard error.
	pub fn from_params(
		limit: Option<&str>,
		offset: Option<&str>,
		cursor: Option<&str>,
		search_cfg: &kin_config::Search,
	) -> Result<Self> {
		let limit = clamp_limit(limit, search_cfg);

		if let Some(token) = cursor.map(str::trim).filter(|token| !token.is_empty()) {
			return Ok(Self::Cursor { after: Some(Cursor::decode(token)?), limit });
		}
		if let Some(raw) = offset {
			let offset =
				raw.trim().parse::<i64>().ok().filter(|value| *value >= 0).unwrap_or(0);

			return Ok(Self::Offset { offset, limit });
		}

		Ok(Self::Cursor { after: None, limit })
	}

	pub fn limit(&self) -> i64 {
		match self {
			Self::Cursor { limit, .. } | Self::Offset { limit, .. } => *limit,
		}
	}

	pub fn is_cursor(&self) -> bool {
		matches!(self, Self::Cursor { .. })
	}
}

fn clamp_limit(raw: Option<&str>, search_cfg: &kin_config::Search) -> i64 {
	raw.and_then(|value| value.trim().parse::<i64>().ok())
		.map(|value| value.clamp(1, i64::from(search_cfg.max_limit)))
		.unwrap_or(i64::from(search_cfg.default_limit))
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	fn search_cfg() -> kin_config::Search {
		kin_config::Search { default_limit: 50, max_limit: 100, excerpt_max_chars: 200 }
	}

	fn sample_cursor() -> Cursor {
		Cursor {
			created_at: datetime!(2026-03-14 12:30:45 UTC),
			id: "a81f9c2e-8f6d-4f4d-9b5e-1d2f3a4b5c6d".to_string(),
		}
	}

	#[test]
	fn cursor_round_trips() {
		let cursor = sample_cursor();
		let token = cursor.encode().expect("Failed to encode cursor.");

		assert_eq!(Cursor::decode(&token).expect("Failed to decode cursor."), cursor);
	}

	#[test]
	fn malformed_cursor_is_an_error() {
		assert!(Cursor::decode("not-base64!!").is_err());

		// Valid base64, but not the cursor shape.
		let token = STANDARD.encode(b"{\"page\":2}");

		assert!(Cursor::decode(&token).is_err());
	}

	#[test]
	fn limit_clamps_and_defaults() {
		let cfg = search_cfg();

		assert_eq!(Page::from_params(Some("500"), None, None, &cfg).unwrap().limit(), 100);
		assert_eq!(Page::from_params(Some("0"), None, None, &cfg).unwrap().limit(), 1);
		assert_eq!(Page::from_params(Some("abc"), None, None, &cfg).unwrap().limit(), 50);
		assert_eq!(Page::from_params(None, None, None, &cfg).unwrap().limit(), 50);
	}

	#[test]
	fn cursor_takes_precedence_over_offset() {
		let cfg = search_cfg();
		let token = sample_cursor().encode().expect("Failed to encode cursor.");
		let page = Page::from_params(None, Some("40"), Some(&token), &cfg).unwrap();

		assert!(page.is_cursor());
	}

	#[test]
	fn offset_mode_defaults_invalid_offset_to_zero() {
		let cfg = search_cfg();

		let Page::Offset { offset, .. } =
			Page::from_params(None, Some("-3"), None, &cfg).unwrap()
		else {
			panic!("Expected offset mode.");
		};

		assert_eq!(offset, 0);
	}

	#[test]
	fn absent_parameters_start_a_cursor_listing() {
		let cfg = search_cfg();
		let page = Page::from_params(None, None, None, &cfg).unwrap();

		assert_eq!(page, Page::Cursor { after: None, limit: 50 });
	}
}
