//! Search analytics recording. Invoked by the client after results render,
//! never on the search request's critical path.

use serde::Deserialize;
use uuid::Uuid;

use kin_storage::{analytics, models::SearchEvent};

use crate::{KinService, error::Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEventRequest {
	pub query: String,
	pub results_count: i32,
	pub execution_time_ms: i32,
	pub search_types: Vec<String>,
	#[serde(default)]
	pub clicked_result_id: Option<String>,
	#[serde(default)]
	pub clicked_result_type: Option<String>,
}

impl KinService {
	pub async fn record_search_event(&self, user_id: Uuid, req: SearchEventRequest) -> Result<()> {
		let event = SearchEvent {
			user_id,
			query: req.query,
			results_count: req.results_count,
			execution_time_ms: req.execution_time_ms,
			search_types: req.search_types,
			clicked_result_id: req.clicked_result_id,
			clicked_result_type: req.clicked_result_type,
		};

		analytics::insert_search_event(&self.db, &event).await?;

		Ok(())
	}
}
