use axum::{
	Json, Router,
	extract::{Query, State},
	http::{HeaderMap, StatusCode, header},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;
use uuid::Uuid;

use kin_service::{Error as ServiceError, SearchEventRequest, SearchRequest, SearchResponse};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/search", get(search))
		.route("/search/analytics", post(record_analytics))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(params): Query<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let user_id = authenticate(&state, &headers).await?;
	let response = state.service.search(user_id, params).await?;

	Ok(Json(response))
}

async fn record_analytics(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<SearchEventRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
	let user_id = authenticate(&state, &headers).await?;

	state.service.record_search_event(user_id, payload).await?;

	Ok(Json(serde_json::json!({ "success": true })))
}

/// Session auth happens before anything else: an unauthenticated caller never
/// learns whether its query would have been valid.
async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Uuid, ApiError> {
	let token = headers
		.get(header::AUTHORIZATION)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.strip_prefix("Bearer "))
		.map(str::trim)
		.filter(|token| !token.is_empty());
	let Some(token) = token else {
		return Err(ApiError::unauthenticated());
	};

	match state.service.authenticate(token).await? {
		Some(user_id) => Ok(user_id),
		None => Err(ApiError::unauthenticated()),
	}
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	message: String,
}
impl ApiError {
	fn unauthenticated() -> Self {
		Self { status: StatusCode::UNAUTHORIZED, message: "Not authenticated".to_string() }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::Unauthenticated => Self::unauthenticated(),
			ServiceError::InvalidRequest { message } =>
				Self { status: StatusCode::BAD_REQUEST, message },
			ServiceError::Storage { message } => {
				// Full detail stays server-side; the client gets a generic body.
				tracing::error!("Search request failed: {message}");

				Self {
					status: StatusCode::INTERNAL_SERVER_ERROR,
					message: "Internal server error".to_string(),
				}
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error: self.message };

		(self.status, Json(body)).into_response()
	}
}
