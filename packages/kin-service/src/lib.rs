pub mod analytics;
pub mod pagination;
pub mod results;
pub mod search;
pub mod time_serde;

mod error;

pub use analytics::SearchEventRequest;
pub use error::{Error, Result};
pub use pagination::{Cursor, Page};
pub use results::{Highlights, ResultMetadata, STRUCTURED_RANK, SearchResult, SourceKind};
pub use search::{PageInfo, SearchRequest, SearchResponse};

use uuid::Uuid;

use kin_config::Config;
use kin_storage::{db::Db, sessions};

pub struct KinService {
	pub cfg: Config,
	pub db: Db,
}
impl KinService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, db }
	}

	/// Resolves a bearer token to a user id. `None` means no valid session;
	/// callers must abort before validating anything else, so an
	/// unauthenticated request never learns whether its query was valid.
	pub async fn authenticate(&self, token: &str) -> Result<Option<Uuid>> {
		let user_id = sessions::resolve_session(&self.db, token).await?;

		Ok(user_id)
	}
}
