pub mod analytics;
pub mod db;
pub mod models;
pub mod schema;
pub mod search;
pub mod sessions;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
