pub mod excerpt;
pub mod query;
