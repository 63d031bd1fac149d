pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Not authenticated.")]
	Unauthenticated,
	#[error("{message}")]
	InvalidRequest { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl Error {
	pub fn invalid(message: impl Into<String>) -> Self {
		Self::InvalidRequest { message: message.into() }
	}
}
impl From<kin_storage::Error> for Error {
	fn from(err: kin_storage::Error) -> Self {
		match err {
			kin_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			kin_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			kin_storage::Error::NotFound(message) => Self::Storage { message },
		}
	}
}
