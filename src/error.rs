use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("product already exists")]
    DuplicateListing,
    #[error("unknown user: {0}")]
    UnknownOwner(String),
    #[error("listing {id} is not owned by {owner}")]
    OwnershipMismatch { id: u64, owner: String },
    #[error("listing {0} does not exist")]
    NotFound(u64),
    #[error("category not found: {0}")]
    CategoryNotFound(String),
    #[error("no listings for user {0}")]
    NoListings(String),
    #[error("malformed record: {0}")]
    MalformedRecord(String),
    #[error("username already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid username: {0:?}")]
    InvalidUsername(String),
    #[error("invalid sort argument: {0}")]
    InvalidSort(String),
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        if value.is_io_error() {
            match value.into_kind() {
                csv::ErrorKind::Io(err) => Error::Io(err),
                other => Error::MalformedRecord(format!("{other:?}")),
            }
        } else {
            Error::MalformedRecord(value.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
