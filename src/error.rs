use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriplecastError {
    #[error("Invalid URI: {0}")]
    InvalidUri(String),
    #[error("Subject already assigned: {0}")]
    SubjectAlreadyAssigned(String),
    #[error("Invalid declaration: {0}")]
    InvalidDeclaration(String),
    #[error("Unknown property: {0}")]
    UnknownProperty(String),
    #[error("Value error: {0}")]
    Value(String),
    #[error("Repository not found: {0}")]
    RepositoryNotFound(String),
    #[error("No parent configured: {0}")]
    NilParent(String),
    #[error("Unmutable parent: {0}")]
    UnmutableParent(String),
    #[error("Unmutable source: {0}")]
    UnmutableSource(String),
    #[error("Strategy mismatch: {0}")]
    StrategyMismatch(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Lock poisoned: {0}")]
    Lock(String),
}

pub type Result<T> = std::result::Result<T, TriplecastError>;

// Helper conversions
impl From<rusqlite::Error> for TriplecastError {
    fn from(e: rusqlite::Error) -> Self { Self::Persistence(e.to_string()) }
}
