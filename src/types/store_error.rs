/// Failure raised by a persistence store
///
/// Both the Postgres stores and the in-memory stores report through this type so services
/// never see which backend they are talking to.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("duplicate key: {0}")]
    Duplicate(String),
}

impl StoreError {
    /// Maps unique-constraint violations to `Duplicate`, everything else stays a database error
    pub fn from_insert(error: sqlx::Error, key: &str) -> Self {
        match &error {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::Duplicate(key.to_string())
            }
            _ => StoreError::Database(error),
        }
    }
}
