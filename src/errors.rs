use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures of a restore run, one variant per stage.
#[derive(Error, Debug)]
pub enum RestoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to list objects under s3://{bucket}/{prefix}: {source}")]
    Discovery {
        bucket: String,
        prefix: String,
        source: BoxError,
    },

    #[error("Object key '{key}' does not follow the backup layout: {reason}")]
    Grouping { key: String, reason: String },

    #[error("Failed to fetch object '{key}': {source}")]
    Fetch { key: String, source: BoxError },

    #[error("Failed to decode '{key}' as parquet: {source}")]
    Decode { key: String, source: BoxError },

    #[error("Failed to merge files for table '{table}': {source}")]
    Merge {
        table: String,
        source: arrow::error::ArrowError,
    },

    #[error("Failed to connect to destination database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("Failed to write to table '{table}': {source}")]
    Write { table: String, source: BoxError },
}

impl RestoreError {
    /// Short label naming the stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            RestoreError::Config(_) => "config",
            RestoreError::Discovery { .. } => "listing",
            RestoreError::Grouping { .. } => "grouping",
            RestoreError::Fetch { .. } => "fetch",
            RestoreError::Decode { .. } => "decode",
            RestoreError::Merge { .. } => "merge",
            RestoreError::Connect(_) => "connect",
            RestoreError::Write { .. } => "write",
        }
    }

    pub fn write(table: &str, source: impl Into<BoxError>) -> Self {
        RestoreError::Write {
            table: table.to_string(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RestoreError>;
