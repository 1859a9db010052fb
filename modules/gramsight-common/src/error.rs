use thiserror::Error;

/// A malformed post record, rejected at the Post Store boundary.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("post record has an empty post_id")]
    EmptyPostId,

    #[error("duplicate post_id {0:?} in post collection")]
    DuplicatePostId(String),

    #[error("post {post_id}: month {month:?} does not match timestamp month {expected:?}")]
    MonthMismatch {
        post_id: String,
        month: String,
        expected: String,
    },

    #[error("post {post_id}: theme {theme:?} score {score} outside [0, 1]")]
    ThemeScoreOutOfRange {
        post_id: String,
        theme: String,
        score: f64,
    },
}

/// Top-level error taxonomy. Precondition failures carry messages a caller
/// can display directly; everything recoverable (corrupt snapshots, absent
/// embedding backend) is handled inside the core and never reaches here.
#[derive(Debug, Error)]
pub enum GramsightError {
    #[error("no posts ingested for account {0:?} — run the ingest pipeline first")]
    MissingData(String),

    #[error("account {0:?} has an empty post collection")]
    NoPosts(String),

    #[error("post_id {post_id:?} not found for account {account:?}")]
    PostNotFound { account: String, post_id: String },

    #[error("comparison requires at least two accounts, got {0}")]
    NotEnoughAccounts(usize),

    #[error("invalid post record: {0}")]
    Validation(#[from] ValidationError),

    #[error("malformed post data for account {account:?}: {message}")]
    MalformedData { account: String, message: String },

    #[error("scraping error: {0}")]
    Scraping(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl GramsightError {
    /// True for failures caused by the request rather than the system:
    /// missing ingest data, unknown ids, bad comparison sets. Callers map
    /// these to client-facing messages instead of server faults.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            GramsightError::MissingData(_)
                | GramsightError::NoPosts(_)
                | GramsightError::PostNotFound { .. }
                | GramsightError::NotEnoughAccounts(_)
        )
    }
}
