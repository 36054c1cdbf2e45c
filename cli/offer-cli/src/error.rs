use thiserror::Error;

#[derive(Error, Debug)]
pub enum OfferError {
    #[error("File type not supported: {0}")]
    UnsupportedFileType(String),
    #[error("Unable to read the file: {0}")]
    UnreadableFile(String),
    #[error("Malformed row: expected 9 fields, got {found}")]
    MalformedRow { found: usize },
    #[error("Invalid address for {field}: {value:?}")]
    InvalidAddress { field: &'static str, value: String },
    #[error("Invalid integer for {field}: {value:?}")]
    InvalidInteger { field: &'static str, value: String },
    #[error("Value for {field} does not fit in 32 bytes")]
    FieldTooLarge { field: &'static str },
    #[error("Batch is empty, nothing to authorize")]
    EmptyBatch,
    #[error("Leaf index {index} is out of bounds for tree with {leaves} leaves")]
    IndexOutOfRange { index: usize, leaves: usize },
    #[error("Batch has {entries} entries but the tree has {leaves} leaves")]
    BatchMismatch { entries: usize, leaves: usize },
    #[error("No wallet available")]
    WalletUnavailable,
    #[error("Signature request rejected: {0}")]
    WalletRejected(String),
    #[error("Wallet exposes no account")]
    NoAccount,
    #[error("Submission failed: {message}")]
    SubmissionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
    #[error("Row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: Box<OfferError>,
    },
}

impl OfferError {
    /// Strips any row wrapper and returns the underlying error.
    pub fn kind(&self) -> &OfferError {
        match self {
            OfferError::Row { source, .. } => source.kind(),
            other => other,
        }
    }

    pub(crate) fn in_row(self, row: usize) -> Self {
        OfferError::Row {
            row,
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, OfferError>;
