use std::path::PathBuf;
use thiserror::Error;

/// Every fatal condition the daily run can hit.
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("listing {url} answered with status {status}")]
    Retrieval { status: u16, url: String },

    #[error("not today's papers: listing shows {found:?}, expected {expected:?}")]
    DateMismatch { expected: String, found: String },

    #[error("listing page has no date heading or paper list")]
    MissingListing,

    #[error("different numbers of link blocks ({links}) and paper blocks ({metas})")]
    StructureMismatch { links: usize, metas: usize },

    #[error("paper entry {index} has no meta block")]
    MetaMissing { index: usize },

    #[error("roster line {line} has {fields} fields, expected name|address|keywords: {content:?}")]
    RosterParse {
        line: usize,
        content: String,
        fields: usize,
    },

    #[error("failed to read roster: {0}")]
    RosterRead(#[from] csv::Error),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid mail address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("mail session error: {0}")]
    MailSession(String),

    #[error("failed to deliver digest to {recipient}: {reason}")]
    MailDelivery { recipient: String, reason: String },
}

impl DigestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DigestError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DigestError>;
