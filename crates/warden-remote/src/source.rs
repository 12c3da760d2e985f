//! The seam between pipeline cycles and the remote file host.

use async_trait::async_trait;
use thiserror::Error;

/// Full current contents of one remote log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileSnapshot {
    /// Name of the selected file, used for rotation diagnostics.
    pub file_name: String,
    /// Raw file contents; NUL stripping happens in the pipeline.
    pub contents: String,
}

/// Why a fetch produced no content.
///
/// Callers branch on this: `Connection` makes the pipeline back off and
/// rebuild the whole session, while `NoMatchingFile` just means there is
/// nothing to do this cycle.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("remote file connection failed: {message}")]
    Connection { message: String },
    #[error("no remote file matches prefix '{prefix}'")]
    NoMatchingFile { prefix: String },
}

impl FetchError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }
}

/// Provides the newest remote file for a stream prefix.
#[async_trait]
pub trait RemoteLogSource: Send + Sync {
    async fn fetch_newest(&self, prefix: &str) -> Result<RemoteFileSnapshot, FetchError>;
}
