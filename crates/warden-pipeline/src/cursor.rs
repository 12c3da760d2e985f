//! Stream cursors: how far into the remote file a tenant has read.

use serde::{Deserialize, Serialize};

use warden_core::ContentDigest;

/// The two log streams a tenant tails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Login,
    Chat,
}

impl StreamKind {
    /// Remote files are named `<prefix><timestamp>`; the prefix is a fixed
    /// literal per stream kind.
    pub fn file_prefix(self) -> &'static str {
        match self {
            Self::Login => "login_",
            Self::Chat => "chat_",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Chat => "chat",
        }
    }
}

/// Progress marker for one tenant+stream. `lines_processed` never decreases
/// while the same target file is being read; it resets only when file
/// selection changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    pub stream_kind: StreamKind,
    pub lines_processed: u64,
    pub content_hash: Option<ContentDigest>,
    pub file_name: Option<String>,
}

impl Cursor {
    pub fn new(stream_kind: StreamKind) -> Self {
        Self {
            stream_kind,
            lines_processed: 0,
            content_hash: None,
            file_name: None,
        }
    }

    /// Records a completed extraction pass. Only the pipeline calls this,
    /// and only after the pass succeeded.
    pub fn advance(&mut self, file_name: &str, total_lines: u64, digest: ContentDigest) {
        self.lines_processed = total_lines;
        self.content_hash = Some(digest);
        self.file_name = Some(file_name.to_string());
    }
}

/// What one pipeline cycle should do with the fetched content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CyclePlan {
    /// Content hash unchanged since the last pass; nothing to do.
    Unchanged,
    /// First pass ever for this tenant+stream: skip the backlog and set the
    /// baseline to the current end of file.
    FirstRun,
    /// Process lines from `start_line` (zero-based) to the end.
    Process { start_line: u64 },
}

pub fn plan_cycle(
    cursor: &Cursor,
    file_name: &str,
    total_lines: u64,
    digest: &ContentDigest,
) -> CyclePlan {
    if cursor.content_hash.as_ref() == Some(digest) {
        return CyclePlan::Unchanged;
    }
    if cursor.content_hash.is_none() {
        return CyclePlan::FirstRun;
    }

    let rotated = cursor.file_name.as_deref() != Some(file_name)
        || total_lines < cursor.lines_processed;
    let start_line = if rotated { 0 } else { cursor.lines_processed };
    CyclePlan::Process { start_line }
}
