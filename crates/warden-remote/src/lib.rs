//! Remote log file access over FTP.
//!
//! The game host exposes its log directory through a plain FTP server. Each
//! pipeline cycle asks for the full current contents of the newest file
//! matching a stream prefix; connection handling is scoped per fetch and a
//! failed connection is retried after a fixed delay, never in a tight loop.

pub mod fetch;
pub mod source;

pub use fetch::{FtpLogSource, RemoteFileConfig, CONNECT_TIMEOUT, RECONNECT_DELAY};
pub use source::{FetchError, RemoteFileSnapshot, RemoteLogSource};
