//! FTP-backed implementation of [`RemoteLogSource`].
//!
//! The FTP client is synchronous, so each fetch runs on the blocking thread
//! pool. A fetch opens a fresh session, lists the target directory, picks the
//! newest file whose name starts with the stream prefix, retrieves it in
//! full, and closes the session.

use std::io::Read;
use std::net::ToSocketAddrs;
use std::time::Duration;

use async_trait::async_trait;
use suppaftp::FtpStream;
use tracing::debug;

use crate::source::{FetchError, RemoteFileSnapshot, RemoteLogSource};

/// Fixed connect timeout for the FTP control connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Delay before a tenant pipeline rebuilds a failed FTP session. The remote
/// host is frequently down for scheduled restarts; hammering it makes
/// recovery slower.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Connection parameters for one tenant's log host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Directory holding the rotated log files, as the server spells it.
    pub directory: String,
}

pub struct FtpLogSource {
    config: RemoteFileConfig,
}

impl FtpLogSource {
    pub fn new(config: RemoteFileConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl RemoteLogSource for FtpLogSource {
    async fn fetch_newest(&self, prefix: &str) -> Result<RemoteFileSnapshot, FetchError> {
        let config = self.config.clone();
        let prefix = prefix.to_string();
        tokio::task::spawn_blocking(move || fetch_newest_blocking(&config, &prefix))
            .await
            .map_err(|error| FetchError::connection(format!("fetch task failed: {error}")))?
    }
}

fn fetch_newest_blocking(
    config: &RemoteFileConfig,
    prefix: &str,
) -> Result<RemoteFileSnapshot, FetchError> {
    let mut stream = open_session(config)?;
    let result = fetch_from_session(&mut stream, config, prefix);
    // Best-effort goodbye; the session is gone either way.
    let _ = stream.quit();
    result
}

fn open_session(config: &RemoteFileConfig) -> Result<FtpStream, FetchError> {
    let address = (config.host.as_str(), config.port)
        .to_socket_addrs()
        .map_err(|error| {
            FetchError::connection(format!("failed to resolve {}: {error}", config.host))
        })?
        .next()
        .ok_or_else(|| {
            FetchError::connection(format!("no address resolved for {}", config.host))
        })?;

    let mut stream = FtpStream::connect_timeout(address, CONNECT_TIMEOUT)
        .map_err(|error| FetchError::connection(format!("connect failed: {error}")))?;
    stream
        .login(&config.username, &config.password)
        .map_err(|error| FetchError::connection(format!("login failed: {error}")))?;
    Ok(stream)
}

fn fetch_from_session(
    stream: &mut FtpStream,
    config: &RemoteFileConfig,
    prefix: &str,
) -> Result<RemoteFileSnapshot, FetchError> {
    let listed = stream
        .nlst(Some(config.directory.as_str()))
        .map_err(|error| FetchError::connection(format!("directory listing failed: {error}")))?;

    let mut candidates = Vec::new();
    for path in listed {
        let name = file_name_component(&path).to_string();
        if !name.starts_with(prefix) {
            continue;
        }
        // Sort key is the server-reported modification time; files without
        // one sort last.
        let modified = stream.mdtm(&path).ok();
        candidates.push((modified, path, name));
    }

    candidates.sort_by(|a, b| b.0.cmp(&a.0));
    let Some((modified, path, name)) = candidates.into_iter().next() else {
        return Err(FetchError::NoMatchingFile {
            prefix: prefix.to_string(),
        });
    };
    debug!(file = %name, modified = ?modified, "selected newest remote log file");

    let mut reader = stream
        .retr_as_buffer(&path)
        .map_err(|error| FetchError::connection(format!("retrieve failed: {error}")))?;
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|error| FetchError::connection(format!("read failed: {error}")))?;

    Ok(RemoteFileSnapshot {
        file_name: name,
        contents: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

fn file_name_component(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_component_handles_both_separators() {
        assert_eq!(
            file_name_component("SCUM/Saved/Logs/login_20231219.log"),
            "login_20231219.log"
        );
        assert_eq!(
            file_name_component("SCUM\\Saved\\Logs\\chat_20231219.log"),
            "chat_20231219.log"
        );
        assert_eq!(file_name_component("bare.log"), "bare.log");
    }

    #[tokio::test]
    async fn unresolvable_host_is_a_connection_failure() {
        let source = FtpLogSource::new(RemoteFileConfig {
            host: "host.invalid".to_string(),
            port: 21,
            username: "u".to_string(),
            password: "p".to_string(),
            directory: "logs".to_string(),
        });
        match source.fetch_newest("login_").await {
            Err(FetchError::Connection { .. }) => {}
            other => panic!("expected connection failure, got {other:?}"),
        }
    }
}
