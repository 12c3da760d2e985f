//! One tenant's fetch/extract/route cycle.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use warden_agent::{AgentInstruction, AgentRegistry};
use warden_core::{content_digest, GuildId};
use warden_dispatch::QueueEntry;
use warden_extract::{
    extract_chat_command, extract_login_event, strip_nul_bytes, Coordinates, LoginDirection,
    LoginEvent, LoginLineOutcome,
};
use warden_ledger::{AccountStore, SessionLedger};
use warden_remote::{FetchError, RemoteFileSnapshot, RemoteLogSource, RECONNECT_DELAY};

use crate::cursor::{plan_cycle, Cursor, CyclePlan, StreamKind};
use crate::notify::NotificationSink;

/// Per-tenant extraction behavior knobs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub command_marker: char,
    /// Where first-time joiners are teleported, when configured.
    pub spawn_coordinates: Option<Coordinates>,
    /// Grace period before the first-join teleport fires, giving the player
    /// time to finish loading in.
    pub first_join_teleport_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            command_marker: warden_extract::DEFAULT_COMMAND_MARKER,
            spawn_coordinates: None,
            first_join_teleport_delay: Duration::from_secs(60),
        }
    }
}

/// What one cycle did, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetch_failed: bool,
    pub no_matching_file: bool,
    pub unchanged: bool,
    pub first_run: bool,
    pub new_lines: usize,
    pub login_events: usize,
    pub commands_enqueued: usize,
    pub credits_applied: usize,
    pub lines_dropped: usize,
}

pub struct TenantPipeline {
    guild_id: GuildId,
    config: PipelineConfig,
    source: Arc<dyn RemoteLogSource>,
    accounts: Arc<dyn AccountStore>,
    sink: Arc<dyn NotificationSink>,
    agents: AgentRegistry,
    commands: UnboundedSender<QueueEntry>,
    ledger: Mutex<SessionLedger>,
    login_cursor: Mutex<Cursor>,
    chat_cursor: Mutex<Cursor>,
}

impl TenantPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        guild_id: GuildId,
        config: PipelineConfig,
        source: Arc<dyn RemoteLogSource>,
        accounts: Arc<dyn AccountStore>,
        sink: Arc<dyn NotificationSink>,
        agents: AgentRegistry,
        commands: UnboundedSender<QueueEntry>,
    ) -> Self {
        Self {
            guild_id,
            config,
            source,
            accounts,
            sink,
            agents,
            commands,
            ledger: Mutex::new(SessionLedger::new()),
            login_cursor: Mutex::new(Cursor::new(StreamKind::Login)),
            chat_cursor: Mutex::new(Cursor::new(StreamKind::Chat)),
        }
    }

    pub fn guild_id(&self) -> &GuildId {
        &self.guild_id
    }

    /// Runs one full cycle for a stream. Never fails: transient faults are
    /// logged and absorbed, and the cursor only advances after a successful
    /// extraction pass.
    pub async fn run_cycle(&self, kind: StreamKind) -> CycleReport {
        let mut report = CycleReport::default();

        let Some(snapshot) = self.fetch_with_retry(kind, &mut report).await else {
            return report;
        };

        let stripped = strip_nul_bytes(&snapshot.contents);
        let lines: Vec<&str> = stripped.lines().collect();
        let total_lines = lines.len() as u64;
        let digest = content_digest(&stripped);

        let cursor_slot = match kind {
            StreamKind::Login => &self.login_cursor,
            StreamKind::Chat => &self.chat_cursor,
        };
        let mut cursor = cursor_slot.lock().await;

        match plan_cycle(&cursor, &snapshot.file_name, total_lines, &digest) {
            CyclePlan::Unchanged => {
                report.unchanged = true;
            }
            CyclePlan::FirstRun => {
                // Skip the backlog rather than replaying history.
                info!(
                    guild = %self.guild_id,
                    stream = kind.as_str(),
                    skipped_lines = total_lines,
                    "first pass for stream; baseline set to current end of file"
                );
                cursor.advance(&snapshot.file_name, total_lines, digest);
                report.first_run = true;
            }
            CyclePlan::Process { start_line } => {
                if start_line == 0 && cursor.lines_processed > 0 {
                    info!(
                        guild = %self.guild_id,
                        stream = kind.as_str(),
                        file = %snapshot.file_name,
                        "log file rotated; replaying from the top of the new file"
                    );
                }
                let new_lines = &lines[start_line as usize..];
                report.new_lines = new_lines.len();
                for line in new_lines {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match kind {
                        StreamKind::Login => self.route_login_line(line, &mut report).await,
                        StreamKind::Chat => self.route_chat_line(line, &mut report).await,
                    }
                }
                cursor.advance(&snapshot.file_name, total_lines, digest);
            }
        }

        debug!(
            guild = %self.guild_id,
            stream = kind.as_str(),
            new_lines = report.new_lines,
            commands = report.commands_enqueued,
            credits = report.credits_applied,
            unchanged = report.unchanged,
            "pipeline cycle finished"
        );
        report
    }

    /// Fetches the newest stream file; one delayed retry after a connection
    /// failure so a briefly unreachable host does not cost a whole interval.
    async fn fetch_with_retry(
        &self,
        kind: StreamKind,
        report: &mut CycleReport,
    ) -> Option<RemoteFileSnapshot> {
        let prefix = kind.file_prefix();
        match self.source.fetch_newest(prefix).await {
            Ok(snapshot) => return Some(snapshot),
            Err(FetchError::NoMatchingFile { prefix }) => {
                debug!(guild = %self.guild_id, prefix, "no matching remote file this cycle");
                report.no_matching_file = true;
                return None;
            }
            Err(FetchError::Connection { message }) => {
                warn!(
                    guild = %self.guild_id,
                    stream = kind.as_str(),
                    %message,
                    "remote connection failed; retrying after delay"
                );
            }
        }

        tokio::time::sleep(RECONNECT_DELAY).await;
        match self.source.fetch_newest(prefix).await {
            Ok(snapshot) => Some(snapshot),
            Err(error) => {
                warn!(
                    guild = %self.guild_id,
                    stream = kind.as_str(),
                    %error,
                    "remote fetch failed twice; giving up until the next cycle"
                );
                report.fetch_failed = true;
                None
            }
        }
    }

    async fn route_login_line(&self, line: &str, report: &mut CycleReport) {
        self.sink.login_activity(&self.guild_id, line).await;

        match extract_login_event(line) {
            LoginLineOutcome::Event(event) => {
                report.login_events += 1;
                if let Err(error) = self
                    .accounts
                    .upsert_player(&self.guild_id, &event.player_id, &event.display_name)
                    .await
                {
                    warn!(guild = %self.guild_id, player = %event.player_id, %error, "player upsert failed");
                }
                match event.direction {
                    LoginDirection::LoggedIn => {
                        self.ledger
                            .lock()
                            .await
                            .on_login(event.player_id.clone(), event.timestamp);
                        self.handle_first_join(&event).await;
                    }
                    LoginDirection::LoggedOut => {
                        let mut ledger = self.ledger.lock().await;
                        if let Some(credit) = ledger.on_logout(&event.player_id, event.timestamp)
                        {
                            ledger
                                .settle(self.accounts.as_ref(), &self.guild_id, &credit)
                                .await;
                            report.credits_applied += 1;
                        }
                    }
                }
            }
            LoginLineOutcome::InvalidTimestamp { raw_timestamp } => {
                report.lines_dropped += 1;
                warn!(
                    guild = %self.guild_id,
                    timestamp = %raw_timestamp,
                    "login line dropped: unparsable timestamp"
                );
            }
            LoginLineOutcome::NoMatch => {}
        }
    }

    async fn route_chat_line(&self, line: &str, report: &mut CycleReport) {
        let Some(event) = extract_chat_command(line, self.config.command_marker) else {
            self.sink.chat_message(&self.guild_id, line).await;
            return;
        };
        let entry = QueueEntry {
            player_id: event.player_id,
            command_name: event.command_name,
            raw_line: event.raw_line,
        };
        if self.commands.send(entry).is_ok() {
            report.commands_enqueued += 1;
        } else {
            warn!(guild = %self.guild_id, "command dropped: worker queue closed");
        }
    }

    /// First observed login for an account: announce the join and teleport
    /// the player to the configured spawn area after a grace period.
    async fn handle_first_join(&self, event: &LoginEvent) {
        let account = match self.accounts.account(&self.guild_id, &event.player_id).await {
            Ok(Some(account)) => account,
            Ok(None) => return,
            Err(error) => {
                warn!(guild = %self.guild_id, player = %event.player_id, %error, "account lookup failed");
                return;
            }
        };
        if !account.first_join_pending {
            return;
        }

        self.sink
            .player_joined(&self.guild_id, &event.player_id, &event.ip_address)
            .await;
        if let Err(error) = self
            .accounts
            .clear_first_join(&self.guild_id, &event.player_id)
            .await
        {
            warn!(guild = %self.guild_id, player = %event.player_id, %error, "failed to clear first-join flag");
        }

        let Some(spawn) = self.config.spawn_coordinates else {
            return;
        };
        let agents = self.agents.clone();
        let guild_id = self.guild_id.clone();
        let player_id = event.player_id.to_string();
        let delay = self.config.first_join_teleport_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            agents.send(AgentInstruction::Teleport {
                guild_id,
                x: spawn.x,
                y: spawn.y,
                z: spawn.z,
                player_id,
            });
        });
    }
}
