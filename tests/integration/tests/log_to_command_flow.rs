//! End-to-end flow without the network edges: scripted remote log snapshots
//! go in, agent instructions and balance changes come out.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use warden_agent::{AgentInstruction, AgentRegistry};
use warden_core::{GuildId, PlayerId};
use warden_dispatch::{start_command_worker, CommandDispatcher, PackageDefinition, PackageStore};
use warden_ledger::{Account, AccountStore};
use warden_pipeline::{NotificationSink, PipelineConfig, StreamKind, TenantPipeline};
use warden_remote::{FetchError, RemoteFileSnapshot, RemoteLogSource};

struct MemoryAccounts {
    accounts: Mutex<HashMap<PlayerId, Account>>,
}

impl MemoryAccounts {
    fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
        }
    }

    fn balance(&self, player: &PlayerId) -> i64 {
        self.accounts.lock().unwrap()[player].balance
    }
}

#[async_trait]
impl AccountStore for MemoryAccounts {
    async fn account(&self, _guild: &GuildId, player: &PlayerId) -> Result<Option<Account>> {
        Ok(self.accounts.lock().unwrap().get(player).cloned())
    }

    async fn upsert_player(&self, _guild: &GuildId, player: &PlayerId, name: &str) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        accounts
            .entry(player.clone())
            .and_modify(|account| account.display_name = name.to_string())
            .or_insert_with(|| Account::new(player.clone(), name));
        Ok(())
    }

    async fn adjust_balance(&self, _guild: &GuildId, player: &PlayerId, delta: i64) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(account) = accounts.get_mut(player) {
            account.balance += delta;
        }
        Ok(())
    }

    async fn record_welcome_kit_use(&self, _guild: &GuildId, player: &PlayerId) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(account) = accounts.get_mut(player) {
            account.welcome_kit_uses += 1;
        }
        Ok(())
    }

    async fn clear_first_join(&self, _guild: &GuildId, player: &PlayerId) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(account) = accounts.get_mut(player) {
            account.first_join_pending = false;
        }
        Ok(())
    }
}

struct CatalogPackages;

#[async_trait]
impl PackageStore for CatalogPackages {
    async fn package(&self, _guild: &GuildId, name: &str) -> Result<Option<PackageDefinition>> {
        Ok(match name {
            "drill" => Some(PackageDefinition {
                name: "drill".to_string(),
                cost: 1500,
                required_role: None,
                items: vec!["#SpawnItem Drill 1".to_string()],
            }),
            _ => None,
        })
    }
}

struct SilentSink;

#[async_trait]
impl NotificationSink for SilentSink {
    async fn login_activity(&self, _guild: &GuildId, _line: &str) {}
    async fn chat_message(&self, _guild: &GuildId, _line: &str) {}
    async fn player_joined(&self, _guild: &GuildId, _player: &PlayerId, _ip: &str) {}
}

/// Serves a fixed sequence of snapshots per stream prefix.
struct ScriptedSource {
    snapshots: Mutex<HashMap<&'static str, Vec<RemoteFileSnapshot>>>,
}

impl ScriptedSource {
    fn new(login: Vec<(&str, &str)>, chat: Vec<(&str, &str)>) -> Self {
        let build = |entries: Vec<(&str, &str)>| {
            entries
                .into_iter()
                .map(|(file_name, contents)| RemoteFileSnapshot {
                    file_name: file_name.to_string(),
                    contents: contents.to_string(),
                })
                .collect::<Vec<_>>()
        };
        let mut snapshots = HashMap::new();
        snapshots.insert("login_", build(login));
        snapshots.insert("chat_", build(chat));
        Self {
            snapshots: Mutex::new(snapshots),
        }
    }
}

#[async_trait]
impl RemoteLogSource for ScriptedSource {
    async fn fetch_newest(&self, prefix: &str) -> Result<RemoteFileSnapshot, FetchError> {
        let mut snapshots = self.snapshots.lock().unwrap();
        let queue = snapshots.get_mut(prefix).ok_or_else(|| {
            FetchError::NoMatchingFile {
                prefix: prefix.to_string(),
            }
        })?;
        if queue.is_empty() {
            return Err(FetchError::NoMatchingFile {
                prefix: prefix.to_string(),
            });
        }
        Ok(queue.remove(0))
    }
}

const PLAYER: &str = "76561198000000001";
const BACKLOG: &str = "historic line\n";
const LOGIN: &str =
    "2024.03.01-10.00.00: '1.2.3.4 76561198000000001:alpha(1)' logged in at: X=1 Y=2 Z=3";
const LOGOUT: &str =
    "2024.03.01-11.30.00: '1.2.3.4 76561198000000001:alpha(1)' logged out at: X=1 Y=2 Z=3";
const COMMAND: &str = "2024.03.01-11.00.00: '76561198000000001:alpha(1)' 'Local: /drill'";

#[tokio::test]
async fn session_credit_funds_a_package_purchase() {
    let guild = GuildId::new("guild-1");
    let player = PlayerId::parse(PLAYER).expect("player id");
    let accounts = Arc::new(MemoryAccounts::new());
    let agents = AgentRegistry::new();
    let (outbound_tx, mut outbound) = mpsc::unbounded_channel();
    agents.register(guild.clone(), outbound_tx);

    let dispatcher = CommandDispatcher::new(
        guild.clone(),
        accounts.clone(),
        Arc::new(CatalogPackages),
        agents.clone(),
        HashMap::new(),
    );
    let worker = start_command_worker(dispatcher).expect("worker");

    let source = Arc::new(ScriptedSource::new(
        vec![
            ("login_1.log", BACKLOG),
            ("login_1.log", &format!("{BACKLOG}{LOGIN}\n")),
            ("login_1.log", &format!("{BACKLOG}{LOGIN}\n{LOGOUT}\n")),
        ],
        vec![
            ("chat_1.log", BACKLOG),
            ("chat_1.log", &format!("{BACKLOG}{COMMAND}\n")),
        ],
    ));
    let pipeline = TenantPipeline::new(
        guild.clone(),
        PipelineConfig {
            first_join_teleport_delay: Duration::ZERO,
            ..PipelineConfig::default()
        },
        source,
        accounts.clone(),
        Arc::new(SilentSink),
        agents,
        worker.sender().expect("worker sender"),
    );

    // Login stream: baseline, then the session opens and closes.
    assert!(pipeline.run_cycle(StreamKind::Login).await.first_run);
    assert_eq!(pipeline.run_cycle(StreamKind::Login).await.login_events, 1);
    let report = pipeline.run_cycle(StreamKind::Login).await;
    assert_eq!(report.credits_applied, 1);
    assert_eq!(accounts.balance(&player), 1500);

    // Chat stream: baseline, then the player spends the credit.
    assert!(pipeline.run_cycle(StreamKind::Chat).await.first_run);
    assert_eq!(
        pipeline.run_cycle(StreamKind::Chat).await.commands_enqueued,
        1
    );

    // Drain the worker before asserting on the dispatch result. The pipeline
    // holds a clone of the queue sender, so it must go first or the worker
    // loop never sees the channel close.
    drop(pipeline);
    let task = worker.stop().expect("worker task");
    task.await.expect("worker exits");

    assert_eq!(accounts.balance(&player), 0);
    let instruction = outbound.try_recv().expect("agent instruction");
    match instruction {
        AgentInstruction::RunCommand {
            package_items,
            player_id,
            ..
        } => {
            assert_eq!(package_items, vec!["#SpawnItem Drill 1"]);
            assert_eq!(player_id, PLAYER);
        }
        other => panic!("expected a runCommand instruction, got {other:?}"),
    }
}
