//! Login/logout pairing and credit computation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use warden_core::{GuildId, PlayerId};

use crate::account::AccountStore;

/// Currency earned per full hour of play time.
pub const CREDITS_PER_HOUR: f64 = 1000.0;

/// A completed session ready to be credited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCredit {
    pub player_id: PlayerId,
    pub amount: i64,
}

/// Credit for a session spanning `login` to `logout`.
///
/// Deliberately unbounded and unguarded against clock skew: a negative or
/// zero elapsed time yields a zero-or-negative credit that is applied as-is.
pub fn session_credit_amount(login: DateTime<Utc>, logout: DateTime<Utc>) -> i64 {
    let elapsed_hours = (logout - login).num_milliseconds() as f64 / 3_600_000.0;
    (elapsed_hours * CREDITS_PER_HOUR).round() as i64
}

/// Tracks at most one open session per player and credits the account store
/// exactly once per completed login/logout pair.
#[derive(Debug, Default)]
pub struct SessionLedger {
    pending: HashMap<PlayerId, DateTime<Utc>>,
}

impl SessionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A login overwrites any prior pending entry: last login wins.
    pub fn on_login(&mut self, player_id: PlayerId, timestamp: DateTime<Utc>) {
        self.pending.insert(player_id, timestamp);
    }

    /// Closes the pending session, if any. A logout with no prior login is a
    /// no-op, dropped rather than retried.
    pub fn on_logout(
        &mut self,
        player_id: &PlayerId,
        timestamp: DateTime<Utc>,
    ) -> Option<SessionCredit> {
        let login_time = self.pending.remove(player_id)?;
        Some(SessionCredit {
            player_id: player_id.clone(),
            amount: session_credit_amount(login_time, timestamp),
        })
    }

    /// Applies a completed session's credit to the account store. A failed
    /// credit is dropped with a diagnostic; the pending entry was already
    /// removed, so the next matching logout cannot double-credit.
    pub async fn settle(
        &self,
        store: &dyn AccountStore,
        guild_id: &GuildId,
        credit: &SessionCredit,
    ) {
        match store
            .adjust_balance(guild_id, &credit.player_id, credit.amount)
            .await
        {
            Ok(()) => {
                debug!(
                    guild = %guild_id,
                    player = %credit.player_id,
                    amount = credit.amount,
                    "session credit applied"
                );
            }
            Err(error) => {
                warn!(
                    guild = %guild_id,
                    player = %credit.player_id,
                    amount = credit.amount,
                    %error,
                    "session credit dropped: account store rejected the update"
                );
            }
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
