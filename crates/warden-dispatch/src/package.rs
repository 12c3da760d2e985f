//! The external package store seam.
//!
//! A package is a named, priced bundle of in-game actions. Definitions are
//! owned by the external store; the dispatcher only resolves names, with
//! "not found" as a first-class result.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use warden_core::GuildId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDefinition {
    pub name: String,
    #[serde(default)]
    pub cost: i64,
    /// Restricts the package to accounts holding this role, e.g. a
    /// donor-only crate. Open to everyone when absent.
    #[serde(default)]
    pub required_role: Option<String>,
    /// In-game command lines the agent types into the client, in order.
    pub items: Vec<String>,
}

#[async_trait]
pub trait PackageStore: Send + Sync {
    async fn package(&self, guild_id: &GuildId, name: &str)
        -> Result<Option<PackageDefinition>>;
}
