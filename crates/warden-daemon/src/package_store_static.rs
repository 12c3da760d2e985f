//! Config-backed package store.
//!
//! The package catalog comes straight from the daemon config file and is
//! shared by every tenant. Lookup is by exact name.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use warden_core::GuildId;
use warden_dispatch::{PackageDefinition, PackageStore};

pub struct StaticPackageStore {
    packages: HashMap<String, PackageDefinition>,
}

impl StaticPackageStore {
    pub fn new(definitions: Vec<PackageDefinition>) -> Self {
        let packages = definitions
            .into_iter()
            .map(|definition| (definition.name.clone(), definition))
            .collect();
        Self { packages }
    }
}

#[async_trait]
impl PackageStore for StaticPackageStore {
    async fn package(
        &self,
        _guild_id: &GuildId,
        name: &str,
    ) -> Result<Option<PackageDefinition>> {
        Ok(self.packages.get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_known_names_and_misses_unknown() {
        let store = StaticPackageStore::new(vec![PackageDefinition {
            name: "drill".to_string(),
            cost: 1500,
            required_role: None,
            items: vec!["#SpawnItem Drill 1".to_string()],
        }]);
        let guild = GuildId::new("g");

        let package = store.package(&guild, "drill").await.expect("lookup");
        assert_eq!(package.expect("definition").cost, 1500);
        assert!(store
            .package(&guild, "missing")
            .await
            .expect("lookup")
            .is_none());
    }
}
