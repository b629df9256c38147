//! Organization and account lookups.
//!
//! Lookups are best effort: implementations log failures and hand back an
//! empty list so the query endpoint can always answer.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::models::{AccountId, OrganizationId};

pub mod postgres;

pub use postgres::PostgresDirectory;

#[async_trait]
pub trait DirectoryLookup: Send + Sync {
    /// Every organization known to the subscription database.
    async fn list_organizations(&self) -> Vec<OrganizationId>;

    /// Accounts associated with `org_id`, in the order the backend returns them.
    async fn resolve_accounts(&self, org_id: &str) -> Vec<AccountId>;
}

/// Fixed directory held in memory, for offline runs and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    accounts: BTreeMap<OrganizationId, Vec<AccountId>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_org<I, S>(mut self, org_id: &str, accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<AccountId>,
    {
        self.accounts
            .insert(org_id.to_string(), accounts.into_iter().map(Into::into).collect());
        self
    }

    /// A small fleet of sample tenants, one account each.
    pub fn sample(org_count: usize) -> Self {
        (1..=org_count).fold(Self::new(), |dir, i| {
            dir.with_org(&format!("org-{}", i), [format!("acct-{}", i)])
        })
    }
}

#[async_trait]
impl DirectoryLookup for InMemoryDirectory {
    async fn list_organizations(&self) -> Vec<OrganizationId> {
        self.accounts.keys().cloned().collect()
    }

    async fn resolve_accounts(&self, org_id: &str) -> Vec<AccountId> {
        self.accounts.get(org_id).cloned().unwrap_or_default()
    }
}
