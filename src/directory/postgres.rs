use async_trait::async_trait;
use std::time::Duration;
use tokio::time::timeout;
use tokio_postgres::{types::ToSql, Client, NoTls};
use tracing::{debug, error, info, instrument};

use super::DirectoryLookup;
use crate::config::DatabaseConfig;
use crate::metrics;
use crate::models::{AccountId, OrganizationId};
use crate::{MockError, Result};

const ORG_IDS_SQL: &str = "SELECT org_id FROM org_config";
const ACCOUNT_IDS_SQL: &str = "SELECT account_number FROM account_config WHERE org_id = $1";

/// Directory backed by the subscription database.
///
/// Every lookup opens its own connection and runs under `lookup_timeout`.
#[derive(Debug, Clone)]
pub struct PostgresDirectory {
    config: DatabaseConfig,
    lookup_timeout: Duration,
}

impl PostgresDirectory {
    pub fn new(config: DatabaseConfig, lookup_timeout: Duration) -> Self {
        Self {
            config,
            lookup_timeout,
        }
    }

    async fn connect(&self) -> Result<Client> {
        let (client, connection) = self.config.to_pg_config().connect(NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("Subscription database connection error: {}", e);
            }
        });

        Ok(client)
    }

    async fn fetch_column(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<String>> {
        let lookup = async {
            let client = self.connect().await?;
            let rows = client.query(sql, params).await?;
            rows.iter()
                .map(|row| row.try_get::<_, Option<String>>(0))
                .filter_map(|value| value.transpose())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(MockError::from)
        };

        timeout(self.lookup_timeout, lookup)
            .await
            .map_err(|_| MockError::Timeout(self.lookup_timeout.as_millis() as u64))?
    }
}

#[async_trait]
impl DirectoryLookup for PostgresDirectory {
    #[instrument(skip(self))]
    async fn list_organizations(&self) -> Vec<OrganizationId> {
        match self.fetch_column(ORG_IDS_SQL, &[]).await {
            Ok(org_ids) if org_ids.is_empty() => {
                info!("No orgIDs available in subscription database");
                org_ids
            }
            Ok(org_ids) => {
                info!(count = org_ids.len(), "orgIDs available in subscription database");
                debug!(?org_ids);
                org_ids
            }
            Err(e) => {
                error!("An exception occurred while querying database: {}", e);
                metrics::record_lookup_failure("list_organizations");
                Vec::new()
            }
        }
    }

    #[instrument(skip(self))]
    async fn resolve_accounts(&self, org_id: &str) -> Vec<AccountId> {
        match self.fetch_column(ACCOUNT_IDS_SQL, &[&org_id]).await {
            Ok(account_ids) if account_ids.is_empty() => {
                info!("No accountIDs available in subscription database");
                account_ids
            }
            Ok(account_ids) => {
                info!(?account_ids, "accountIDs available in subscription database");
                account_ids
            }
            Err(e) => {
                error!("An exception occurred while querying database: {}", e);
                metrics::record_lookup_failure("resolve_accounts");
                Vec::new()
            }
        }
    }
}
