//! Database migrations for training storage

use libsql::Connection;
use tracing::info;

use super::{Error, Result};

/// SQL for each migration version
const MIGRATIONS: &[(&str, &str)] = &[("v001_initial", include_str!("v001_initial.sql"))];

/// Runs database migrations
pub struct Migrator<'a> {
    conn: &'a Connection,
}

impl<'a> Migrator<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Get current schema version
    pub async fn current_version(&self) -> Result<i64> {
        let mut rows = self.conn.query("PRAGMA user_version", ()).await?;
        match rows.next().await? {
            Some(row) => Ok(row.get::<i64>(0)?),
            None => Ok(0),
        }
    }

    /// Set schema version
    async fn set_version(&self, version: i64) -> Result<()> {
        // PRAGMA does not accept bound parameters
        self.conn
            .execute(&format!("PRAGMA user_version = {version}"), ())
            .await?;
        Ok(())
    }

    /// Run all pending migrations
    pub async fn migrate(&self) -> Result<()> {
        let current = self.current_version().await?;
        let target = Self::target_version();

        if current >= target {
            return Ok(());
        }

        for (idx, (name, sql)) in MIGRATIONS.iter().enumerate() {
            let version = (idx + 1) as i64;
            if version > current {
                info!("Running migration {}: {}", version, name);
                self.conn
                    .execute_batch(sql)
                    .await
                    .map_err(|e| Error::Migration(format!("{}: {}", name, e)))?;
                self.set_version(version).await?;
            }
        }

        Ok(())
    }

    /// Get target version (latest migration)
    pub fn target_version() -> i64 {
        MIGRATIONS.len() as i64
    }
}
