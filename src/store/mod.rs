//! The relational store (§6), grounded on
//! `original_source/db_manager/db_manager.py`. Pool sizing and the
//! batch-insert query-building idiom are not in the teacher (it never talks
//! to a database); the `QueryBuilder::push_values` pattern is grounded on
//! `other_examples/…oraxen-asyncanticheat__api-src-routes-ingest.rs.rs`.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

use crate::config::DbConfig;

#[derive(Clone)]
pub struct Store {
    pool: MySqlPool,
}

impl Store {
    /// Connects with the pool bounds recommended in §5: min 5 / max 20
    /// connections, 10 s connect timeout.
    pub async fn connect(cfg: &DbConfig) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .min_connections(5)
            .max_connections(20)
            .acquire_timeout(Duration::from_secs(10))
            .connect(&cfg.connection_url())
            .await
            .context("failed to connect to the relational store")?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// §4.2 step 5: per-domain `INSERT IGNORE` inside one transaction,
    /// collecting `LAST_INSERT_ID()` for every domain that was actually new.
    /// Domains already present yield `LAST_INSERT_ID() == 0` and are omitted
    /// from the returned mapping, preserving the `{new domain -> id}`
    /// contract exactly as the source did it.
    pub async fn insert_non_duplicates(
        &self,
        domains: &[String],
    ) -> Result<HashMap<String, i64>> {
        let mut inserted = HashMap::new();
        if domains.is_empty() {
            return Ok(inserted);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to start registry transaction")?;

        for domain in domains {
            let result = sqlx::query("INSERT IGNORE INTO domains (domain) VALUES (?)")
                .bind(domain)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("failed to insert domain {domain:?}"))?;
            let id = result.last_insert_id();
            if id != 0 {
                inserted.insert(domain.clone(), id as i64);
            }
        }

        tx.commit()
            .await
            .context("failed to commit registry transaction")?;
        Ok(inserted)
    }

    /// §4.4: bulk insert of `(domain_id, ip)` rows into `domains_ip`.
    pub async fn insert_domains_ip(&self, rows: &[(i64, String)]) -> Result<()> {
        self.bulk_insert("domains_ip", "ip", rows).await
    }

    /// §4.4: bulk insert of `(domain_id, ns)` rows into `domains_ns`.
    pub async fn insert_domains_ns(&self, rows: &[(i64, String)]) -> Result<()> {
        self.bulk_insert("domains_ns", "ns", rows).await
    }

    async fn bulk_insert(&self, table: &str, column: &str, rows: &[(i64, String)]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .with_context(|| format!("failed to start {table} transaction"))?;

        let mut qb: sqlx::QueryBuilder<sqlx::MySql> =
            sqlx::QueryBuilder::new(format!("INSERT INTO {table} (domain_id, {column}, timestamp) "));
        qb.push_values(rows, |mut b, (domain_id, value)| {
            b.push_bind(domain_id).push_bind(value).push("NOW()");
        });

        if let Err(e) = qb.build().execute(&mut *tx).await {
            tx.rollback().await.ok();
            return Err(e).with_context(|| format!("bulk insert into {table} failed, rolled back"));
        }

        tx.commit()
            .await
            .with_context(|| format!("failed to commit {table} transaction"))?;
        Ok(())
    }
}
